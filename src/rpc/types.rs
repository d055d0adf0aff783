//! Wire types shared by the service and the client.

use serde::{Deserialize, Serialize};

/// Flush request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushOpts {
    /// Specific keys to process. If empty, the entire queue is flushed.
    #[serde(default)]
    pub keys: Vec<String>,

    /// Don't execute, only remove from the queue.
    #[serde(default)]
    pub clear: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushResponse {
    /// Keys that were executed or cleared, in queue order.
    #[serde(default)]
    pub processed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub config_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_opts_defaults_from_empty_body() {
        let opts: FlushOpts = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, FlushOpts::default());
        assert!(opts.keys.is_empty());
        assert!(!opts.clear);
    }

    #[test]
    fn test_list_response_field_name() {
        let json = serde_json::to_value(ListResponse {
            config_keys: vec!["i3".to_string()],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "config_keys": ["i3"] }));
    }
}
