//! Client used by the `flush` and `list` commands.

use reqwest::StatusCode;

use super::error::RpcError;
use super::server::{FLUSH_PATH, LIST_PATH};
use super::types::{ErrorResponse, FlushOpts, FlushResponse, ListResponse};

/// Talks to a running server's queue service.
pub struct QueueClient {
    addr: String,
    http: reqwest::Client,
}

impl QueueClient {
    /// Client for a `host:port` address.
    ///
    /// Proxy settings from the environment are ignored; the service only
    /// listens on the local machine.
    pub fn new(addr: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            addr: addr.into(),
            http,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Execute or clear queued keys on the server.
    pub async fn flush(&self, opts: &FlushOpts) -> Result<Vec<String>, RpcError> {
        let request = self.http.post(self.url(FLUSH_PATH)).json(opts);
        let response = self.send(request).await?;
        let body: FlushResponse = response.json().await?;
        Ok(body.processed)
    }

    /// Current queue contents on the server.
    pub async fn list(&self) -> Result<Vec<String>, RpcError> {
        let request = self.http.get(self.url(LIST_PATH));
        let response = self.send(request).await?;
        let body: ListResponse = response.json().await?;
        Ok(body.config_keys)
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, RpcError> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                RpcError::Connect {
                    addr: self.addr.clone(),
                    reason: e.to_string(),
                }
            } else {
                RpcError::Transport(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::CONFLICT {
            return Err(RpcError::QueueDisabled);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(RpcError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}
