//! Flush command - execute or clear queued reloads on the server.

use crate::config::Settings;
use crate::rpc::{FlushOpts, QueueClient};

/// Run the flush command. No keys means the whole queue.
pub async fn run(keys: Vec<String>, clear: bool, settings: &Settings) -> anyhow::Result<()> {
    let client = QueueClient::new(settings.server.addr())?;
    let processed = client.flush(&FlushOpts { keys, clear }).await?;
    crate::debug_event!("flush", "processed", "{}", processed.join(", "));
    Ok(())
}
