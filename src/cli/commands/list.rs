//! List command - print queued config keys, one per line.

use std::io::Write;

use crate::config::Settings;
use crate::rpc::QueueClient;

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let client = QueueClient::new(settings.server.addr())?;
    let keys = client.list().await?;

    let mut stdout = std::io::stdout().lock();
    for key in keys {
        writeln!(stdout, "{key}")?;
    }
    Ok(())
}
