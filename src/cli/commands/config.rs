//! Config command - display the effective settings.

use crate::config::Settings;

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", settings.to_toml()?);
    Ok(())
}
