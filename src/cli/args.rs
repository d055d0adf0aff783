//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const LONG_ABOUT: &str = "\
configwatchd watches changes to a set of config files that you specify,
and executes whatever command you want to restart or trigger a reload
in the corresponding process.

In addition it permits queuing with manual flushing. So instead of immediately
reloading which may be undesirable, the user can reload configs manually.

The config file is yaml and of the following form:

  i3:
    # command is executed by bash
    command: \"i3-msg reload\"
    watch:
      # tilde (~) expansion is supported (for the beginning of the string)
      - \"~/.i3/config\"";

/// Config file watcher with a remotely flushable reload queue
#[derive(Parser, Debug)]
#[command(
    name = "configwatchd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch config files and reload the programs that use them",
    long_about = LONG_ABOUT,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to a settings.toml overriding the default one
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs the file watcher / server.
    Serve {
        /// Instead of executing commands as soon as files change, queue them
        /// to be executed manually by flush
        #[arg(long)]
        queue: bool,

        /// Print debug information to stderr
        #[arg(short = 'v', long = "verbose", alias = "v")]
        verbose: bool,

        /// Override the path to server config
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,
    },

    /// Tells the server to flush the queue. Optionally pass specific keys
    /// you want to process.
    Flush {
        /// Instead of execute, clear
        #[arg(long)]
        clear: bool,

        /// Config keys to process (all queued keys when omitted)
        #[arg(value_name = "KEY")]
        keys: Vec<String>,
    },

    /// Gets the contents of the queue from the server, and prints to stdout.
    List,

    /// Display the effective daemon settings
    Config,
}
