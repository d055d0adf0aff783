//! configwatchd - reload programs when their config files change.

use clap::Parser;
use configwatchd::cli::commands;
use configwatchd::cli::commands::serve::ServeArgs;
use configwatchd::cli::{Cli, Commands};
use configwatchd::config::Settings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve {
            queue,
            verbose,
            config_file,
        } => {
            commands::serve::run(
                ServeArgs {
                    queue,
                    verbose,
                    config_file,
                },
                settings,
            )
            .await
        }
        Commands::Flush { clear, keys } => {
            configwatchd::logging::init_with_config(&settings.logging, false);
            commands::flush::run(keys, clear, &settings).await
        }
        Commands::List => {
            configwatchd::logging::init_with_config(&settings.logging, false);
            commands::list::run(&settings).await
        }
        Commands::Config => commands::config::run(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
