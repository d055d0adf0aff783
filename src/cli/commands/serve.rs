//! Serve command - run the watcher and the queue service.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::server::{ServeOptions, run_server};

/// Arguments for the serve command.
pub struct ServeArgs {
    pub queue: bool,
    pub verbose: bool,
    pub config_file: Option<PathBuf>,
}

/// Run the serve command until interrupted.
pub async fn run(args: ServeArgs, settings: Settings) -> anyhow::Result<()> {
    let ServeArgs {
        queue,
        verbose,
        config_file,
    } = args;

    crate::logging::init_with_config(&settings.logging, verbose);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        crate::log_event!("server", "shutdown requested");
        signal_cancel.cancel();
    });

    let opts = ServeOptions { queue, config_file };
    run_server(opts, settings, cancel).await
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("[server] cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("[server] cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
