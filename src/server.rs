//! Server lifecycle: load config, bind, watch, serve, shut down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{self, ConfigError, ConfigMap, Settings};
use crate::executor::{Executor, ShellExecutor};
use crate::flusher::DebounceFlusher;
use crate::paths::PathResolver;
use crate::queue::ReloadQueue;
use crate::rpc::{self, QueueService};
use crate::watcher::WatchSession;

/// Options for `configwatchd serve`.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Queue reloads until a client flushes them instead of running them
    /// on the periodic drain.
    pub queue: bool,
    /// Watch configuration; falls back to the default location.
    pub config_file: Option<PathBuf>,
}

impl ServeOptions {
    /// Config file to load, or an error when none can be determined.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        self.config_file
            .clone()
            .or_else(config::default_config_file)
            .ok_or(ConfigError::Missing)
    }
}

/// Run the server until `cancel` fires.
///
/// Config and listener errors abort before any watching starts.
pub async fn run_server(
    opts: ServeOptions,
    settings: Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let config_path = opts.config_path()?;
    let config_map = config::load_config_map(&config_path)?;

    let addr = settings.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Couldn't serve on {addr}"))?;

    run_with_listener(
        opts,
        settings,
        Arc::new(config_map),
        PathResolver::from_env(),
        listener,
        cancel,
    )
    .await
}

/// Run with an already loaded config and bound listener.
pub async fn run_with_listener(
    opts: ServeOptions,
    settings: Settings,
    config_map: Arc<ConfigMap>,
    resolver: PathResolver,
    listener: TcpListener,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let executor: Arc<dyn Executor> =
        Arc::new(ShellExecutor::new(config_map.clone(), settings.shell.clone()));
    let queue = Arc::new(ReloadQueue::new(executor));

    let mode = if opts.queue { "queue" } else { "immediate" };
    crate::log_event!("server", "starting", "{} keys, {mode} mode", config_map.len());

    let mut workers = JoinSet::new();

    for (key, entry) in config_map.iter() {
        let span = tracing::info_span!("watch", key = %key);
        match WatchSession::new(key.clone(), entry, resolver.clone(), queue.clone(), span) {
            Ok(session) => {
                workers.spawn(session.run(cancel.child_token()));
            }
            Err(e) => {
                tracing::error!("[server] cannot watch {key}: {e}");
            }
        }
    }

    if !opts.queue {
        let period = Duration::from_millis(settings.queue.flush_interval_ms);
        let flusher = DebounceFlusher::new(queue.clone(), period, tracing::info_span!("flusher"));
        workers.spawn(flusher.run(cancel.child_token()));
    }

    let service = QueueService::new(queue.clone(), opts.queue);
    let served = rpc::serve(listener, service, cancel.clone(), tracing::info_span!("rpc")).await;

    // The listener only returns early on failure; stop everything else too.
    cancel.cancel();
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("[server] worker failed: {e}");
        }
    }

    if !queue.is_empty() {
        crate::log_event!("server", "dropping queued", "{}", queue.list().join(", "));
    }
    crate::log_event!("server", "stopped");

    served.context("Queue service failed")
}
