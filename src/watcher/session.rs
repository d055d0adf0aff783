//! Per-config-key watch session.

use std::path::PathBuf;
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::config::ConfigEntry;
use crate::paths::PathResolver;
use crate::queue::ReloadQueue;

use super::error::WatchError;
use super::watch_set::WatchSet;

/// Watches the paths of one config key and queues the key on writes.
///
/// The session never runs the reload itself; the queue is drained either by
/// the periodic flusher or by a client flush.
pub struct WatchSession {
    key: String,
    resolver: PathResolver,
    watch_set: WatchSet,
    queue: Arc<ReloadQueue>,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    watcher: notify::RecommendedWatcher,
    span: Span,
}

impl WatchSession {
    /// Create the session and subscribe to the directories of its paths.
    ///
    /// Paths that fail to resolve or subscribe are logged and skipped. Only a
    /// failure to create the underlying watcher is returned.
    pub fn new(
        key: impl Into<String>,
        entry: &ConfigEntry,
        resolver: PathResolver,
        queue: Arc<ReloadQueue>,
        span: Span,
    ) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(100);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let mut session = Self {
            key: key.into(),
            resolver,
            watch_set: WatchSet::new(),
            queue,
            event_rx: rx,
            watcher,
            span,
        };

        let span = session.span.clone();
        let _enter = span.enter();
        for raw in &entry.watch {
            session.add_path(raw);
        }

        if session.watch_set.path_count() == 0 {
            tracing::warn!("[watcher] {} has no watchable paths", session.key);
        } else {
            crate::log_event!(
                "watcher",
                "monitoring",
                "{} paths in {} directories",
                session.watch_set.path_count(),
                session.watch_set.dir_count()
            );
        }

        Ok(session)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Paths this session matches events against, as resolved at startup.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watch_set
            .paths()
            .iter()
            .map(|p| p.resolved.clone())
            .collect()
    }

    fn add_path(&mut self, raw: &str) {
        let resolved = match self.resolver.resolve(raw) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("[watcher] skipping: {e}");
                return;
            }
        };

        crate::debug_event!("watcher", "resolved", "{raw} -> {}", resolved.display());

        if let Some(dir) = self.watch_set.add(raw, resolved) {
            if let Err(e) = self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                let err = WatchError::PathWatchFailed {
                    path: dir.clone(),
                    reason: e.to_string(),
                };
                tracing::warn!("[watcher] skipping: {err}");
                self.watch_set.remove_dir(&dir);
                return;
            }
            crate::debug_event!("watcher", "watching", "{}", dir.display());
        }
    }

    /// Current resolution of every watch path.
    ///
    /// A path that fails to resolve right now (for example mid-replace by an
    /// editor) falls back to its startup resolution.
    fn current_paths(&self) -> Vec<PathBuf> {
        self.watch_set
            .paths()
            .iter()
            .map(|p| {
                self.resolver
                    .resolve(&p.raw)
                    .unwrap_or_else(|_| p.resolved.clone())
            })
            .collect()
    }

    /// Whether an event should queue this session's key.
    ///
    /// The event must be a content write on one of the watched paths; other
    /// files in the same directories are noise.
    pub fn qualifies(&self, event: &Event) -> bool {
        if !is_content_write(&event.kind) {
            return false;
        }
        let current = self.current_paths();
        event.paths.iter().any(|path| current.contains(path))
    }

    /// Queue the key for a qualifying event. Returns whether it qualified.
    pub fn handle_event(&self, event: &Event) -> bool {
        if !self.qualifies(event) {
            tracing::trace!("[watcher] ignored {:?} {:?}", event.kind, event.paths);
            return false;
        }

        crate::debug_event!("watcher", "write", "{:?}", event.paths);
        if self.queue.enqueue(&self.key) {
            crate::log_event!("watcher", "queued", "{}", self.key);
        } else {
            crate::debug_event!("watcher", "already queued", "{}", self.key);
        }
        true
    }

    /// Process events until `cancel` fires.
    ///
    /// Dropping the session on return releases its subscriptions.
    pub async fn run(mut self, cancel: CancellationToken) {
        let span = self.span.clone();
        async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        crate::debug_event!("watcher", "stopped");
                        break;
                    }
                    res = self.event_rx.recv() => {
                        match res {
                            Some(Ok(event)) => {
                                self.handle_event(&event);
                            }
                            Some(Err(e)) => {
                                let err = WatchError::EventError { details: e.to_string() };
                                tracing::error!("[watcher] {err}");
                            }
                            None => break,
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// `Modify(Data)` is what inotify and FSEvents report for writes; some
/// backends only report `Modify(Any)`.
fn is_content_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
