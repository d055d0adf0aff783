//! Watched paths and the directories that cover them.
//!
//! Notifications are subscribed per containing directory, so editors that
//! replace a file (delete + create, or rename over it) keep being observed.
//! Each directory is subscribed once no matter how many paths share it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A configured watch string and where it resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedPath {
    pub raw: String,
    pub resolved: PathBuf,
}

/// Resolved watch paths of one session plus their parent directories.
#[derive(Debug, Default)]
pub struct WatchSet {
    paths: Vec<WatchedPath>,
    dirs: HashSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a path, returning its directory if that directory is new.
    ///
    /// A path that is already tracked is ignored and returns `None`.
    pub fn add(&mut self, raw: impl Into<String>, resolved: PathBuf) -> Option<PathBuf> {
        if self.contains(&resolved) {
            return None;
        }

        let dir = watch_dir_for(&resolved);
        self.paths.push(WatchedPath {
            raw: raw.into(),
            resolved,
        });

        if self.dirs.insert(dir.clone()) {
            Some(dir)
        } else {
            None
        }
    }

    /// Forget a directory and every path it covers.
    ///
    /// Used when subscribing to the directory failed.
    pub fn remove_dir(&mut self, dir: &Path) {
        self.dirs.remove(dir);
        self.paths.retain(|p| watch_dir_for(&p.resolved) != dir);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p.resolved == path)
    }

    pub fn paths(&self) -> &[WatchedPath] {
        &self.paths
    }

    pub fn dirs(&self) -> &HashSet<PathBuf> {
        &self.dirs
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }
}

/// Directory to subscribe to for a path.
///
/// Paths without a parent (the filesystem root) are watched directly.
pub fn watch_dir_for(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}
