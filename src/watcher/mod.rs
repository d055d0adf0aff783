//! Filesystem watching for config keys.
//!
//! # Architecture
//!
//! ```text
//! WatchSession (one per config key)
//!   - notify::RecommendedWatcher on each parent directory
//!   - WatchSet: resolved paths + directories
//!   - exact-path filter, then ReloadQueue::enqueue(key)
//! ```

mod error;
mod session;
mod watch_set;

pub use error::WatchError;
pub use session::WatchSession;
pub use watch_set::{WatchSet, WatchedPath, watch_dir_for};
