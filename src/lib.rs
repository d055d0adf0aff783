pub mod cli;
pub mod config;
pub mod executor;
pub mod flusher;
pub mod logging;
pub mod paths;
pub mod queue;
pub mod rpc;
pub mod server;
pub mod watcher;

pub use config::{ConfigEntry, ConfigError, ConfigMap, Settings};
pub use executor::{Executor, ShellExecutor};
pub use flusher::DebounceFlusher;
pub use paths::PathResolver;
pub use queue::ReloadQueue;
pub use rpc::{FlushOpts, QueueClient, QueueService, RpcError};
pub use server::{ServeOptions, run_server};
pub use watcher::{WatchError, WatchSession};
