//! Running reload commands.

use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::config::ConfigMap;

/// Runs the reload for a config key.
///
/// Implementations must not panic or propagate failures: a broken reload
/// command is logged and the caller moves on to the next key.
pub trait Executor: Send + Sync {
    fn execute(&self, key: &str);
}

/// Runs `<shell> -c <command>` and waits for it.
pub struct ShellExecutor {
    config: Arc<ConfigMap>,
    shell: String,
}

impl ShellExecutor {
    pub fn new(config: Arc<ConfigMap>, shell: impl Into<String>) -> Self {
        Self {
            config,
            shell: shell.into(),
        }
    }

    /// Run a command string, returning its exit status and captured output.
    ///
    /// Stdout comes first, followed by stderr.
    fn run(&self, command: &str) -> std::io::Result<(std::process::ExitStatus, String)> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status, combined))
    }
}

impl Executor for ShellExecutor {
    fn execute(&self, key: &str) {
        let Some(entry) = self.config.get(key) else {
            tracing::warn!("[executor] no config entry for '{key}', skipping");
            return;
        };

        crate::log_event!("executor", "executing", "{key}");

        match self.run(&entry.command) {
            Ok((status, output)) if status.success() => {
                crate::debug_event!("executor", "finished", "{key}");
                if !output.is_empty() {
                    tracing::trace!("[executor] output of {key}:\n{output}");
                }
            }
            Ok((status, output)) => {
                tracing::error!(
                    "[executor] command [{}] exited with non-zero code: {status}\nOutput:\n{output}",
                    entry.command
                );
            }
            Err(e) => {
                tracing::error!("[executor] command [{}] failed to run: {e}", entry.command);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ConfigEntry;
    use tempfile::TempDir;

    fn executor_for(key: &str, command: &str) -> ShellExecutor {
        let mut config = ConfigMap::new();
        config.insert(
            key.to_string(),
            ConfigEntry {
                command: command.to_string(),
                watch: vec![],
            },
        );
        ShellExecutor::new(Arc::new(config), "sh")
    }

    #[test]
    fn test_run_captures_combined_output() {
        let executor = executor_for("a", "true");
        let (status, output) = executor.run("echo out; echo err >&2").unwrap();
        assert!(status.success());
        assert!(output.contains("out"));
        assert!(output.contains("err"));
    }

    #[test]
    fn test_run_reports_failure_status() {
        let executor = executor_for("a", "true");
        let (status, output) = executor.run("echo broken; exit 3").unwrap();
        assert_eq!(status.code(), Some(3));
        assert!(output.contains("broken"));
    }

    #[test]
    fn test_execute_runs_configured_command() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("ran");
        let executor = executor_for("a", &format!("touch '{}'", marker.display()));

        executor.execute("a");
        assert!(marker.exists());
    }

    #[test]
    fn test_execute_survives_failures() {
        let executor = executor_for("b", "false");
        executor.execute("b");
        executor.execute("unknown");

        let broken_shell = ShellExecutor::new(Arc::new(ConfigMap::new()), "/nonexistent/shell");
        assert!(broken_shell.run("true").is_err());
    }
}
