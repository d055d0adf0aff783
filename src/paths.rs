//! Watch path expansion and canonicalization.

use std::path::{Path, PathBuf};

use crate::watcher::WatchError;

/// Turns configured watch strings into absolute, symlink-free paths.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    home: Option<PathBuf>,
}

impl PathResolver {
    /// Resolver with an explicit home directory.
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    /// Resolver using the current user's home directory.
    pub fn from_env() -> Self {
        Self::new(dirs::home_dir())
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Expand a leading `~` or `~/`.
    ///
    /// Only the start of the string is considered, so `/a/~/b` and `~user`
    /// come back unchanged.
    pub fn expand(&self, path: &str) -> Result<PathBuf, WatchError> {
        let rest = if path == "~" {
            Some("")
        } else {
            path.strip_prefix("~/")
        };

        match rest {
            Some(rest) => {
                let home = self.home.as_ref().ok_or_else(|| WatchError::Resolve {
                    path: path.to_string(),
                    reason: "home directory is unknown".to_string(),
                })?;
                if rest.is_empty() {
                    Ok(home.clone())
                } else {
                    Ok(home.join(rest))
                }
            }
            None => Ok(PathBuf::from(path)),
        }
    }

    /// Expand and canonicalize. The path must exist.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, WatchError> {
        let expanded = self.expand(path)?;
        std::fs::canonicalize(&expanded).map_err(|e| WatchError::Resolve {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_home() {
        let resolver = PathResolver::new(Some(PathBuf::from("/home/op")));
        assert_eq!(resolver.expand("~").unwrap(), PathBuf::from("/home/op"));
        assert_eq!(
            resolver.expand("~/.i3/config").unwrap(),
            PathBuf::from("/home/op/.i3/config")
        );
    }

    #[test]
    fn test_expand_leaves_inner_tilde() {
        let resolver = PathResolver::new(Some(PathBuf::from("/home/op")));
        assert_eq!(
            resolver.expand("/something/~/something").unwrap(),
            PathBuf::from("/something/~/something")
        );
        assert_eq!(resolver.expand("~op/x").unwrap(), PathBuf::from("~op/x"));
    }

    #[test]
    fn test_expand_without_home() {
        let resolver = PathResolver::new(None);
        assert!(matches!(
            resolver.expand("~/x"),
            Err(WatchError::Resolve { .. })
        ));
        assert_eq!(resolver.expand("/etc/x").unwrap(), PathBuf::from("/etc/x"));
    }

    #[test]
    fn test_resolve_canonicalizes() {
        let temp_dir = TempDir::new().unwrap();
        let home = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir(home.join("cfg")).unwrap();
        fs::write(home.join("cfg/app.conf"), "x").unwrap();

        let resolver = PathResolver::new(Some(home.clone()));
        assert_eq!(
            resolver.resolve("~/cfg/../cfg/app.conf").unwrap(),
            home.join("cfg/app.conf")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let home = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir(home.join("dotfiles")).unwrap();
        fs::write(home.join("dotfiles/rc"), "x").unwrap();
        std::os::unix::fs::symlink(home.join("dotfiles/rc"), home.join(".rc")).unwrap();

        let resolver = PathResolver::new(Some(home.clone()));
        assert_eq!(resolver.resolve("~/.rc").unwrap(), home.join("dotfiles/rc"));
    }

    #[test]
    fn test_resolve_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(Some(temp_dir.path().to_path_buf()));
        let err = resolver.resolve("~/missing").unwrap_err();
        assert!(err.to_string().contains("~/missing"));
    }
}
