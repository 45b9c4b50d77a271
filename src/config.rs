//! Invocation configuration.
//!
//! Flags and environment variables are read by the binary (clap handles the
//! `DEFDEPLOY_*` fallbacks); this module fills in the defaults that need the
//! filesystem, chiefly locating the modules root.

use crate::prompt::RetryPolicy;
use anyhow::{Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub const MODULES_ROOT_ENV: &str = "DEFDEPLOY_MODULES_ROOT";
pub const JOURNAL_ENV: &str = "DEFDEPLOY_JOURNAL";
pub const MAX_ATTEMPTS_ENV: &str = "DEFDEPLOY_MAX_ATTEMPTS";
pub const LOG_ENV: &str = "DEFDEPLOY_LOG";

/// Directory name searched for when no modules root is configured.
pub const MODULES_DIR: &str = "modules";
/// Journal file created inside the modules root by default.
pub const DEFAULT_JOURNAL: &str = "registrations.ndjson";

/// Values supplied explicitly by flag or environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub modules_root: Option<PathBuf>,
    pub journal: Option<PathBuf>,
    pub max_attempts: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub modules_root: PathBuf,
    pub journal: PathBuf,
    pub retry: RetryPolicy,
}

impl Config {
    /// Fill unset values with defaults, searching upwards from `cwd` for a
    /// modules directory when no root was supplied.
    pub fn resolve(overrides: ConfigOverrides, cwd: &Path) -> Result<Self> {
        let modules_root = match overrides.modules_root {
            Some(root) => {
                if !root.is_dir() {
                    bail!("modules root {} is not a directory", root.display());
                }
                root
            }
            None => match search_upwards(cwd) {
                Some(root) => root,
                None => bail!(
                    "Unable to locate a '{MODULES_DIR}' directory above {}. Set {MODULES_ROOT_ENV} or pass --modules-root.",
                    cwd.display()
                ),
            },
        };
        let journal = overrides
            .journal
            .unwrap_or_else(|| modules_root.join(DEFAULT_JOURNAL));
        let retry = overrides
            .max_attempts
            .map(RetryPolicy::bounded)
            .unwrap_or_default();
        Ok(Self {
            modules_root,
            journal,
            retry,
        })
    }
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(MODULES_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_modules_dir_above_cwd() -> Result<()> {
        let tmp = TempDir::new()?;
        fs::create_dir_all(tmp.path().join(MODULES_DIR))?;
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested)?;

        let config = Config::resolve(ConfigOverrides::default(), &nested)?;
        assert_eq!(
            config.modules_root,
            fs::canonicalize(tmp.path())?.join(MODULES_DIR)
        );
        assert_eq!(config.journal, config.modules_root.join(DEFAULT_JOURNAL));
        assert_eq!(config.retry, RetryPolicy::unbounded());
        Ok(())
    }

    #[test]
    fn explicit_values_win() -> Result<()> {
        let tmp = TempDir::new()?;
        let overrides = ConfigOverrides {
            modules_root: Some(tmp.path().to_path_buf()),
            journal: Some(tmp.path().join("out.ndjson")),
            max_attempts: Some(3),
        };
        let config = Config::resolve(overrides, Path::new("/"))?;
        assert_eq!(config.modules_root, tmp.path());
        assert_eq!(config.journal, tmp.path().join("out.ndjson"));
        assert_eq!(config.retry, RetryPolicy::bounded(3));
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() -> Result<()> {
        let tmp = TempDir::new()?;
        let overrides = ConfigOverrides {
            modules_root: Some(tmp.path().join("absent")),
            ..Default::default()
        };
        let err = Config::resolve(overrides, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
        Ok(())
    }
}
