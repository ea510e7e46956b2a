//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TRAVELLIST_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TRAVELLIST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TRAVELLIST_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "travellist.sqlite3";

/// Store settings handed to the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = StoreConfig::default();
        assert!(config.db_path.ends_with("travellist.sqlite3"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn environment_values_override_defaults_and_blanks_are_ignored() {
        let env = HashMap::from([
            (DB_PATH_ENV, "/data/trips.db".to_string()),
            (LOG_LEVEL_ENV, "warn".to_string()),
            (LOG_DIR_ENV, "   ".to_string()),
        ]);
        let config = StoreConfig::from_lookup(|key| env.get(key).cloned());

        assert_eq!(config.db_path, PathBuf::from("/data/trips.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }
}
