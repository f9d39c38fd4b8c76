use std::path::{Path, PathBuf};

use crate::error::{Result, ShortcutsError};

mod env;

use env::{parse_enabled_default_true, read_non_empty_env};

const ENV_STORE: &str = "SHORTCUT_INDEX_STORE";
const ENV_DB_PATH: &str = "SHORTCUT_INDEX_DB_PATH";
const ENV_EXPANSION: &str = "SHORTCUT_INDEX_EXPANSION";

/// Where shortcuts are persisted. `MemoryOnly` never touches disk and starts empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    Sqlite(PathBuf),
    MemoryOnly,
}

impl StorageMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::MemoryOnly => "memory",
        }
    }

    fn parse(raw: Option<&str>, db_path: PathBuf) -> Result<Self> {
        let normalized = raw.map(|value| value.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            None | Some("sqlite") => Ok(Self::Sqlite(db_path)),
            Some("memory") => Ok(Self::MemoryOnly),
            Some(other) => Err(ShortcutsError::Validation(format!(
                "invalid {ENV_STORE}: {other} (expected sqlite|memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub storage: StorageMode,
    /// Trim typed text and complete its last word from the suggestion description.
    pub expansion_enabled: bool,
}

impl BackendConfig {
    #[must_use]
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageMode::Sqlite(path.into()),
            expansion_enabled: true,
        }
    }

    #[must_use]
    pub fn memory_only() -> Self {
        Self {
            storage: StorageMode::MemoryOnly,
            expansion_enabled: true,
        }
    }

    #[must_use]
    pub fn with_expansion(mut self, enabled: bool) -> Self {
        self.expansion_enabled = enabled;
        self
    }

    pub fn from_env(default_db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = read_non_empty_env(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_db_path.as_ref().to_path_buf());
        Ok(Self {
            storage: StorageMode::parse(std::env::var(ENV_STORE).ok().as_deref(), db_path)?,
            expansion_enabled: parse_enabled_default_true(
                std::env::var(ENV_EXPANSION).ok().as_deref(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_mode_defaults_to_sqlite_at_given_path() {
        let mode = StorageMode::parse(None, PathBuf::from("/tmp/s.db")).expect("parse");
        assert_eq!(mode, StorageMode::Sqlite(PathBuf::from("/tmp/s.db")));
        assert_eq!(mode.as_str(), "sqlite");
    }

    #[test]
    fn storage_mode_accepts_memory_case_insensitively() {
        let mode = StorageMode::parse(Some(" Memory "), PathBuf::new()).expect("parse");
        assert_eq!(mode, StorageMode::MemoryOnly);
    }

    #[test]
    fn storage_mode_rejects_unknown_backend() {
        let err = StorageMode::parse(Some("redis"), PathBuf::new()).expect_err("must reject");
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn expansion_toggle_is_enabled_unless_explicitly_off() {
        assert!(parse_enabled_default_true(None));
        assert!(parse_enabled_default_true(Some("yes")));
        assert!(!parse_enabled_default_true(Some("OFF")));
        assert!(!parse_enabled_default_true(Some(" 0 ")));
        assert!(!parse_enabled_default_true(Some("false")));
    }

    #[test]
    fn builders_set_storage_and_expansion() {
        let config = BackendConfig::sqlite("/tmp/a.db").with_expansion(false);
        assert_eq!(config.storage, StorageMode::Sqlite(PathBuf::from("/tmp/a.db")));
        assert!(!config.expansion_enabled);
        assert_eq!(BackendConfig::memory_only().storage, StorageMode::MemoryOnly);
    }
}
