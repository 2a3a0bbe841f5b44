//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MemoResult, StorageError};

/// Name of the directory used when no root is configured.
pub const DEFAULT_DIR_NAME: &str = "cache";

/// Configuration for the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskStoreConfig {
    /// Directory records are written to. `None` means `<cwd>/cache`.
    pub root: Option<PathBuf>,
    /// Flush each record to stable storage before it becomes visible.
    pub sync_writes: bool,
}

impl DiskStoreConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Enable or disable fsync on every write.
    pub fn with_sync_writes(mut self, enabled: bool) -> Self {
        self.sync_writes = enabled;
        self
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - an explicit root is not the empty path
    /// - an explicit root that already exists is a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(root) = &self.root else {
            return Ok(());
        };

        if root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: String::new(),
                reason: "root must not be empty".to_string(),
            });
        }

        if root.exists() && !root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: root.display().to_string(),
                reason: "root exists but is not a directory".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the root directory, falling back to `<cwd>/cache`.
    pub fn resolve_root(&self) -> MemoResult<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| StorageError::io(Path::new("."), &e))?;
                Ok(cwd.join(DEFAULT_DIR_NAME))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DiskStoreConfig::default();
        assert!(config.root.is_none());
        assert!(!config.sync_writes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DiskStoreConfig::new()
            .with_root("/var/tmp/fncache")
            .with_sync_writes(true);
        assert_eq!(config.root, Some(PathBuf::from("/var/tmp/fncache")));
        assert!(config.sync_writes);
    }

    #[test]
    fn test_default_root_is_cache_under_cwd() {
        let root = DiskStoreConfig::default().resolve_root().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(root, cwd.join("cache"));
    }

    #[test]
    fn test_explicit_root_is_used_verbatim() {
        let root = DiskStoreConfig::new()
            .with_root("relative/store")
            .resolve_root()
            .unwrap();
        assert_eq!(root, PathBuf::from("relative/store"));
    }

    #[test]
    fn test_empty_root_rejected() {
        let err = DiskStoreConfig::new().with_root("").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "root"));
    }

    #[test]
    fn test_root_pointing_at_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, b"not a dir").unwrap();

        let err = DiskStoreConfig::new().with_root(&file).validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_existing_directory_root_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let config = DiskStoreConfig::new().with_root(temp_dir.path());
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_root().unwrap(), temp_dir.path());
    }
}
