//! Store configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StoreError;

pub const DEFAULT_RECORDS_KEY: &str = "happinessRecords";
pub const DEFAULT_DISPLAY_NAME_KEY: &str = "userName";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Where and how the journal is stored.
///
/// `path` is a base name; the LMDB environment lives in `<path>.lmdb`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StoreConfig {
    pub path: PathBuf,
    pub records_key: String,
    pub display_name_key: String,
    pub map_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("happiness"),
            records_key: DEFAULT_RECORDS_KEY.to_string(),
            display_name_key: DEFAULT_DISPLAY_NAME_KEY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn named(name: impl Into<PathBuf>) -> Self {
        Self {
            path: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Directory holding the LMDB environment.
    pub fn lmdb_dir(&self) -> PathBuf {
        let mut dir = self.path.clone().into_os_string();
        dir.push(".lmdb");
        PathBuf::from(dir)
    }
}
