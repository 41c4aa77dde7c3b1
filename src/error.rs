//! Error type shared by the storage layer and the store.

use thiserror::Error;

/// Failures raised below the store boundary.
///
/// The store itself never lets these escape its mutation methods; they are
/// turned into the snapshot's error string. Storage backends and the FFI
/// layer see them directly.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("LMDB error: {0}")]
    Storage(#[from] lmdb::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("slot '{0}' holds bytes that are not valid UTF-8")]
    InvalidUtf8(String),

    #[error("store was reset; restart it before making changes")]
    Retired,
}
