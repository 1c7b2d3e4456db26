// ============================================
// src/error.rs
// カタログとストレージのエラー型
// ============================================

use std::path::PathBuf;

use thiserror::Error;

/// カタログ読み込み時のエラー (起動時のみ発生する)
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed catalog: category `{category}`: {source}")]
    Category {
        category: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 永続ストレージへの書き込みエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode storage value: {0}")]
    Encode(#[from] serde_json::Error),
}
