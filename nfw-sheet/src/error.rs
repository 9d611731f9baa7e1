use thiserror::Error;

use crate::model::Category;

/// Errors that abort a conversion run. Per-row problems are diagnostics, not
/// errors; see [`crate::diagnostics`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("required sheet '{sheet}' not found (available: {available})")]
    MissingSheet { sheet: String, available: String },
    #[error("sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },
    #[error(transparent)]
    Read(#[from] sheet_store::ReadError),
    #[error(transparent)]
    Write(#[from] sheet_store::WriteError),
    #[error("snapshot for {category} not found at {path}")]
    MissingSnapshot { category: Category, path: String },
    #[error("failed to read snapshot file {path}: {source}")]
    SnapshotIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse snapshot file {path}: {source}")]
    SnapshotParse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{category} item '{name}' listed but not present in snapshot")]
    MissingItem { category: Category, name: String },
    #[error("failed to decode {category} item '{name}': {source}")]
    Decode {
        category: Category,
        name: String,
        source: serde_json::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to serialize artifact {path}: {source}")]
    Serialize {
        path: String,
        source: serde_json::Error,
    },
}
