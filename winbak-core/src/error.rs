use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WinbakError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Fatal: raised before any archive is touched.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("cannot decode entry name {raw} as {codec}")]
    Decode { codec: &'static str, raw: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("final path already exists (overwrite not allowed): {}", .0.display())]
    OverwriteConflict(PathBuf),

    #[error("size mismatch for {}: expected={expected}, actual={actual}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("merge tool failed: {0}")]
    MergeTool(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, WinbakError>;
