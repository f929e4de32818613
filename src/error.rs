use std::path::PathBuf;

use crate::loaders::ModelFormat;

/// Recoverable errors raised while turning user input into a model
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    /// The bytes could not be turned into a renderable model
    #[error("failed to parse {format} data: {reason}")]
    Parse { format: ModelFormat, reason: String },

    /// The file name does not map to any known loader
    #[error("unsupported model format: {name}")]
    UnsupportedFormat { name: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ViewerError {
    pub fn parse(format: ModelFormat, reason: impl Into<String>) -> Self {
        Self::Parse {
            format,
            reason: reason.into(),
        }
    }

    /// Errors the user should be told about. Unsupported formats are dropped.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::UnsupportedFormat { .. })
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
