//! Error types for scene loading

use thiserror::Error;

/// Errors that can occur while reading a scene asset
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("OBJ error: {message}")]
    Obj { message: String },

    #[error("glTF error: {0}")]
    Gltf(#[from] ::gltf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for storemap_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => storemap_core::Error::Io(e),
            IoError::FileNotFound { path } => storemap_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )),
            IoError::InvalidFormat { format } => storemap_core::Error::UnsupportedFormat(format),
            other => storemap_core::Error::Asset(other.to_string()),
        }
    }
}
