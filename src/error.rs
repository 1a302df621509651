//! Error types for layout composition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving or rendering a layout partial.
///
/// `block` and the content operations have no failure path; only partial
/// resolution (`extend`, `embed`, `render`) and data serialization can fail.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The named partial could not be resolved to any template source,
    /// neither pre-registered with the host nor found on disk.
    #[error("missing partial: '{name}'")]
    MissingPartial { name: String },

    /// A probed partial file exists but could not be read.
    #[error("failed to read partial {}: {message}", path.display())]
    PartialRead { path: PathBuf, message: String },

    /// The host failed to compile a template source.
    #[error("template error: {0}")]
    Template(String),

    /// Render data could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ComposeError {
    fn from(err: serde_json::Error) -> Self {
        ComposeError::Serialization(err.to_string())
    }
}

/// Result type for composer operations.
pub type Result<T> = std::result::Result<T, ComposeError>;
