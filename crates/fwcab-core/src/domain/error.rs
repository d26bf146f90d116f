//! Domain-level error taxonomy for fwcab.

use std::path::PathBuf;

/// Errors that abort processing of a file (or, in single-file mode, the run).
///
/// Per-file recoverable conditions (missing INF fields, unresolved version
/// format) are not errors; they are [`SkipReason`](crate::domain::SkipReason)
/// values carried in the per-file outcome.
#[derive(Debug, thiserror::Error)]
pub enum FwcabError {
    #[error("executable not found: {0}")]
    ToolNotFound(&'static str),

    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("failed to read payload file {path}: {source}")]
    PayloadUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read template {path}: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template slot left unsubstituted: {{{0}}}")]
    UnknownTemplateSlot(String),

    #[error("invalid UTF-32 payload in {path}")]
    InvalidUtf32 { path: PathBuf },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fwcab domain operations.
pub type Result<T> = std::result::Result<T, FwcabError>;
