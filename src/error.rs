use std::path::PathBuf;

/// Failures opening the ZIP container. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a valid HWPX container (not a ZIP archive): {}", .0.display())]
    NotAZip(PathBuf),
}

/// One section part that failed to parse. Recovered locally: the part yields an
/// empty section and the failure is reported on [`crate::Document::warnings`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed section part {part}: {message}")]
pub struct MalformedPart {
    pub part: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    EnvironmentUnsupported(String),
    #[error("template not found: {0}")]
    Template(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
