//! Error types for the orchestrator and the render worker.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed error produced by an [`HtmlSource`](crate::source::HtmlSource).
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the orchestrator.
pub type Result<T, E = CourierError> = std::result::Result<T, E>;

/// The three HTML documents staged for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPart {
    Header,
    Footer,
    Content,
}

impl fmt::Display for DocumentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentPart::Header => "header",
            DocumentPart::Footer => "footer",
            DocumentPart::Content => "content",
        })
    }
}

/// Everything `produce` and `merge` can fail with.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Storage directory unset, missing or read-only; bad config document.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An HTML source failed (or panicked) while rendering to a string.
    #[error("failed to render {part} HTML: {source}")]
    Conversion {
        part: DocumentPart,
        #[source]
        source: SourceError,
    },

    /// The renderer wrote to stderr or exited unsuccessfully.
    #[error("renderer: {0}")]
    Renderer(String),

    #[error("renderer timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A merge input was rejected before the merge tool ran.
    #[error("validation error: {0}")]
    Validation(String),

    /// The merge tool exited unsuccessfully.
    #[error("merge failed: {0}")]
    Merge(String),

    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CourierError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CourierError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Failures inside `courier-render`. They reach the orchestrator only as a
/// stderr line and a non-zero exit status.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Unable to load the file! ({url}): {source:#}")]
    Load {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("document never reached readyState \"complete\" after {polls} polls")]
    NotReady { polls: u32 },

    #[error("rendering cancelled")]
    Cancelled,

    #[error("unsupported paper format `{0}`")]
    UnknownPaperFormat(String),

    #[error("invalid CSS length `{0}`")]
    InvalidLength(String),

    #[error("DPI must be at least 1 to size the page without a paper format")]
    InvalidDpi,

    #[error("invalid document location `{0}`")]
    InvalidLocation(String),

    #[error("rendering engine: {0:#}")]
    Engine(#[from] anyhow::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_error_carries_stderr_verbatim() {
        let err = CourierError::Renderer("ReferenceError: x is not defined\n".into());
        assert_eq!(err.to_string(), "renderer: ReferenceError: x is not defined\n");
    }

    #[test]
    fn conversion_error_names_the_part() {
        let err = CourierError::Conversion {
            part: DocumentPart::Footer,
            source: "missing variable".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to render footer HTML: missing variable"
        );
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = CourierError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "renderer timed out after 60s");
    }
}
