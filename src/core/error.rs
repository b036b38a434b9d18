use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum EtfError {
    /// The identifier list could not be read or is not a JSON array of non-empty strings.
    #[error("invalid input file {}: {reason}", path.display())]
    InputFormat {
        /// The file that was being loaded.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// An error occurred during an HTTP request (transport failure or timeout).
    #[error("HTTP error: {}", transport_message(.0))]
    Http(#[from] reqwest::Error),

    /// The server returned an unsuccessful HTTP status code.
    #[error("HTTP {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A URL could not be built or parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response body that should have been JSON could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The page was fetched but is not recognizable as the expected page.
    #[error("unrecognized page: {0}")]
    Extraction(String),

    /// An output artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of [`EtfError`], used for logging and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal, raised before any network activity.
    InputFormat,
    /// Transport failure, timeout or non-2xx status for one item.
    Network,
    /// The page for one item was not recognizable.
    Extraction,
    /// The artifact for one item could not be persisted.
    Write,
}

impl EtfError {
    /// Maps this error onto the run-level taxonomy.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InputFormat { .. } => ErrorKind::InputFormat,
            Self::Http(_) | Self::Status { .. } | Self::Url(_) => ErrorKind::Network,
            Self::Json(_) | Self::Extraction(_) => ErrorKind::Extraction,
            Self::Write { .. } => ErrorKind::Write,
        }
    }

    pub(crate) fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InputFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// reqwest's `Display` stops at "error sending request"; append the causes.
fn transport_message(err: &reqwest::Error) -> String {
    let mut msg = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}
