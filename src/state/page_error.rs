/// Per-page error definitions
///
/// None of these abort a crawl: each one is recorded against the URL that
/// produced it and the crawl carries on with the rest of the link graph.
use crate::UrlError;
use std::fmt;
use thiserror::Error;

/// Failure recorded against a single URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// The seed or a discovered link is not an absolute URL with a host
    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    /// Fetching the page failed (I/O, timeout, protocol or HTTP status)
    #[error("download failed: {0}")]
    Download(String),

    /// The page was downloaded but its links could not be extracted
    #[error("link extraction failed: {0}")]
    Extract(String),
}

/// Classification of a [`PageError`], without the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    MalformedUrl,
    DownloadError,
    ExtractError,
}

impl PageError {
    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedUrl(_) => ErrorKind::MalformedUrl,
            Self::Download(_) => ErrorKind::DownloadError,
            Self::Extract(_) => ErrorKind::ExtractError,
        }
    }

    /// Returns the human readable detail without the classification prefix
    pub fn message(&self) -> &str {
        match self {
            Self::MalformedUrl(m) | Self::Download(m) | Self::Extract(m) => m,
        }
    }
}

impl From<UrlError> for PageError {
    fn from(err: UrlError) -> Self {
        Self::MalformedUrl(err.to_string())
    }
}

impl ErrorKind {
    /// All kinds, in report order
    pub const ALL: [ErrorKind; 3] = [
        ErrorKind::MalformedUrl,
        ErrorKind::DownloadError,
        ErrorKind::ExtractError,
    ];

    /// Short label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedUrl => "malformed_url",
            Self::DownloadError => "download_error",
            Self::ExtractError => "extract_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
