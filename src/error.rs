//! Error types.
//!
//! Two layers:
//!
//! - `AppError` aborts the process (bad flags, bad configuration, export I/O).
//!   It carries the exit code the binary should return.
//! - `FeedError` degrades a single feed. The orchestrator catches it and turns it
//!   into a failure-flagged `FeedResult`; it never ends a run.

use thiserror::Error;

/// Exit code for usage/configuration problems.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for `--strict` runs where at least one feed failed.
pub const EXIT_FEED_FAILED: u8 = 3;
/// Exit code for runtime failures outside any single feed.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Per-feed failure.
///
/// Line-level and record-level problems (malformed rows, unparseable dates) are
/// not represented here: they drop the offending row and are only counted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Connection failure, DNS failure, or request timeout.
    #[error("request to {url} failed: {detail}")]
    Network { url: String, detail: String },

    /// The server answered with a non-2xx status.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The header marker never appeared in the payload.
    #[error("header line containing `{marker}` not found")]
    SchemaNotFound { marker: String },

    /// The body could not be read as text.
    #[error("could not decode response body: {detail}")]
    Decode { detail: String },

    /// The vulnerability API could not be queried or answered with garbage.
    #[error("vulnerability API unavailable: {detail}")]
    AdapterTransient { detail: String },
}

impl FeedError {
    /// True for a "404 Not Found" answer, the one status the dated feed retries on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::HttpStatus { status: 404, .. })
    }

    /// Short machine-friendly label used in exports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Network { .. } => "network",
            FeedError::HttpStatus { .. } => "http_status",
            FeedError::SchemaNotFound { .. } => "schema_not_found",
            FeedError::Decode { .. } => "decode",
            FeedError::AdapterTransient { .. } => "adapter_transient",
        }
    }
}
