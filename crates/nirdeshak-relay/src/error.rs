//! Relay error types.
//!
//! Two families of errors exist:
//!
//! - [`RelayError`] covers startup and local faults (bad configuration, a
//!   temporary file that could not be staged, a client that could not be
//!   built).
//! - [`UpstreamFailure`] is the classified outcome of a single call to an
//!   upstream provider.  It is returned as an ordinary value so callers can
//!   match on every class exhaustively when choosing a response.

use std::fmt;

/// Errors raised while configuring the relay or preparing a request locally.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A required environment variable is absent or empty.
    #[error("missing required configuration: {name}")]
    MissingConfig { name: &'static str },

    /// A configuration value is present but cannot be used.
    #[error("invalid configuration for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A temporary audio file could not be created, written or read.
    #[error("audio staging failed: {0}")]
    AudioStaging(#[from] std::io::Error),
}

/// Convenience alias for fallible local operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Outcome of a single upstream call.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamFailure>;

/// Why a structurally successful (2xx) upstream response was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// The body was not valid JSON.
    InvalidFormat,
    /// The JSON lacked the fields the relay extracts (`choices[0].message.content`,
    /// `transcript`, `audios[0]`).
    MissingChoice,
}

/// Classified failure of one upstream call.
///
/// Variants are listed in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    /// The call did not complete within the configured timeout.
    #[error("upstream request timed out")]
    Timeout,

    /// The provider could not be reached (DNS, refused connection, TLS).
    #[error("upstream service unavailable")]
    Unavailable,

    /// The provider rejected our credentials (HTTP 401).
    #[error("upstream rejected credentials")]
    AuthFailed,

    /// The provider throttled us (HTTP 429).
    #[error("upstream rate limit exceeded")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("upstream returned status {status}")]
    UpstreamError { status: u16 },

    /// A 2xx response whose body the relay could not use.
    #[error("upstream response malformed: {0}")]
    MalformedResponse(MalformedKind),

    /// The relay itself failed before or after the call.
    #[error("internal relay error")]
    Internal,
}

impl UpstreamFailure {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthFailed,
            429 => Self::RateLimited,
            status => Self::UpstreamError { status },
        }
    }

    /// Classify a transport-level error raised by `reqwest`.
    ///
    /// Timeouts take priority over every other class.  A request that could
    /// not even be assembled locally is an internal fault; anything else that
    /// prevented a response from arriving counts as unavailability.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Internal
        } else {
            Self::Unavailable
        }
    }

    /// Short machine-readable tag, used in log fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Unavailable => "UNAVAILABLE",
            Self::AuthFailed => "AUTH_FAILED",
            Self::RateLimited => "RATE_LIMITED",
            Self::UpstreamError { .. } => "UPSTREAM_ERROR",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => f.write_str("body is not valid JSON"),
            Self::MissingChoice => f.write_str("expected fields are missing"),
        }
    }
}

impl From<RelayError> for UpstreamFailure {
    fn from(err: RelayError) -> Self {
        tracing::error!(error = %err, "local failure while calling upstream");
        Self::Internal
    }
}
