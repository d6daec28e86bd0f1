use thiserror::Error;

/// Unified error type for the chess-video-index workspace.
///
/// Covers the upstream-call taxonomy (quota, rate limiting, transport), the parse
/// failures that occur per-item while walking RSS/JSON/ECO data, and the I/O and
/// configuration failures at the persistence and startup boundaries.
#[derive(Debug, Error, Clone)]
pub enum PipelineError {
    /// The process-wide quota budget has no remaining units for the reserved cost.
    #[error("quota exceeded: {remaining} units remaining, resets in {reset_in_ms}ms")]
    QuotaExceeded {
        /// Units remaining in the current window at the time of the failed reservation.
        remaining: u64,
        /// Milliseconds until the window resets.
        reset_in_ms: u64,
    },

    /// The upstream service responded with HTTP 429.
    #[error("rate limited by upstream service")]
    RateLimited,

    /// The upstream service responded with HTTP 403.
    #[error("forbidden by upstream service")]
    Forbidden,

    /// The upstream service responded with a non-2xx status not covered above.
    #[error("upstream error: HTTP {0}")]
    Upstream(u16),

    /// A request did not complete within its configured timeout.
    #[error("request timed out")]
    Timeout,

    /// A per-item parse failure (RSS entry, cache record, duration string, ECO code).
    #[error("parse error: {0}")]
    Parse(String),

    /// A filesystem operation failed for the given path.
    #[error("io error at {path}: {message}")]
    Io {
        /// Path the operation was attempted against.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// Startup configuration was missing or malformed.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl PipelineError {
    /// Build a [`PipelineError::Io`] from a path and an underlying error's display form.
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// True when the error represents a signal the caller should treat as an external
    /// rate limit, used by the indexer's all-channels-failed check.
    #[must_use]
    pub fn looks_like_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited | Self::QuotaExceeded { .. } => true,
            Self::Upstream(429) => true,
            Self::Parse(msg) | Self::ConfigInvalid(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("rate limit") || lower.contains("quota")
            }
            _ => false,
        }
    }
}
