//! Error types for the mailcat crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the MailCat API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / state errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The API base URL could not be parsed.
    #[error("invalid API base URL '{url}'")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed (bad proxy, TLS backend failure).
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// An authenticated operation was attempted before a mailbox exists.
    #[error("no mailbox created; call create_mailbox first")]
    NoMailbox,

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// The HTTP request failed before a response was received.
    #[error("request to {endpoint} failed")]
    Http {
        /// Method and path of the request, e.g. `GET /inbox`.
        endpoint: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP request exceeded the per-request timeout.
    #[error("request to {endpoint} timed out after {timeout:?}")]
    RequestTimeout {
        /// Method and path of the request.
        endpoint: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // API errors (mixed retryability)
    // ─────────────────────────────────────────────────────────────────────────
    /// HTTP 429: the service is throttling this client.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Message from the response envelope.
        message: String,
    },

    /// HTTP 401: the mailbox token was rejected.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Message from the response envelope.
        message: String,
    },

    /// The envelope reported `success: false`.
    #[error("MailCat API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message from the response envelope.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Protocol errors (NOT retryable, except a gateway page in place of a 5xx envelope)
    // ─────────────────────────────────────────────────────────────────────────
    /// The response body was not a valid envelope.
    #[error("failed to decode response from {endpoint} (HTTP {status})")]
    Decode {
        /// Method and path of the request.
        endpoint: String,
        /// HTTP status code of the response.
        status: u16,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The server handed out a mailbox address that does not parse.
    #[error("invalid email format: {email}")]
    InvalidEmailFormat {
        /// The invalid email address.
        email: String,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// The wait loop uses this to decide which poll failures to swallow:
    ///
    /// ```ignore
    /// if error.is_retryable() {
    ///     // Treat as an empty poll
    /// } else {
    ///     // Abort the wait
    /// }
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http { .. } | Error::RequestTimeout { .. } | Error::RateLimited { .. } => true,

            Error::Api { status, .. } | Error::Decode { status, .. } => *status >= 500,

            Error::InvalidConfig { .. }
            | Error::InvalidBaseUrl { .. }
            | Error::ClientBuild { .. }
            | Error::NoMailbox
            | Error::Authentication { .. }
            | Error::InvalidEmailFormat { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. } | Error::InvalidBaseUrl { .. } | Error::ClientBuild { .. } => {
                ErrorCategory::Configuration
            }
            Error::NoMailbox => ErrorCategory::State,
            Error::Http { .. } => ErrorCategory::Network,
            Error::RequestTimeout { .. } => ErrorCategory::Timeout,
            Error::RateLimited { .. } => ErrorCategory::RateLimit,
            Error::Authentication { .. } => ErrorCategory::Authentication,
            Error::Api { .. } => ErrorCategory::Api,
            Error::Decode { .. } | Error::InvalidEmailFormat { .. } => ErrorCategory::Protocol,
        }
    }

    /// Maps a reqwest send/read failure for `endpoint`, splitting out timeouts.
    pub(crate) fn from_transport(endpoint: &str, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Error::RequestTimeout {
                endpoint: endpoint.to_string(),
                timeout,
            }
        } else {
            Error::Http {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or client construction errors.
    Configuration,
    /// Operation called in the wrong state (no mailbox yet).
    State,
    /// Network connectivity errors.
    Network,
    /// Per-request timeout errors.
    Timeout,
    /// Throttled by the service.
    RateLimit,
    /// Token rejected.
    Authentication,
    /// Service reported a failure in the envelope.
    Api,
    /// Malformed response payload.
    Protocol,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::State => write!(f, "state"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::RateLimit => write!(f, "rate_limit"),
            ErrorCategory::Authentication => write!(f, "authentication"),
            ErrorCategory::Api => write!(f, "api"),
            ErrorCategory::Protocol => write!(f, "protocol"),
        }
    }
}
