use thiserror::Error;

/// Errors reported by the external collaborators in [`crate::provider`].
///
/// `ReferenceUnavailable` means positioning failed or was denied; every other
/// variant is a fetch failure (see [`ProviderError::is_fetch_failure`]). None
/// of them is fatal: the session degrades to original-order ranking, an empty
/// candidate list, or an absent route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The device position could not be determined.
    #[error("reference location unavailable: {reason}")]
    ReferenceUnavailable {
        /// Why positioning failed, e.g. permission denied.
        reason: String,
    },
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The connection failed before a response arrived.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// The URL that was requested.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The service answered but reported an error in its body.
    #[error("service error {code}: {message}")]
    ServiceError {
        /// Service-specific status code.
        code: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
}

impl ProviderError {
    /// Whether this is a network or provider failure rather than a
    /// positioning failure.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        !matches!(self, Self::ReferenceUnavailable { .. })
    }
}
