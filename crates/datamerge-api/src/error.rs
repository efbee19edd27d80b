//! Error types for Datamerge API calls.

/// Error returned by every Datamerge API operation.
///
/// `Upstream` carries a human-readable message extracted from the upstream
/// error body (or the raw status + body text when the body cannot be parsed).
/// `Transport` wraps connection-level failures from `reqwest`. Neither variant
/// ever contains the API credential.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Upstream returned a non-2xx response.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The request never produced an upstream response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
