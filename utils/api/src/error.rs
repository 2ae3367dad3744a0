/// Failures of a photo request.
///
/// Every variant displays with the `Failed to fetch photos:` prefix pages
/// show to the user.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("Failed to fetch photos: HTTP error! status: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The request never produced a response.
    #[error("Failed to fetch photos: {0}")]
    Transport(String),
    /// The response body is not the expected JSON.
    #[error("Failed to fetch photos: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Creates a [`ApiError::Transport`] from any displayable cause.
    pub fn transport(cause: impl ToString) -> Self {
        Self::Transport(cause.to_string())
    }
}
