use marsview_router::RouterError;

/// Errors raised while assembling the application.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The router could not take over its root element.
    #[error(transparent)]
    Router(#[from] RouterError),
    /// The configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
