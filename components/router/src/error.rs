/// Errors raised while setting up a [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RouterError {
    /// The document does not provide the element the router should own.
    #[error("router configuration: {0}")]
    Configuration(#[from] marsview_core::Error),
}
