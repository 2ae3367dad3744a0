use alloc::string::String;

/// Errors raised while wiring components into a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No element with the configured id exists in the document.
    #[error("root element `#{0}` not found")]
    RootNotFound(String),
}

/// Result alias used across the core crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
