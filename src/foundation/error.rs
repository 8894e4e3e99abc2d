/// Result alias used across the crate.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors produced by the overlay pipeline.
///
/// Most of these never reach the page: the controller and bootstrapper absorb them and log
/// through `tracing`. They surface in the library API for hosts and for the CLI.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// A DOM query or mutation failed in the host environment.
    #[error("host error: {0}")]
    Host(String),

    /// A payload source could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Runtime options failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build an [`OverlayError::Host`].
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Build an [`OverlayError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OverlayError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
