/// Convenience result type used across flipbook.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy used by the frame cache and display pipeline.
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// The source could not produce a page.
    #[error("decode error: {0}")]
    Decode(String),

    /// The normalizer has no canonical mapping for a raw pixel layout.
    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// Disposal compositing failed.
    #[error("compositing error: {0}")]
    Compositing(String),

    /// The frame window is empty at query time.
    #[error("no frames available")]
    NoFramesAvailable,

    /// An internal window invariant was violated during navigation.
    #[error("cache corruption: {0}")]
    CacheCorruption(String),

    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FlipbookError::UnsupportedPixelFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedPixelFormat(msg.into())
    }

    /// Build a [`FlipbookError::Compositing`] value.
    pub fn compositing(msg: impl Into<String>) -> Self {
        Self::Compositing(msg.into())
    }

    /// Build a [`FlipbookError::CacheCorruption`] value.
    pub fn cache_corruption(msg: impl Into<String>) -> Self {
        Self::CacheCorruption(msg.into())
    }

    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
