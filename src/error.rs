//! Cloudscape error handling
//!
//! One error enum for the whole pipeline. Everything here is detected and
//! handled at the frame/bake boundary; nothing propagates into the per-pixel
//! hot path. A malformed configuration degrades the visual output (no clouds),
//! it never aborts the frame.

/// Type alias for cloudscape operation results
pub type CloudResult<T> = Result<T, CloudError>;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// A parameter is out of its valid domain or a required resource is
    /// misconfigured. The affected feature is disabled for the session.
    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    /// A named noise asset failed to load. Density is treated as zero
    /// everywhere (clouds invisible) until the asset is rebaked.
    #[error("resource missing: {name}")]
    ResourceMissing { name: String },

    /// Previous-frame history is unusable (first frame, or the output
    /// resolution changed). Always recovered by rendering without history.
    #[error("stale temporal state: {reason}")]
    StaleTemporalState { reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Create a configuration error
pub fn configuration_error(message: impl Into<String>) -> CloudError {
    CloudError::ConfigurationError {
        message: message.into(),
    }
}

/// Create a missing-resource error
pub fn resource_missing(name: impl Into<String>) -> CloudError {
    CloudError::ResourceMissing { name: name.into() }
}
