/// Convenience result type used across the crate.
pub type ScatterwallResult<T> = Result<T, ScatterwallError>;

/// Top-level error taxonomy used by engine APIs.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ScatterwallError {
    /// Invalid user-provided scene or recipe data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-positive dimensions passed to a rasterization pass.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested surface width.
        width: u32,
        /// Requested surface height.
        height: u32,
    },

    /// A recipe's fill kind is not one the renderer understands.
    #[error("unsupported fill kind '{kind}'")]
    UnsupportedFill {
        /// The unrecognized kind string from the configuration surface.
        kind: String,
    },

    /// Errors while compositing pixel buffers.
    #[error("composite error: {0}")]
    Composite(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScatterwallError {
    /// Build a [`ScatterwallError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScatterwallError::Composite`] value.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_prefixed() {
        let err = ScatterwallError::validation("density must be >= 0");
        assert_eq!(err.to_string(), "validation error: density must be >= 0");
    }

    #[test]
    fn invalid_dimensions_reports_both_axes() {
        let err = ScatterwallError::InvalidDimensions {
            width: 0,
            height: 1080,
        };
        assert_eq!(err.to_string(), "invalid dimensions: 0x1080");
    }

    #[test]
    fn anyhow_errors_pass_through() {
        let err: ScatterwallError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, ScatterwallError::Other(_)));
    }
}
