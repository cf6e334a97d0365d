//! Error types for frame buffer operations.

use thiserror::Error;

/// Error type for frame buffer operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Malformed request: bad coordinates, mismatched buffers, bad options.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Format or format pair not supported by the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Well-formed request for a path that is not implemented.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// A transform primitive failed on an otherwise valid request.
    #[error("{primitive} failed: {message}")]
    Backend {
        /// Name of the failing primitive
        primitive: &'static str,
        /// Failure description
        message: String,
    },

    /// Output buffer metadata disagrees with the pipeline result.
    #[error("output metadata does not match pipeline result: {0}")]
    MetadataMismatch(String),

    /// Error raised by a vfb-core helper.
    #[error(transparent)]
    Core(#[from] vfb_core::Error),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidArgument`] error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`OpsError::Backend`] error.
    #[inline]
    pub fn backend(primitive: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            primitive,
            message: message.into(),
        }
    }

    /// Returns `true` for backend primitive failures.
    #[inline]
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Returns `true` for unimplemented paths.
    #[inline]
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, Self::Unimplemented(_))
    }

    /// Returns `true` for precondition failures, including core errors.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::MetadataMismatch(_) | Self::Unsupported(_) | Self::Core(_)
        )
    }
}

/// Result type for frame buffer operations.
pub type OpsResult<T> = Result<T, OpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_names_primitive() {
        let err = OpsError::backend("rotate", "plane too small");
        assert_eq!(err.to_string(), "rotate failed: plane too small");
        assert!(err.is_backend_error());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_core_conversion() {
        let err: OpsError = vfb_core::Error::out_of_bounds(5, 5, 2, 2).into();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("out of bounds"));
    }
}
