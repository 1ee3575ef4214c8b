//! Defines [`GeoStreamError`], representing all errors returned by this crate.

use std::collections::TryReserveError;
use std::fmt::Debug;

use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoStreamError {
    /// A token or byte sequence that does not follow the input grammar.
    ///
    /// `position` is the byte offset into the feature's input where decoding stopped.
    #[error("Malformed input at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    /// Well-formed input that violates a geometry invariant, such as an unclosed ring or
    /// coordinates whose dimensions disagree.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Growing an output buffer failed.
    #[error("Allocation failure: {0}")]
    Allocation(#[from] TryReserveError),

    /// Geometries nested deeper than the configured maximum.
    #[error("Nesting depth exceeds the maximum of {0}")]
    DepthLimitExceeded(usize),

    /// Unknown WKB type code or dimension flag.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Incorrect geometry type for operation
    #[error("Incorrect geometry type for operation: {0}")]
    IncorrectGeometryType(String),

    /// Bad arguments supplied when constructing a reader, writer or filter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A traversal that stopped because an error was escalated at `feature`.
    #[error("Traversal aborted at feature {feature}: {source}")]
    Aborted {
        feature: usize,
        #[source]
        source: Box<GeoStreamError>,
    },

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl GeoStreamError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }

    /// Whether this error always ends the traversal, regardless of how handlers react to it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }

    /// The underlying cause, looking through [`GeoStreamError::Aborted`].
    pub fn root_cause(&self) -> &GeoStreamError {
        match self {
            Self::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoStreamError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        let err = GeoStreamError::malformed(10, "Expected ')'");
        assert_eq!(err.to_string(), "Malformed input at byte 10: Expected ')'");

        let err = GeoStreamError::Aborted {
            feature: 3,
            source: Box::new(GeoStreamError::DepthLimitExceeded(2)),
        };
        assert_eq!(
            err.to_string(),
            "Traversal aborted at feature 3: Nesting depth exceeds the maximum of 2"
        );
        assert!(matches!(
            err.root_cause(),
            GeoStreamError::DepthLimitExceeded(2)
        ));
    }

    #[test]
    fn fatal_classes() {
        let mut v: Vec<u8> = Vec::new();
        let alloc = v.try_reserve(usize::MAX).unwrap_err();
        assert!(GeoStreamError::from(alloc).is_fatal());
        assert!(!GeoStreamError::Structural("unclosed ring".into()).is_fatal());
        assert!(!GeoStreamError::UnsupportedEncoding("type 99".into()).is_fatal());
    }
}
