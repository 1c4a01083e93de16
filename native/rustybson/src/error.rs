//! Error types for document operations.
//!
//! Lookups that find nothing are not errors: they return `Ok(None)`.

use std::collections::TryReserveError;

/// Why a structural operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOp {
    /// Target must be an object or array.
    #[error("element is not a container")]
    NotAContainer,
    /// Target must be a leaf value.
    #[error("element is not a leaf")]
    NotALeaf,
    /// The element already has a parent.
    #[error("element is already attached")]
    AlreadyAttached,
    /// Attaching would make a container its own descendant.
    #[error("element would become its own ancestor")]
    WouldCycle,
    /// The root cannot be renamed, removed, or attached elsewhere.
    #[error("operation not permitted on the root element")]
    RootElement,
    /// The element has no parent to operate relative to.
    #[error("element is detached")]
    Detached,
    /// The element handle belongs to a different document.
    #[error("element belongs to another document")]
    ForeignElement,
    /// Field names cannot contain NUL bytes.
    #[error("invalid field name")]
    InvalidName,
}

/// Error type for document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Rejected atomically; the tree is unchanged.
    #[error("invalid operation: {0}")]
    InvalidOperation(#[from] InvalidOp),

    /// The arena or a heap could not grow.
    #[error("allocation failed: {what}")]
    Allocation { what: &'static str },

    /// Malformed encoded bytes, reported at the offset where decoding stopped.
    #[error("codec failure at offset {offset}: {reason}")]
    Codec { offset: usize, reason: &'static str },
}

impl Error {
    #[inline]
    pub(crate) fn codec(offset: usize, reason: &'static str) -> Self {
        Error::Codec { offset, reason }
    }

    #[inline]
    pub(crate) fn alloc(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Error::Allocation { what }
    }

    /// True if this error came from malformed input bytes.
    pub fn is_codec(&self) -> bool {
        matches!(self, Error::Codec { .. })
    }

    /// The rejection reason, if this is an invalid operation.
    pub fn invalid_op(&self) -> Option<InvalidOp> {
        match self {
            Error::InvalidOperation(op) => Some(*op),
            _ => None,
        }
    }
}

/// Result type alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::from(InvalidOp::WouldCycle);
        assert_eq!(
            err.to_string(),
            "invalid operation: element would become its own ancestor"
        );
        assert_eq!(
            Error::codec(12, "truncated value").to_string(),
            "codec failure at offset 12: truncated value"
        );
    }

    #[test]
    fn test_invalid_op_accessor() {
        assert_eq!(
            Error::from(InvalidOp::NotALeaf).invalid_op(),
            Some(InvalidOp::NotALeaf)
        );
        assert!(Error::codec(0, "x").is_codec());
        assert_eq!(Error::codec(0, "x").invalid_op(), None);
    }
}
