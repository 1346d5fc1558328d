//! Error types for the EWKB codec.
//!
//! Every failure carries the offset at which it was detected so callers can
//! tell which byte of which record went wrong.

use std::fmt;
use thiserror::Error;

pub type EwkbResult<T> = Result<T, EwkbError>;

/// Errors that can occur while decoding EWKB or encoding GeoJSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EwkbError {
    /// The hex text is not valid hex. `offset` is a character index.
    #[error("invalid hex input at character {offset}: {reason}")]
    InvalidInput {
        /// Character index of the offending digit.
        offset: usize,
        /// What was wrong with the text.
        reason: String,
    },

    /// The buffer ended before an expected field.
    #[error("unexpected end of input at byte {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Byte offset of the read that failed.
        offset: usize,
        /// Bytes required by the read.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Counts, element kinds or nesting are inconsistent with the buffer.
    #[error("malformed geometry at byte {offset}: {reason}")]
    MalformedGeometry {
        /// Byte offset at which the problem was detected.
        offset: usize,
        /// Description of the inconsistency.
        reason: String,
    },

    /// The base type (`type_code & 0xFF`) is outside 1..=7.
    #[error("unsupported geometry type code {type_code:#010x} at byte {offset}")]
    UnsupportedGeometryType {
        /// Byte offset of the type code.
        offset: usize,
        /// The raw 32-bit type code, flags included.
        type_code: u32,
    },
}

impl EwkbError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        EwkbError::MalformedGeometry {
            offset,
            reason: reason.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EwkbError::InvalidInput { .. } => ErrorKind::InvalidInput,
            EwkbError::Truncated { .. } => ErrorKind::TruncatedInput,
            EwkbError::MalformedGeometry { .. } => ErrorKind::MalformedGeometry,
            EwkbError::UnsupportedGeometryType { .. } => ErrorKind::UnsupportedGeometryType,
        }
    }

    /// Returns the offset at which this error was detected.
    pub fn offset(&self) -> usize {
        match self {
            EwkbError::InvalidInput { offset, .. }
            | EwkbError::Truncated { offset, .. }
            | EwkbError::MalformedGeometry { offset, .. }
            | EwkbError::UnsupportedGeometryType { offset, .. } => *offset,
        }
    }
}

/// The category of a conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed hex text.
    InvalidInput,
    /// Buffer exhausted before an expected field.
    TruncatedInput,
    /// Implausible counts, wrong element kinds or excessive nesting.
    MalformedGeometry,
    /// Base type outside 1..=7.
    UnsupportedGeometryType,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::MalformedGeometry => "malformed geometry",
            ErrorKind::UnsupportedGeometryType => "unsupported geometry type",
        };
        write!(f, "{}", description)
    }
}

/// Error returned by the conversion facade for a single record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct ConversionError {
    /// The failure category.
    pub kind: ErrorKind,
    /// Offset reported by the underlying error.
    pub offset: usize,
    /// The underlying codec error.
    #[source]
    pub cause: EwkbError,
}

impl From<EwkbError> for ConversionError {
    fn from(cause: EwkbError) -> Self {
        Self {
            kind: cause.kind(),
            offset: cause.offset(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_kind_and_offset() {
        let err = EwkbError::Truncated {
            offset: 9,
            needed: 8,
            remaining: 3,
        };
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(err.offset(), 9);
    }

    #[test]
    fn test_conversion_error_keeps_cause() {
        let cause = EwkbError::UnsupportedGeometryType {
            offset: 1,
            type_code: 0x11,
        };
        let err = ConversionError::from(cause.clone());
        assert_eq!(err.kind, ErrorKind::UnsupportedGeometryType);
        assert_eq!(err.offset, 1);
        assert_eq!(err.to_string(), "unsupported geometry type at offset 1");
        assert_eq!(err.source().map(|s| s.to_string()), Some(cause.to_string()));
    }

    #[test]
    fn test_type_code_display() {
        let err = EwkbError::UnsupportedGeometryType {
            offset: 1,
            type_code: 0x2000_0011,
        };
        assert_eq!(
            err.to_string(),
            "unsupported geometry type code 0x20000011 at byte 1"
        );
    }
}
