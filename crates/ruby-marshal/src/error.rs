//! Marshal decoder error type.

use marshal_buffers::BufferError;
use thiserror::Error;

/// Which back-reference table an index was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Symbol,
    Object,
}

impl std::fmt::Display for RefKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefKind::Symbol => f.write_str("symbol"),
            RefKind::Object => f.write_str("object"),
        }
    }
}

/// Error type for marshal decoding. Every variant aborts the decode call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unsupported type 0x{tag:02x} at offset 0x{offset:x}")]
    UnsupportedTag { tag: u8, offset: usize },
    #[error("bad {kind} reference: index {index} is out of range")]
    BadReference { kind: RefKind, index: i64 },
    #[error("invalid length {length} at offset 0x{offset:x}")]
    InvalidLength { length: i64, offset: usize },
    #[error("invalid float literal: {0:?}")]
    InvalidFloat(String),
    #[error("object property name at offset 0x{offset:x} is not a string or symbol")]
    InvalidPropertyName { offset: usize },
    #[error("maximum nesting depth of {0} exceeded")]
    DepthLimitExceeded(usize),
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),
}

impl From<BufferError> for MarshalError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfBuffer => MarshalError::UnexpectedEndOfInput,
        }
    }
}
