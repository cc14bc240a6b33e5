//! Byte buffer primitives for marshal-rs.
//!
//! The only consumer today is the marshal decoder, which needs a cursor over
//! an immutable byte slice with little-endian fixed-width reads that never
//! panic on truncated input.

mod reader;

pub use reader::Reader;

use thiserror::Error;

/// Error type for buffer reads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
}
