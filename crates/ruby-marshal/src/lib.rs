//! Read-only decoder for the Ruby marshal binary format.
//!
//! A marshal stream is a 2-byte version header followed by one tagged value.
//! [`decode`] turns it into a [`Value`] tree without running any code from
//! the producer: tagged objects and user-defined payloads come back as plain
//! data carrying their class name.
//!
//! ```
//! use ruby_marshal::{decode, TextEncoding, Value};
//!
//! // [1, "a", nil]
//! let bytes = b"\x04\x08[\x08i\x06\"\x06a0";
//! let value = decode(bytes, TextEncoding::Utf8).unwrap();
//! assert_eq!(
//!     value,
//!     Some(Value::Array(vec![
//!         Value::Integer(1),
//!         Value::Str("a".into()),
//!         Value::Nil,
//!     ]))
//! );
//! ```

pub mod cli;
mod decoder;
mod encoding;
mod error;
mod json;
pub mod long;
mod refs;
mod tag;
mod value;

pub use decoder::{DecoderOptions, FormatVersion, MarshalDecoder, DEFAULT_MAX_DEPTH};
pub use encoding::TextEncoding;
pub use error::{MarshalError, RefKind};
pub use refs::RefTables;
pub use tag::Tag;
pub use value::{MarshalObject, UserDefined, Value};

/// Decodes a marshal stream, applying `encoding` to every string and symbol.
///
/// Returns `Ok(None)` for input shorter than the 2-byte header.
pub fn decode(data: &[u8], encoding: TextEncoding) -> Result<Option<Value>, MarshalError> {
    MarshalDecoder::with_options(DecoderOptions {
        encoding,
        ..DecoderOptions::default()
    })
    .decode(data)
}

/// Like [`decode`], also returning the number of bytes the stream occupied.
pub fn decode_with_consumed(
    data: &[u8],
    encoding: TextEncoding,
) -> Result<Option<(Value, usize)>, MarshalError> {
    MarshalDecoder::with_options(DecoderOptions {
        encoding,
        ..DecoderOptions::default()
    })
    .decode_with_consumed(data)
}

/// Decodes a stream straight to its JSON projection. Input too short to hold
/// a value gives `null`.
pub fn decode_to_json(
    data: &[u8],
    encoding: TextEncoding,
) -> Result<serde_json::Value, MarshalError> {
    Ok(decode(data, encoding)?
        .map(serde_json::Value::from)
        .unwrap_or(serde_json::Value::Null))
}
