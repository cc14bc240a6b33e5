//! Marshal stream decoder.
//!
//! A recursive-descent reader: [`DecodeContext::read_value`] reads one tag
//! byte and hands off to the reader for that type, which calls back into
//! `read_value` for every child.

use std::sync::Arc;

use indexmap::IndexMap;
use marshal_buffers::Reader;
use tracing::{debug, trace};

use crate::encoding::TextEncoding;
use crate::error::MarshalError;
use crate::long::{read_len, read_long};
use crate::refs::RefTables;
use crate::tag::Tag;
use crate::value::{MapBuilder, MarshalObject, UserDefined, Value};

/// Nesting depth allowed by [`DecoderOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options controlling decoding behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Encoding applied to every string and symbol payload.
    pub encoding: TextEncoding,
    /// Maximum number of nested values before decoding fails.
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The two header bytes at the start of every stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
}

/// Marshal decoder.
///
/// Holds options and the header of the last stream it decoded; all per-stream
/// state (cursor, symbol and object tables) lives only for the duration of a
/// single [`decode`](MarshalDecoder::decode) call.
#[derive(Debug, Default)]
pub struct MarshalDecoder {
    pub options: DecoderOptions,
    version: Option<FormatVersion>,
}

impl MarshalDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            version: None,
        }
    }

    /// Header of the most recently decoded stream, if it had one.
    pub fn version(&self) -> Option<FormatVersion> {
        self.version
    }

    /// Decodes a complete stream.
    ///
    /// Returns `Ok(None)` when `data` is shorter than the 2-byte header.
    /// Bytes after the top-level value are ignored.
    pub fn decode(&mut self, data: &[u8]) -> Result<Option<Value>, MarshalError> {
        Ok(self.decode_with_consumed(data)?.map(|(value, _)| value))
    }

    /// Like [`decode`](MarshalDecoder::decode), also returning how many bytes
    /// of `data` the stream occupied.
    pub fn decode_with_consumed(
        &mut self,
        data: &[u8],
    ) -> Result<Option<(Value, usize)>, MarshalError> {
        self.version = None;
        if data.len() < 2 {
            debug!(len = data.len(), "input shorter than marshal header");
            return Ok(None);
        }
        let version = FormatVersion {
            major: data[0],
            minor: data[1],
        };
        self.version = Some(version);
        debug!(
            len = data.len(),
            major = version.major,
            minor = version.minor,
            encoding = %self.options.encoding,
            "decoding marshal stream"
        );

        let mut ctx = DecodeContext::new(Reader::at(data, 2), self.options);
        match ctx.read_value() {
            Ok(value) => {
                debug!(
                    consumed = ctx.reader.x,
                    symbols = ctx.refs.symbol_count(),
                    objects = ctx.refs.object_count(),
                    "decoded marshal stream"
                );
                Ok(Some((value, ctx.reader.x)))
            }
            Err(e) => {
                debug!(error = %e, offset = ctx.reader.x, "marshal decode failed");
                Err(e)
            }
        }
    }
}

/// Per-stream decoding state.
struct DecodeContext<'a> {
    reader: Reader<'a>,
    encoding: TextEncoding,
    refs: RefTables,
    depth: usize,
    max_depth: usize,
}

impl<'a> DecodeContext<'a> {
    fn new(reader: Reader<'a>, options: DecoderOptions) -> Self {
        Self {
            reader,
            encoding: options.encoding,
            refs: RefTables::new(),
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    fn read_value(&mut self) -> Result<Value, MarshalError> {
        let offset = self.reader.x;
        let byte = self.reader.try_u8()?;
        let tag = Tag::from_byte(byte).ok_or(MarshalError::UnsupportedTag { tag: byte, offset })?;

        if self.depth >= self.max_depth {
            return Err(MarshalError::DepthLimitExceeded(self.max_depth));
        }
        trace!(tag = %char::from(tag.byte()), offset, depth = self.depth, "read value");
        self.depth += 1;
        let value = self.read_tagged(tag);
        self.depth -= 1;
        value
    }

    fn read_tagged(&mut self, tag: Tag) -> Result<Value, MarshalError> {
        match tag {
            Tag::Str => Ok(Value::Str(self.read_text()?)),
            Tag::Nil => Ok(Value::Nil),
            Tag::Symbol => {
                let text = self.read_text()?;
                Ok(self.refs.intern_symbol(text))
            }
            Tag::SymbolLink => {
                let index = read_long(&mut self.reader)?;
                trace!(index, "symbol link");
                self.refs.resolve_symbol(index)
            }
            Tag::ObjectLink => {
                let index = read_long(&mut self.reader)?;
                trace!(index, "object link");
                self.refs.resolve_object(index)
            }
            Tag::False => Ok(Value::Bool(false)),
            Tag::True => Ok(Value::Bool(true)),
            Tag::InstanceVars => self.read_instance_vars(),
            Tag::Array => self.read_array(),
            Tag::Float => self.read_float(),
            Tag::Integer => Ok(Value::Integer(read_long(&mut self.reader)?)),
            Tag::Object => self.read_object(),
            Tag::UserDefined => self.read_user_defined(),
            Tag::Hash => self.read_hash(),
        }
    }

    /// Reads a length-prefixed byte sequence.
    fn read_bytes(&mut self) -> Result<&'a [u8], MarshalError> {
        let len = read_len(&mut self.reader)?;
        Ok(self.reader.try_buf(len)?)
    }

    fn read_text(&mut self) -> Result<String, MarshalError> {
        let bytes = self.read_bytes()?;
        Ok(self.encoding.decode(bytes))
    }

    /// Reads an element count. Used to size allocations, so it is clamped
    /// to what the remaining input could possibly hold.
    fn read_count(&mut self) -> Result<(usize, usize), MarshalError> {
        let count = read_len(&mut self.reader)?;
        Ok((count, count.min(self.reader.size())))
    }

    fn read_array(&mut self) -> Result<Value, MarshalError> {
        let (count, capacity) = self.read_count()?;
        let mut items = Vec::with_capacity(capacity);
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(Value::Array(items))
    }

    fn read_hash(&mut self) -> Result<Value, MarshalError> {
        let (count, capacity) = self.read_count()?;
        let mut map = MapBuilder::with_capacity(capacity);
        for _ in 0..count {
            let key = self.read_value()?;
            let value = self.read_value()?;
            map.insert(key, value);
        }
        Ok(map.finish())
    }

    fn read_float(&mut self) -> Result<Value, MarshalError> {
        let bytes = self.read_bytes()?;
        if bytes.starts_with(b"inf") {
            return Ok(Value::Float(f64::INFINITY));
        }
        if bytes.starts_with(b"-inf") {
            return Ok(Value::Float(f64::NEG_INFINITY));
        }
        if bytes.starts_with(b"nan") {
            return Ok(Value::Float(f64::NAN));
        }
        let text = TextEncoding::Latin1.decode(bytes);
        parse_float_prefix(&text)
            .map(Value::Float)
            .ok_or(MarshalError::InvalidFloat(text))
    }

    /// Reads a tagged object. The object is registered for `@` links only
    /// after all of its properties are decoded, so a link to the object from
    /// inside its own properties fails with `BadReference`.
    fn read_object(&mut self) -> Result<Value, MarshalError> {
        let classname = self.read_value()?;
        let (count, capacity) = self.read_count()?;
        let mut properties = IndexMap::with_capacity(capacity);
        for _ in 0..count {
            let offset = self.reader.x;
            let name = match self.read_value()? {
                Value::Str(s) | Value::Symbol(s) => s,
                _ => return Err(MarshalError::InvalidPropertyName { offset }),
            };
            let value = self.read_value()?;
            properties.insert(strip_sigil(&name).to_string(), value);
        }
        let object = Arc::new(MarshalObject {
            classname,
            properties,
        });
        self.refs.register_object(Arc::clone(&object));
        Ok(Value::Object(object))
    }

    fn read_user_defined(&mut self) -> Result<Value, MarshalError> {
        let classname = self.read_value()?;
        let data = self.read_bytes()?.to_vec();
        Ok(Value::UserDefined(Box::new(UserDefined { classname, data })))
    }

    /// Reads a value followed by instance-variable annotations. The
    /// annotations (including the `E` encoding flag) are consumed and dropped.
    fn read_instance_vars(&mut self) -> Result<Value, MarshalError> {
        let value = self.read_value()?;
        let count = read_len(&mut self.reader)?;
        for _ in 0..count {
            self.read_value()?;
            self.read_value()?;
        }
        trace!(count, "dropped instance variables");
        Ok(value)
    }
}

fn strip_sigil(name: &str) -> &str {
    let mut chars = name.chars();
    chars.next();
    chars.as_str()
}

/// Parses the longest leading decimal floating-point literal in `text`,
/// ignoring leading whitespace and anything after the literal.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    text[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
