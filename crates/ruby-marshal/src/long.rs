//! Variable-length signed integer ("long") codec.
//!
//! A single control byte either carries a small value inline or announces a
//! 1–4 byte little-endian payload. The same routine decodes integer values
//! and every length/count prefix in the stream.

use marshal_buffers::Reader;

use crate::error::MarshalError;

/// Reads one variable-length integer from `reader`.
///
/// | control byte | value                                  |
/// |--------------|----------------------------------------|
/// | `0x00`       | 0                                      |
/// | `0x01..=0x04`| next 1–4 bytes, unsigned little-endian |
/// | `0xfc`       | next 4 bytes, signed 32-bit            |
/// | `0xfd`       | next 3 bytes minus `0x1000000`         |
/// | `0xfe`       | next 2 bytes minus `0x10000`           |
/// | `0xff`       | next byte minus `0x100`                |
/// | `5..=127`    | `b0 - 5`                               |
/// | `128..=251`  | `b0 - 251`                             |
pub fn read_long(reader: &mut Reader<'_>) -> Result<i64, MarshalError> {
    let b0 = reader.try_u8()?;
    let value = match b0 {
        0x00 => 0,
        0x01 => reader.try_u8()? as i64,
        0x02 => reader.try_u16()? as i64,
        0x03 => reader.try_u24()? as i64,
        0x04 => reader.try_u32()? as i64,
        0xfc => reader.try_i32()? as i64,
        0xfd => reader.try_u24()? as i64 - 0x100_0000,
        0xfe => reader.try_u16()? as i64 - 0x1_0000,
        0xff => reader.try_u8()? as i64 - 0x100,
        5..=127 => b0 as i64 - 5,
        128..=251 => b0 as i64 - 251,
    };
    Ok(value)
}

/// Reads a long that is used as a length or count and must not be negative.
pub fn read_len(reader: &mut Reader<'_>) -> Result<usize, MarshalError> {
    let offset = reader.x;
    let length = read_long(reader)?;
    usize::try_from(length).map_err(|_| MarshalError::InvalidLength { length, offset })
}
