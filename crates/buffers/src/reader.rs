//! Little-endian binary reader with cursor tracking.

use crate::BufferError;

/// A binary reader over a borrowed byte slice.
///
/// The reader maintains a cursor position `x` that only moves forward. Every
/// read is bounds-checked: when fewer bytes remain than the read needs, it
/// returns [`BufferError::EndOfBuffer`] and leaves the cursor where it was.
///
/// # Example
///
/// ```
/// use marshal_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.try_u8(), Ok(0x01));
/// assert_eq!(reader.try_u16(), Ok(0x0302));
/// assert!(reader.try_u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position. Reads keep `x <= uint8.len()`; code that
    /// moves it by hand must do the same.
    pub x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Creates a reader positioned at offset `x`, clamped to the slice length.
    pub fn at(uint8: &'a [u8], x: usize) -> Self {
        Self {
            uint8,
            x: x.min(uint8.len()),
        }
    }

    /// Returns the number of remaining bytes (0 if `x` was moved past the end).
    pub fn size(&self) -> usize {
        self.uint8.len().saturating_sub(self.x)
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.size() {
            Err(BufferError::EndOfBuffer)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Peeks at the current byte without advancing.
    pub fn try_peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        let [b] = self.array::<1>()?;
        Ok(b)
    }

    #[inline]
    pub fn try_i8(&mut self) -> Result<i8, BufferError> {
        Ok(i8::from_le_bytes(self.array::<1>()?))
    }

    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        Ok(u16::from_le_bytes(self.array::<2>()?))
    }

    #[inline]
    pub fn try_i16(&mut self) -> Result<i16, BufferError> {
        Ok(i16::from_le_bytes(self.array::<2>()?))
    }

    /// Reads an unsigned 24-bit little-endian integer.
    #[inline]
    pub fn try_u24(&mut self) -> Result<u32, BufferError> {
        let [b0, b1, b2] = self.array::<3>()?;
        Ok(u32::from_le_bytes([b0, b1, b2, 0]))
    }

    /// Reads a signed 24-bit little-endian integer (two's complement,
    /// sign-extended from bit 23).
    #[inline]
    pub fn try_i24(&mut self) -> Result<i32, BufferError> {
        let [b0, b1, b2] = self.array::<3>()?;
        let ext = if b2 & 0x80 != 0 { 0xff } else { 0x00 };
        Ok(i32::from_le_bytes([b0, b1, b2, ext]))
    }

    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        Ok(u32::from_le_bytes(self.array::<4>()?))
    }

    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        Ok(i32::from_le_bytes(self.array::<4>()?))
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        let end = x + size;
        let bin = &self.uint8[x..end];
        self.x = end;
        Ok(bin)
    }
}
