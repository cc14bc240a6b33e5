//! Text encodings applied to string and symbol payloads.

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::MarshalError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// How raw string/symbol bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8; invalid sequences become U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1: each byte is one code point.
    Latin1,
    /// 7-bit ASCII: the high bit of each byte is dropped.
    Ascii,
    /// UTF-16 little-endian; a trailing odd byte is ignored.
    Utf16Le,
    /// Lowercase hexadecimal digits of the raw bytes.
    Hex,
    /// Standard padded base64 of the raw bytes.
    Base64,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Ascii => bytes.iter().map(|&b| (b & 0x7f) as char).collect(),
            TextEncoding::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            TextEncoding::Hex => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for &b in bytes {
                    out.push(HEX_DIGITS[(b >> 4) as usize] as char);
                    out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
                }
                out
            }
            TextEncoding::Base64 => STANDARD.encode(bytes),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Utf16Le => "utf16le",
            TextEncoding::Hex => "hex",
            TextEncoding::Base64 => "base64",
        }
    }
}

impl FromStr for TextEncoding {
    type Err = MarshalError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "binary" => Ok(TextEncoding::Latin1),
            "ascii" => Ok(TextEncoding::Ascii),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(TextEncoding::Utf16Le),
            "hex" => Ok(TextEncoding::Hex),
            "base64" => Ok(TextEncoding::Base64),
            _ => Err(MarshalError::UnknownEncoding(name.to_string())),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
