//! Type tags that open every encoded value.

/// Tag byte identifying the type of the value that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Str,
    Nil,
    Symbol,
    SymbolLink,
    ObjectLink,
    False,
    True,
    InstanceVars,
    Array,
    Float,
    Integer,
    Object,
    UserDefined,
    Hash,
}

impl Tag {
    /// Maps a raw byte to its tag, or `None` for bytes outside the table.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        let tag = match byte {
            b'"' => Tag::Str,
            b'0' => Tag::Nil,
            b':' => Tag::Symbol,
            b';' => Tag::SymbolLink,
            b'@' => Tag::ObjectLink,
            b'F' => Tag::False,
            b'T' => Tag::True,
            b'I' => Tag::InstanceVars,
            b'[' => Tag::Array,
            b'f' => Tag::Float,
            b'i' => Tag::Integer,
            b'o' => Tag::Object,
            b'u' => Tag::UserDefined,
            b'{' => Tag::Hash,
            _ => return None,
        };
        Some(tag)
    }

    /// The byte this tag is written as.
    pub fn byte(self) -> u8 {
        match self {
            Tag::Str => b'"',
            Tag::Nil => b'0',
            Tag::Symbol => b':',
            Tag::SymbolLink => b';',
            Tag::ObjectLink => b'@',
            Tag::False => b'F',
            Tag::True => b'T',
            Tag::InstanceVars => b'I',
            Tag::Array => b'[',
            Tag::Float => b'f',
            Tag::Integer => b'i',
            Tag::Object => b'o',
            Tag::UserDefined => b'u',
            Tag::Hash => b'{',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mapping_is_bijective() {
        let mut known = 0;
        for byte in 0..=u8::MAX {
            if let Some(tag) = Tag::from_byte(byte) {
                assert_eq!(tag.byte(), byte);
                known += 1;
            }
        }
        assert_eq!(known, 14);
    }

    #[test]
    fn unknown_bytes() {
        assert_eq!(Tag::from_byte(b'l'), None);
        assert_eq!(Tag::from_byte(b'c'), None);
        assert_eq!(Tag::from_byte(0x00), None);
    }
}
