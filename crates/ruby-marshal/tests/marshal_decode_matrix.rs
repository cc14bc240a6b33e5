use ruby_marshal::{
    decode, decode_to_json, decode_with_consumed, DecoderOptions, MarshalDecoder, MarshalError,
    RefKind, TextEncoding, Value,
};
use serde_json::json;
use std::sync::Arc;

fn sym(s: &str) -> Value {
    Value::Symbol(s.to_owned())
}

fn text(s: &str) -> Value {
    Value::Str(s.to_owned())
}

fn utf8(bytes: &[u8]) -> Result<Option<Value>, MarshalError> {
    decode(bytes, TextEncoding::Utf8)
}

fn must(bytes: &[u8]) -> Value {
    utf8(bytes).expect("decode").expect("value")
}

/// Three-byte long form (control byte 3), valid for `0..2^24`.
fn long24(n: u32) -> [u8; 4] {
    let [b0, b1, b2, _] = n.to_le_bytes();
    [0x03, b0, b1, b2]
}

#[test]
fn short_input_has_no_value() {
    assert_eq!(utf8(b""), Ok(None));
    assert_eq!(utf8(b"\x04"), Ok(None));
    assert_eq!(utf8(b"\xff"), Ok(None));
}

#[test]
fn header_only_is_truncated() {
    assert_eq!(utf8(b"\x04\x08"), Err(MarshalError::UnexpectedEndOfInput));
}

#[test]
fn version_bytes_are_not_validated() {
    assert_eq!(must(b"\x00\x00T"), Value::Bool(true));
    assert_eq!(must(b"\xff\xff0"), Value::Nil);
}

#[test]
fn scalar_matrix() {
    assert_eq!(must(b"\x04\x080"), Value::Nil);
    assert_eq!(must(b"\x04\x08T"), Value::Bool(true));
    assert_eq!(must(b"\x04\x08F"), Value::Bool(false));
    assert_eq!(must(b"\x04\x08i\x00"), Value::Integer(0));
    assert_eq!(must(b"\x04\x08i\x7f"), Value::Integer(122));
    assert_eq!(must(b"\x04\x08i\x01\x7b"), Value::Integer(123));
    assert_eq!(must(b"\x04\x08i\x80"), Value::Integer(-123));
    assert_eq!(must(b"\x04\x08i\xff\x84"), Value::Integer(-124));
    assert_eq!(
        must(b"\x04\x08i\x04\xff\xff\xff\xff"),
        Value::Integer(4_294_967_295)
    );
}

#[test]
fn string_with_encoding_annotation() {
    // "hello" with its `E: true` instance variable
    let value = must(b"\x04\x08I\"\x0ahello\x06:\x06ET");
    assert_eq!(value, text("hello"));
}

#[test]
fn annotations_do_not_change_string_decoding() {
    // Bytes 0xe9 tagged `encoding: "ISO-8859-1"`, decoded as UTF-8 regardless.
    let bytes = b"\x04\x08I\"\x06\xe9\x06:\x0dencoding\"\x0fISO-8859-1";
    assert_eq!(must(bytes), text("\u{fffd}"));
    assert_eq!(
        decode(bytes, TextEncoding::Latin1).unwrap(),
        Some(text("é"))
    );
}

#[test]
fn float_matrix() {
    assert_eq!(must(b"\x04\x08f\x081.5"), Value::Float(1.5));
    assert_eq!(must(b"\x04\x08f\x07-2"), Value::Float(-2.0));
    assert_eq!(must(b"\x04\x08f\x0a1e-05"), Value::Float(1e-5));
    assert_eq!(must(b"\x04\x08f\x08inf"), Value::Float(f64::INFINITY));
    assert_eq!(must(b"\x04\x08f\x09-inf"), Value::Float(f64::NEG_INFINITY));
    let nan = must(b"\x04\x08f\x08nan");
    assert!(matches!(nan, Value::Float(f) if f.is_nan()));
}

#[test]
fn float_with_trailing_mantissa_bytes() {
    // Old producers appended raw mantissa bytes after a NUL.
    assert_eq!(
        must(b"\x04\x08f\x0c1.1\x00\x9a\x99\x99"),
        Value::Float(1.1)
    );
}

#[test]
fn malformed_float_is_an_error() {
    assert_eq!(
        utf8(b"\x04\x08f\x08abc"),
        Err(MarshalError::InvalidFloat("abc".into()))
    );
    assert_eq!(
        utf8(b"\x04\x08f\x00"),
        Err(MarshalError::InvalidFloat(String::new()))
    );
}

#[test]
fn array_preserves_order() {
    assert_eq!(
        must(b"\x04\x08[\x08i\x06\"\x06a0"),
        Value::Array(vec![Value::Integer(1), text("a"), Value::Nil])
    );
    assert_eq!(must(b"\x04\x08[\x00"), Value::Array(vec![]));
}

#[test]
fn symbol_links_resolve_in_first_occurrence_order() {
    // [:a, :b, :a, :b]
    let value = must(b"\x04\x08[\x09:\x06a:\x06b;\x00;\x06");
    assert_eq!(value, Value::Array(vec![sym("a"), sym("b"), sym("a"), sym("b")]));
}

#[test]
fn bad_symbol_link() {
    assert_eq!(
        utf8(b"\x04\x08[\x07:\x06a;\x06"),
        Err(MarshalError::BadReference {
            kind: RefKind::Symbol,
            index: 1
        })
    );
    assert_eq!(
        utf8(b"\x04\x08;\x00"),
        Err(MarshalError::BadReference {
            kind: RefKind::Symbol,
            index: 0
        })
    );
}

#[test]
fn hash_with_symbol_keys() {
    // {a: 1, b: 2}
    let value = must(b"\x04\x08{\x07:\x06ai\x06:\x06bi\x07");
    assert_eq!(
        value,
        Value::Map(vec![(sym("a"), Value::Integer(1)), (sym("b"), Value::Integer(2))])
    );
    assert_eq!(value.get(&sym("b")), Some(&Value::Integer(2)));
}

#[test]
fn hash_duplicate_key_last_write_wins() {
    let value = must(b"\x04\x08{\x07:\x06ai\x06;\x00i\x07");
    assert_eq!(value, Value::Map(vec![(sym("a"), Value::Integer(2))]));
}

#[test]
fn tagged_object() {
    // Point with @x = 1, @y = 2
    let value = must(b"\x04\x08o:\x0aPoint\x07:\x07@xi\x06:\x07@yi\x07");
    let Value::Object(obj) = &value else {
        panic!("expected object, got {value:?}");
    };
    assert_eq!(obj.classname, sym("Point"));
    let props: Vec<_> = obj.properties.iter().collect();
    assert_eq!(
        props,
        vec![
            (&"x".to_string(), &Value::Integer(1)),
            (&"y".to_string(), &Value::Integer(2)),
        ]
    );
    assert_eq!(value.property("y"), Some(&Value::Integer(2)));
}

#[test]
fn object_link_resolves_completed_object() {
    // [p, p] where the second element links back to the first object.
    let value = must(b"\x04\x08[\x07o:\x0aPoint\x06:\x07@xi\x06@\x00");
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], items[1]);
    assert_eq!(items[1].property("x"), Some(&Value::Integer(1)));
}

#[test]
fn object_link_to_itself_is_a_bad_reference() {
    // Node with @next pointing at itself: not registered until complete.
    assert_eq!(
        utf8(b"\x04\x08o:\x09Node\x06:\x0a@next@\x00"),
        Err(MarshalError::BadReference {
            kind: RefKind::Object,
            index: 0
        })
    );
}

#[test]
fn nested_objects_register_in_completion_order() {
    // Outer { @inner = Inner { @v = 1 } }, then [outer, @0, @1]
    let bytes = b"\x04\x08[\x08o:\x0aOuter\x06:\x0b@innero:\x0aInner\x06:\x07@vi\x06@\x00@\x06";
    let value = must(bytes);
    let items = value.as_array().expect("array");
    assert_eq!(items[1].property("v"), Some(&Value::Integer(1)));
    assert_eq!(items[2], items[0]);
}

#[test]
fn repeated_object_links_share_one_allocation() {
    // Object k has @a and @b both linking to object k-1. Copying on each link
    // would double the tree at every level.
    const LEVELS: usize = 48;
    let mut bytes = b"\x04\x08[".to_vec();
    bytes.push(LEVELS as u8 + 5);
    bytes.extend_from_slice(b"o:\x06N\x00");
    bytes.extend_from_slice(b"o;\x00\x07:\x07@a@\x00:\x07@b@\x00");
    for k in 2..LEVELS {
        let prev = (k - 1) as u8 + 5;
        bytes.extend_from_slice(b"o;\x00\x07;\x06@");
        bytes.push(prev);
        bytes.extend_from_slice(b";\x07@");
        bytes.push(prev);
    }

    let value = must(&bytes);
    let items = value.as_array().expect("array");
    assert_eq!(items.len(), LEVELS);
    for k in 1..LEVELS {
        let Value::Object(prev) = &items[k - 1] else {
            panic!("item {} is not an object", k - 1);
        };
        for name in ["a", "b"] {
            match items[k].property(name) {
                Some(Value::Object(link)) => assert!(Arc::ptr_eq(link, prev)),
                other => panic!("item {k} @{name}: {other:?}"),
            }
        }
    }
}

#[test]
fn large_hash_decodes_with_unique_keys() {
    const COUNT: u32 = 100_000;
    let mut bytes = b"\x04\x08{".to_vec();
    bytes.extend_from_slice(&long24(COUNT));
    for k in 0..COUNT {
        bytes.push(b'i');
        bytes.extend_from_slice(&long24(k));
        bytes.push(b'T');
    }

    let value = must(&bytes);
    let Value::Map(pairs) = &value else {
        panic!("expected map, got {value:?}");
    };
    assert_eq!(pairs.len(), COUNT as usize);
    assert_eq!(pairs[0].0, Value::Integer(0));
    assert_eq!(
        value.get(&Value::Integer(i64::from(COUNT - 1))),
        Some(&Value::Bool(true))
    );
}

#[test]
fn large_hash_with_repeats_keeps_first_positions() {
    const COUNT: u32 = 100_000;
    const DISTINCT: u32 = 50_000;
    let mut bytes = b"\x04\x08{".to_vec();
    bytes.extend_from_slice(&long24(COUNT));
    for k in 0..COUNT {
        bytes.push(b'i');
        bytes.extend_from_slice(&long24(k % DISTINCT));
        bytes.push(b'i');
        bytes.extend_from_slice(&long24(k));
    }

    let value = must(&bytes);
    let Value::Map(pairs) = &value else {
        panic!("expected map, got {value:?}");
    };
    assert_eq!(pairs.len(), DISTINCT as usize);
    assert_eq!(
        pairs[0],
        (Value::Integer(0), Value::Integer(i64::from(DISTINCT)))
    );
    assert_eq!(
        pairs[DISTINCT as usize - 1],
        (
            Value::Integer(i64::from(DISTINCT - 1)),
            Value::Integer(i64::from(COUNT - 1))
        )
    );
}

#[test]
fn user_defined_blob_is_opaque() {
    let value = must(b"\x04\x08u:\x09Blob\x08\x01\x02\x03");
    let Value::UserDefined(ud) = value else {
        panic!("expected user-defined value");
    };
    assert_eq!(ud.classname, sym("Blob"));
    assert_eq!(ud.data, vec![1, 2, 3]);
}

#[test]
fn unsupported_tag() {
    // Bignum is outside the supported set.
    assert_eq!(
        utf8(b"\x04\x08[\x06l+\x07\x00\x00\x00\x00\x00\x40"),
        Err(MarshalError::UnsupportedTag {
            tag: b'l',
            offset: 4
        })
    );
    assert_eq!(
        utf8(b"\x04\x08\x00"),
        Err(MarshalError::UnsupportedTag { tag: 0, offset: 2 })
    );
}

#[test]
fn negative_length_is_rejected() {
    assert_eq!(
        utf8(b"\x04\x08\"\xfa"),
        Err(MarshalError::InvalidLength {
            length: -1,
            offset: 3
        })
    );
}

#[test]
fn every_truncation_fails_cleanly() {
    let streams: &[&[u8]] = &[
        b"\x04\x08I\"\x0ahello\x06:\x06ET",
        b"\x04\x08o:\x0aPoint\x07:\x07@xi\x06:\x07@yi\x07",
        b"\x04\x08u:\x09Blob\x08\x01\x02\x03",
        b"\x04\x08{\x07:\x06ai\x06;\x00i\x02\x00\x01",
        b"\x04\x08f\x081.5",
    ];
    for stream in streams {
        assert!(utf8(stream).is_ok());
        for end in 2..stream.len() {
            assert_eq!(
                utf8(&stream[..end]),
                Err(MarshalError::UnexpectedEndOfInput),
                "prefix of length {end} of {stream:?}"
            );
        }
    }
}

#[test]
fn consumed_excludes_trailing_bytes() {
    let (value, consumed) = decode_with_consumed(b"\x04\x08i\x06junk", TextEncoding::Utf8)
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::Integer(1));
    assert_eq!(consumed, 4);
}

#[test]
fn decoder_is_reusable_across_streams() {
    let mut decoder = MarshalDecoder::with_options(DecoderOptions::default());
    assert_eq!(decoder.decode(b"\x04\x08:\x06a").unwrap(), Some(sym("a")));
    // Symbol table does not leak from the previous stream.
    assert_eq!(
        decoder.decode(b"\x04\x08;\x00"),
        Err(MarshalError::BadReference {
            kind: RefKind::Symbol,
            index: 0
        })
    );
}

#[test]
fn text_encoding_matrix() {
    let bytes = b"\x04\x08\"\x09\xc3\xa9t\xc3";
    assert_eq!(decode(bytes, TextEncoding::Utf8).unwrap(), Some(text("ét\u{fffd}")));
    assert_eq!(
        decode(bytes, TextEncoding::Latin1).unwrap(),
        Some(text("Ã©tÃ"))
    );
    assert_eq!(decode(bytes, TextEncoding::Hex).unwrap(), Some(text("c3a974c3")));
    // Symbols use the same encoding.
    assert_eq!(
        decode(b"\x04\x08:\x06\xe9", TextEncoding::Latin1).unwrap(),
        Some(sym("é"))
    );
}

#[test]
fn json_projection() {
    let json = decode_to_json(
        b"\x04\x08[\x09o:\x0aPoint\x07:\x07@xi\x06:\x07@yf\x08inf{\x06:\x06ki\x00u:\x09Blob\x07hi0",
        TextEncoding::Utf8,
    )
    .unwrap();
    assert_eq!(
        json,
        json!([
            {"classname": "Point", "x": 1, "y": null},
            {"k": 0},
            {"classname": "Blob", "data": "aGk="},
            null
        ])
    );
    assert_eq!(decode_to_json(b"", TextEncoding::Utf8).unwrap(), json!(null));
}
