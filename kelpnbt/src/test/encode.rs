use super::builder::Builder;
use crate::error::ErrorKind;
use crate::{from_bytes, Compound, Compression, Document, Format, List, Tag, Value, Variant};

#[test]
fn modified_utf8_golden_bytes() {
    let mut map = Compound::default();
    map.insert("mutf_8".into(), Value::from("\u{2764}"));
    let doc = Document::new("", map);

    let bytes = doc.to_bytes().unwrap();
    let expected = [
        0x0a, 0x00, 0x00, // compound with an empty name
        0x08, 0x00, 0x06, b'm', b'u', b't', b'f', b'_', b'8', // string member
        0x00, 0x03, 0xe2, 0x9d, 0xa4, // three utf-8 bytes of U+2764
        0x00, // end
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn layout_matches_the_builder() {
    let expected = Builder::new()
        .start_compound("root")
        .byte("a_byte", -5)
        .short("a_short", 1024)
        .int("an_int", -420)
        .long("a_long", i64::MAX)
        .float("a_float", 0.125)
        .double("a_double", -0.25)
        .string("a_string", "kelp")
        .byte_array("bytes", &[1, -2, 3])
        .int_array("ints", &[7, -8])
        .long_array("longs", &[9])
        .start_list("strings", Tag::String, 2)
        .string_payload("one")
        .string_payload("two")
        .end_compound()
        .build();

    let mut map = Compound::default();
    map.insert("a_byte".into(), Value::Byte(-5));
    map.insert("a_short".into(), Value::Short(1024));
    map.insert("an_int".into(), Value::Int(-420));
    map.insert("a_long".into(), Value::Long(i64::MAX));
    map.insert("a_float".into(), Value::Float(0.125));
    map.insert("a_double".into(), Value::Double(-0.25));
    map.insert("a_string".into(), Value::from("kelp"));
    map.insert("bytes".into(), Value::ByteArray(vec![1, -2, 3]));
    map.insert("ints".into(), Value::IntArray(vec![7, -8]));
    map.insert("longs".into(), Value::LongArray(vec![9]));
    map.insert(
        "strings".into(),
        Value::List(List::of(Tag::String, vec![Value::from("one"), Value::from("two")]).unwrap()),
    );

    let doc = Document::new("root", map);
    assert_eq!(doc.to_bytes().unwrap(), expected);
}

#[test]
fn little_endian_layout_matches_the_builder() {
    let expected = Builder::with_variant(Variant::LittleEndian)
        .start_compound("lvl")
        .short("s", 0x1234)
        .string("n", "ok")
        .end_compound()
        .build();

    let mut map = Compound::default();
    map.insert("s".into(), Value::Short(0x1234));
    map.insert("n".into(), Value::from("ok"));
    let doc = Document::new("lvl", map);

    let format = Format::new(Variant::LittleEndian, Compression::None);
    assert_eq!(doc.to_bytes_with(format).unwrap(), expected);
}

#[test]
fn pocket_encoding_writes_the_header() {
    let mut map = Compound::default();
    map.insert("GameType".into(), Value::Int(1));
    let format = Format::new(Variant::Pocket, Compression::None);
    let doc = Document::with_format("level", map, format);

    let bytes = doc.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], &3i32.to_le_bytes());
    assert_eq!(&bytes[4..8], &((bytes.len() - 8) as i32).to_le_bytes());

    let expected = Builder::with_variant(Variant::Pocket)
        .start_compound("level")
        .int("GameType", 1)
        .end_compound()
        .pocket_header()
        .build();
    assert_eq!(bytes, expected);
}

#[test]
fn empty_list_encodes_its_declared_kind() {
    let mut map = Compound::default();
    map.insert("e".into(), Value::List(List::new(Tag::Short)));
    let doc = Document::new("", map);

    let expected = Builder::new()
        .start_compound("")
        .start_list("e", Tag::Short, 0)
        .end_compound()
        .build();
    assert_eq!(doc.to_bytes().unwrap(), expected);
}

#[test]
fn oversized_string_fails_to_encode() {
    let doc = Document::new("", Value::from("x".repeat(u16::MAX as usize + 1)));
    let err = doc.to_bytes().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EncodingOverflow);
}

#[test]
fn round_trips_through_every_variant_and_wrapper() {
    let mut inner = Compound::default();
    inner.insert("name".into(), Value::from("kelp \u{1d53c}\u{1d569}"));
    inner.insert("xs".into(), Value::IntArray(vec![1, -2, 3]));

    let mut map = Compound::default();
    map.insert("nested".into(), Value::Compound(inner));
    map.insert(
        "counts".into(),
        Value::List(List::of(Tag::Long, vec![Value::Long(1), Value::Long(-1)]).unwrap()),
    );
    let doc = Document::new("data", map);

    let formats = [
        Format::new(Variant::BigEndian, Compression::None),
        Format::new(Variant::BigEndian, Compression::Gzip),
        Format::new(Variant::LittleEndian, Compression::None),
        Format::new(Variant::LittleEndian, Compression::Zlib),
        Format::new(Variant::Pocket, Compression::None),
        Format::new(Variant::Pocket, Compression::Gzip),
    ];
    for format in formats {
        let bytes = doc.to_bytes_with(format).unwrap();
        let back = from_bytes(&bytes).unwrap();
        assert_eq!(back, doc, "tree changed through {format:?}");
        assert_eq!(back.format(), format, "detection missed {format:?}");
    }
}

#[test]
fn deep_trees_encode_without_recursion() {
    let mut v = Value::Compound(Compound::default());
    for _ in 0..4096 {
        let mut outer = Compound::default();
        outer.insert("inner".into(), v);
        v = Value::Compound(outer);
    }
    let doc = Document::new("deep", v);

    let bytes = doc.to_bytes().unwrap();
    let back = from_bytes(&bytes).unwrap();
    assert_eq!(back, doc);
}
