use std::io::Read;

use flate2::read::{GzEncoder, ZlibEncoder};

use super::builder::Builder;
use crate::error::ErrorKind;
use crate::format::detect;
use crate::{from_bytes, Compression, Format, Value, Variant};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzEncoder::new(data, flate2::Compression::fast())
        .read_to_end(&mut out)
        .unwrap();
    out
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    ZlibEncoder::new(data, flate2::Compression::fast())
        .read_to_end(&mut out)
        .unwrap();
    out
}

fn java_level() -> Vec<u8> {
    Builder::new()
        .start_compound("Data")
        .long("Time", 129_600)
        .end_compound()
        .build()
}

#[test]
fn bare_big_endian() {
    let format = detect(&java_level()).unwrap();
    assert_eq!(format, Format::new(Variant::BigEndian, Compression::None));
}

#[test]
fn bare_little_endian() {
    let payload = Builder::with_variant(Variant::LittleEndian)
        .start_compound("Data")
        .long("Time", 129_600)
        .end_compound()
        .build();

    let format = detect(&payload).unwrap();
    assert_eq!(format, Format::new(Variant::LittleEndian, Compression::None));
}

#[test]
fn gzipped_big_endian() {
    let data = gzip(&java_level());
    let format = detect(&data).unwrap();
    assert_eq!(format, Format::new(Variant::BigEndian, Compression::Gzip));
}

#[test]
fn zlibbed_big_endian() {
    let data = zlib(&java_level());
    let format = detect(&data).unwrap();
    assert_eq!(format, Format::new(Variant::BigEndian, Compression::Zlib));
}

#[test]
fn nested_wrappers_report_the_outermost() {
    let data = gzip(&zlib(&java_level()));
    let format = detect(&data).unwrap();
    assert_eq!(format, Format::new(Variant::BigEndian, Compression::Gzip));
}

#[test]
fn gzipped_little_endian_document_round_trip() {
    let payload = Builder::with_variant(Variant::LittleEndian)
        .start_compound("bedrock")
        .int("seed", 99)
        .end_compound()
        .build();

    let doc = from_bytes(&gzip(&payload)).unwrap();
    assert_eq!(
        doc.format(),
        Format::new(Variant::LittleEndian, Compression::Gzip)
    );
    let Value::Compound(map) = doc.root() else {
        panic!("expected compound root");
    };
    assert_eq!(map["seed"], Value::Int(99));
}

#[test]
fn pocket_framing_wins_over_the_byte_order_probes() {
    let payload = Builder::with_variant(Variant::Pocket)
        .start_compound("level")
        .byte("spawn_mobs", 1)
        .end_compound()
        .pocket_header()
        .build();

    let format = detect(&payload).unwrap();
    assert_eq!(format, Format::new(Variant::Pocket, Compression::None));
}

#[test]
fn an_empty_root_name_is_taken_as_big_endian() {
    // a root with an empty name is byte identical in both orders; the
    // probe documents that big endian wins
    let payload = Builder::new().start_compound("").end_compound().build();
    let format = detect(&payload).unwrap();
    assert_eq!(format, Format::new(Variant::BigEndian, Compression::None));
}

#[test]
fn pocket_length_mismatch_falls_through_to_byte_order_probes() {
    let mut payload = Builder::with_variant(Variant::Pocket)
        .start_compound("level")
        .byte("x", 0)
        .end_compound()
        .pocket_header()
        .build();
    // grow the buffer so the header's length field no longer matches
    payload.push(0);

    let format = detect(&payload).unwrap();
    // the stale header starts 03 00 00 00, which reads as a plausible big
    // endian TAG_Int root with an empty name
    assert_eq!(format.variant, Variant::BigEndian);
}

#[test]
fn unrecognizable_input_is_an_error() {
    let err = detect(&[0xff, 0xfe, 0xfd, 0xfc]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedFormat);

    let err = detect(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedFormat);
}

#[test]
fn corrupt_gzip_fails() {
    let mut data = gzip(&java_level());
    let cut = data.len() / 2;
    data.truncate(cut);
    assert!(from_bytes(&data).is_err());
}

#[test]
fn detection_does_not_validate_the_whole_document() {
    // plausible start, nonsense afterwards
    let payload = Builder::new()
        .start_compound("ok")
        .raw_bytes(&[0x04, 0x00])
        .build();

    assert!(detect(&payload).is_ok());
    assert!(from_bytes(&payload).is_err());
}
