use std::io::Cursor;

use crate::format::detect;
use crate::{
    from_bytes, from_path, from_reader, Compound, Compression, Document, Format, Value, Variant,
};

fn sample() -> Document {
    let mut map = Compound::default();
    map.insert("LevelName".into(), Value::from("kelp world"));
    map.insert("SpawnY".into(), Value::Int(64));
    Document::new("Data", map)
}

#[test]
fn saves_in_the_format_it_was_loaded_from() {
    let format = Format::new(Variant::LittleEndian, Compression::Gzip);
    let bytes = sample().to_bytes_with(format).unwrap();

    let doc = from_bytes(&bytes).unwrap();
    assert_eq!(doc.format(), format);

    let saved = doc.to_bytes().unwrap();
    assert_eq!(detect(&saved).unwrap(), format);
}

#[test]
fn set_format_changes_how_it_saves() {
    let mut doc = sample();
    doc.set_format(Format::new(Variant::BigEndian, Compression::Zlib));

    let saved = doc.to_bytes().unwrap();
    assert_eq!(
        detect(&saved).unwrap(),
        Format::new(Variant::BigEndian, Compression::Zlib)
    );
}

#[test]
fn equality_ignores_the_stored_format() {
    let be = sample();
    let mut pocket = sample();
    pocket.set_format(Format::new(Variant::Pocket, Compression::None));
    assert_eq!(be, pocket);
}

#[test]
fn reader_sources_take_an_explicit_format() {
    let format = Format::new(Variant::BigEndian, Compression::Gzip);
    let bytes = sample().to_bytes_with(format).unwrap();

    let doc = from_reader(Cursor::new(bytes), format).unwrap();
    assert_eq!(doc, sample());
}

#[test]
fn files_round_trip_through_a_path() {
    let path = std::env::temp_dir().join(format!(
        "kelpnbt-doc-{}-{:?}.dat",
        std::process::id(),
        std::thread::current().id()
    ));

    let mut doc = sample();
    doc.set_format(Format::new(Variant::Pocket, Compression::Zlib));
    doc.to_path(&path).unwrap();

    let back = from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(back, doc);
    assert_eq!(back.format(), doc.format());
}

#[test]
fn root_access_and_mutation() {
    let mut doc = sample();
    assert_eq!(doc.name(), "Data");

    if let Value::Compound(map) = doc.root_mut() {
        map.insert("SpawnY".into(), Value::Int(-60));
    }
    let Value::Compound(map) = doc.into_root() else {
        panic!("expected compound root");
    };
    assert_eq!(map["SpawnY"], Value::Int(-60));
}
