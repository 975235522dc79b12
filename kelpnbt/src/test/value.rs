use crate::error::ErrorKind;
use crate::{Compound, List, Tag, Value};

#[test]
fn list_infers_its_kind_from_the_first_push() {
    let mut list = List::default();
    assert_eq!(list.element_kind(), Tag::End);

    list.push(Value::Int(1)).unwrap();
    assert_eq!(list.element_kind(), Tag::Int);

    let err = list.push(Value::from("nope")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MismatchedTag);
    assert_eq!(list.len(), 1);
}

#[test]
fn list_with_declared_kind_rejects_strangers() {
    let mut list = List::new(Tag::Byte);
    let err = list.push(Value::Int(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MismatchedTag);

    let err = List::of(Tag::Int, vec![Value::Int(1), Value::Byte(2)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MismatchedTag);
}

#[test]
fn list_from_values_infers_the_kind() {
    let list = List::from_values(vec![Value::Byte(1), Value::Byte(2)]).unwrap();
    assert_eq!(list.element_kind(), Tag::Byte);
    assert_eq!(list.len(), 2);

    let empty = List::from_values(Vec::new()).unwrap();
    assert_eq!(empty.element_kind(), Tag::End);
    assert!(empty.is_empty());
}

#[test]
fn empty_lists_of_different_kinds_are_not_equal() {
    assert_ne!(
        Value::List(List::new(Tag::Int)),
        Value::List(List::new(Tag::Byte))
    );
    assert_eq!(Value::List(List::default()), Value::List(List::new(Tag::End)));
}

#[test]
fn list_equality_respects_order() {
    let a = List::of(Tag::Int, vec![Value::Int(1), Value::Int(2)]).unwrap();
    let b = List::of(Tag::Int, vec![Value::Int(2), Value::Int(1)]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn compound_replaces_in_place() {
    let mut map = Compound::default();
    map.insert("a".into(), Value::Int(1));
    map.insert("b".into(), Value::Int(2));
    map.insert("c".into(), Value::Int(3));
    map.insert("b".into(), Value::Int(9));

    assert_eq!(map.len(), 3);
    assert_eq!(map["b"], Value::Int(9));
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b", "c"]);
}

#[test]
fn compound_equality_ignores_order() {
    let mut forwards = Compound::default();
    forwards.insert("a".into(), Value::Int(1));
    forwards.insert("b".into(), Value::Int(2));

    let mut backwards = Compound::default();
    backwards.insert("b".into(), Value::Int(2));
    backwards.insert("a".into(), Value::Int(1));

    assert_eq!(forwards, backwards);
}

#[test]
fn scalar_equality_is_by_kind_and_value() {
    assert_eq!(Value::Int(1), Value::Int(1));
    assert_ne!(Value::Int(1), Value::Long(1));
    assert_ne!(Value::Byte(0), Value::Short(0));
}

#[test]
fn from_conversions_pick_the_matching_kind() {
    assert_eq!(Value::from(-3i8).tag(), Tag::Byte);
    assert_eq!(Value::from(16i16).tag(), Tag::Short);
    assert_eq!(Value::from(7i32).tag(), Tag::Int);
    assert_eq!(Value::from(7i64).tag(), Tag::Long);
    assert_eq!(Value::from(0.5f32).tag(), Tag::Float);
    assert_eq!(Value::from(0.5f64).tag(), Tag::Double);
    assert_eq!(Value::from("hi").tag(), Tag::String);
    assert_eq!(Value::from(vec![1i32]).tag(), Tag::IntArray);
    assert_eq!(Value::from(vec![1i64]).tag(), Tag::LongArray);
    assert_eq!(Value::from(vec![1i8]).tag(), Tag::ByteArray);
    assert_eq!(Value::from(true), Value::Byte(1));
    assert_eq!(Value::from(false), Value::Byte(0));
}

#[test]
fn lists_convert_from_vecs_of_one_kind() {
    let shorts = List::from(vec![1i16, 2, 3]);
    assert_eq!(shorts.element_kind(), Tag::Short);
    assert_eq!(shorts.len(), 3);
    assert_eq!(shorts.get(2), Some(&Value::Short(3)));

    let names = List::from(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(names.element_kind(), Tag::String);

    // empty vecs keep the target kind rather than decaying to End
    assert_eq!(List::from(Vec::<f64>::new()).element_kind(), Tag::Double);
}

#[test]
fn tag_round_trips_through_its_discriminant() {
    for byte in 0u8..=12 {
        let tag = Tag::try_from(byte).unwrap();
        assert_eq!(u8::from(tag), byte);
    }
    assert!(Tag::try_from(13).is_err());
    assert!(Tag::try_from(255).is_err());
}
