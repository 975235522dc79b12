use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::Tag;

/// The payload of `TAG_Compound`: an owned map of names to values.
///
/// Iteration yields entries in insertion order, matching their order on the
/// wire. Re-inserting an existing name replaces the value but keeps the
/// name's original position. Equality ignores order, so two compounds
/// holding the same entries compare equal however they were built.
pub type Compound = IndexMap<String, Value>;

/// An owned NBT value of any kind except `End`, which never carries data.
///
/// Integer kinds are signed on the wire, so byte arrays are `Vec<i8>` rather
/// than `Vec<u8>`. Equality is structural: kind plus payload, recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    /// The kind of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::String(_) => Tag::String,
            Value::List(_) => Tag::List,
            Value::Compound(_) => Tag::Compound,
            Value::IntArray(_) => Tag::IntArray,
            Value::LongArray(_) => Tag::LongArray,
        }
    }
}

/// The payload of `TAG_List`: a declared element kind and elements that are
/// all of that kind.
///
/// The wire format keeps the element kind even for an empty list, and
/// Minecraft writes empty lists with kind `End`, so the kind is part of the
/// list rather than derived from its contents. Mismatched pushes are
/// refused, never coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    elem: Tag,
    values: Vec<Value>,
}

impl Default for List {
    /// An empty list with element kind `End`.
    fn default() -> Self {
        List {
            elem: Tag::End,
            values: Vec::new(),
        }
    }
}

impl List {
    /// An empty list that will only accept values of the given kind.
    pub fn new(elem: Tag) -> List {
        List {
            elem,
            values: Vec::new(),
        }
    }

    /// Builds a list with an explicit element kind, failing with a
    /// [`MismatchedTag`] error if any value is of a different kind.
    ///
    /// [`MismatchedTag`]: crate::error::ErrorKind::MismatchedTag
    pub fn of(elem: Tag, values: Vec<Value>) -> Result<List> {
        for value in &values {
            if value.tag() != elem {
                return Err(Error::mismatched_tag(elem, value.tag()));
            }
        }
        Ok(List { elem, values })
    }

    /// Builds a list inferring the element kind from the first value. An
    /// empty vec produces the default `End` kind empty list.
    pub fn from_values(values: Vec<Value>) -> Result<List> {
        let elem = values.first().map_or(Tag::End, Value::tag);
        List::of(elem, values)
    }

    /// The declared element kind. `End` for a list that has never held an
    /// element.
    pub fn element_kind(&self) -> Tag {
        self.elem
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Appends a value of the declared kind. The first value pushed onto a
    /// default `End` kind list fixes the kind instead.
    pub fn push(&mut self, value: Value) -> Result<()> {
        if self.elem == Tag::End && self.values.is_empty() {
            self.elem = value.tag();
        }
        if value.tag() != self.elem {
            return Err(Error::mismatched_tag(self.elem, value.tag()));
        }
        self.values.push(value);
        Ok(())
    }

    // The decoder reads elements as the declared kind, so they cannot
    // mismatch.
    pub(crate) fn push_unchecked(&mut self, value: Value) {
        self.values.push(value);
    }

    pub(crate) fn with_capacity(elem: Tag, cap: usize) -> List {
        List {
            elem,
            values: Vec::with_capacity(cap),
        }
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

macro_rules! value_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::$variant(v)
            }
        }
    };
}

// A vec of one concrete kind can never be heterogeneous, so these are the
// infallible cousins of `List::from_values`.
macro_rules! list_from {
    ($t:ty, $tag:ident, $variant:ident) => {
        impl From<Vec<$t>> for List {
            fn from(values: Vec<$t>) -> List {
                List {
                    elem: Tag::$tag,
                    values: values.into_iter().map(Value::$variant).collect(),
                }
            }
        }
    };
}

list_from!(i8, Byte, Byte);
list_from!(i16, Short, Short);
list_from!(i32, Int, Int);
list_from!(i64, Long, Long);
list_from!(f32, Float, Float);
list_from!(f64, Double, Double);
list_from!(String, String, String);
list_from!(List, List, List);
list_from!(Compound, Compound, Compound);

value_from!(i8, Byte);
value_from!(i16, Short);
value_from!(i32, Int);
value_from!(i64, Long);
value_from!(f32, Float);
value_from!(f64, Double);
value_from!(Vec<i8>, ByteArray);
value_from!(String, String);
value_from!(List, List);
value_from!(Compound, Compound);
value_from!(Vec<i32>, IntArray);
value_from!(Vec<i64>, LongArray);

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_owned())
    }
}

impl From<bool> for Value {
    /// Booleans have no kind of their own and travel as `TAG_Byte` 0 or 1.
    fn from(v: bool) -> Value {
        Value::Byte(v as i8)
    }
}
