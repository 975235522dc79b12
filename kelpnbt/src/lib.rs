//! kelpnbt is a serializer and deserializer for *Minecraft's* NBT format,
//! aimed at tooling that needs to read world data from any edition of the
//! game without knowing ahead of time how it was written.
//!
//! A decoded [`Document`] owns the entire tag tree and remembers the wire
//! format it arrived in, so saving it back produces the same framing. Three
//! field variants are understood:
//!
//! * big-endian, as written by Java edition,
//! * little-endian, as written by Bedrock edition to disk,
//! * pocket, little-endian fields wrapped in the small `level.dat` style
//!   header of storage version and payload length.
//!
//! On top of any variant the document may be gzip or zlib compressed.
//! [`from_bytes`] works out the wrapping itself; [`from_reader`] takes the
//! format up front for sources that cannot be probed. See [`format`] for how
//! detection behaves on ambiguous input.
//!
//! For the region files that pack chunk documents into 4096 byte sectors,
//! see the companion `kelpanvil` crate.
//!
//! # Quick example
//!
//! ```
//! use kelpnbt::{Compound, Document, Value};
//!
//! let mut level = Compound::default();
//! level.insert("Name".to_string(), Value::from("kelp farm"));
//! level.insert("Depth".to_string(), Value::Int(-3));
//!
//! let doc = Document::new("Data", Value::Compound(level));
//! let bytes = doc.to_bytes()?;
//!
//! let back = kelpnbt::from_bytes(&bytes)?;
//! assert_eq!(back, doc);
//! # Ok::<(), kelpnbt::error::Error>(())
//! ```
//!
//! [`format`]: crate::format::detect

use crate::error::Error;

mod cursor;
mod decode;
mod document;
mod encode;
mod fmt;
mod value;

pub mod error;
pub mod format;

#[cfg(test)]
mod test;

pub use crate::decode::{from_bytes, from_bytes_with, from_path, from_reader};
pub use crate::document::Document;
pub use crate::format::{Compression, Format, Variant};
pub use crate::value::{Compound, List, Value};

/// A tag kind: the one-byte discriminant that precedes every value on the
/// wire. Payload and name live elsewhere.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Terminates a Compound's members. Carries no name and no payload.
    End = 0,
    /// An i8.
    Byte = 1,
    /// An i16.
    Short = 2,
    /// An i32.
    Int = 3,
    /// An i64.
    Long = 4,
    /// An f32.
    Float = 5,
    /// An f64.
    Double = 6,
    /// An array of i8.
    ByteArray = 7,
    /// A modified UTF-8 string.
    String = 8,
    /// A sequence of payloads sharing one declared element kind.
    List = 9,
    /// An ordered map of names to tags.
    Compound = 10,
    /// An array of i32.
    IntArray = 11,
    /// An array of i64.
    LongArray = 12,
}

impl Tag {
    /// The `TAG_Kind` wire name, as it appears in pretty-printed trees and
    /// error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::End => "TAG_End",
            Tag::Byte => "TAG_Byte",
            Tag::Short => "TAG_Short",
            Tag::Int => "TAG_Int",
            Tag::Long => "TAG_Long",
            Tag::Float => "TAG_Float",
            Tag::Double => "TAG_Double",
            Tag::ByteArray => "TAG_Byte_Array",
            Tag::String => "TAG_String",
            Tag::List => "TAG_List",
            Tag::Compound => "TAG_Compound",
            Tag::IntArray => "TAG_Int_Array",
            Tag::LongArray => "TAG_Long_Array",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(Error::invalid_tag(None, value)),
        })
    }
}
