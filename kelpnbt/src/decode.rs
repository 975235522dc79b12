//! Binary decoding into owned documents.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::cursor::Reader;
use crate::error::{Error, Result};
use crate::format::{self, Compression, Format, Variant};
use crate::value::{Compound, List, Value};
use crate::{Document, Tag};

/// Decodes a document, working out compression and variant from the bytes.
///
/// Anything after the root tag's payload is ignored.
pub fn from_bytes(data: &[u8]) -> Result<Document> {
    let (format, body) = format::detect_and_unwrap(data)?;
    decode_document(&body, format)
}

/// Decodes a document in the given format, skipping detection.
///
/// Useful when the caller knows the format and the bytes are ambiguous, or
/// to reject input that is not in the expected format.
pub fn from_bytes_with(data: &[u8], format: Format) -> Result<Document> {
    let body = match format.compression {
        Compression::None => Cow::Borrowed(data),
        scheme => Cow::Owned(format::decompress(data, scheme)?),
    };
    decode_document(&body, format)
}

/// Decodes a document from a non-seekable source.
///
/// A source that cannot rewind cannot be probed, so the format must be given
/// up front. The source is read to its end.
pub fn from_reader(mut reader: impl Read, format: Format) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    from_bytes_with(&data, format)
}

/// Reads a document from a file, with full format detection.
pub fn from_path(path: impl AsRef<Path>) -> Result<Document> {
    let data = fs::read(path)?;
    from_bytes(&data)
}

fn decode_document(body: &[u8], format: Format) -> Result<Document> {
    let body = match format.variant {
        // the header is optional on decode, some pocket files are bare
        Variant::Pocket => match format::pocket_header(body) {
            Some(skip) => &body[skip..],
            None => body,
        },
        _ => body,
    };

    let mut reader = Reader::new(body, format.variant);
    let tag = reader.read_tag()?;
    if tag == Tag::End {
        return Err(Error::root_end(0));
    }
    let name = reader.read_string("root name")?;
    let root = read_value(&mut reader, tag)?;
    Ok(Document::with_format(name, root, format))
}

/// A container being filled.
enum Frame {
    Compound {
        map: Compound,
        /// Holds a member's name from its header until its payload is done.
        pending: Option<String>,
    },
    List {
        list: List,
        remaining: i32,
    },
}

enum Step {
    /// Read one payload of this kind next.
    Read(Tag),
    /// A payload finished with this value.
    Done(Value),
    /// Ask the innermost container what it wants next.
    Next,
}

/// Reads one payload of kind `tag`. Containers are driven through an
/// explicit frame stack, so nesting depth is bounded by the input rather
/// than the call stack.
fn read_value(r: &mut Reader, tag: Tag) -> Result<Value> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut step = Step::Read(tag);

    loop {
        step = match step {
            Step::Read(tag) => match tag {
                Tag::End => panic!("end tag has no payload"),
                Tag::Byte => Step::Done(Value::Byte(r.read_i8("TAG_Byte payload")?)),
                Tag::Short => Step::Done(Value::Short(r.read_i16("TAG_Short payload")?)),
                Tag::Int => Step::Done(Value::Int(r.read_i32("TAG_Int payload")?)),
                Tag::Long => Step::Done(Value::Long(r.read_i64("TAG_Long payload")?)),
                Tag::Float => Step::Done(Value::Float(r.read_f32("TAG_Float payload")?)),
                Tag::Double => Step::Done(Value::Double(r.read_f64("TAG_Double payload")?)),
                Tag::String => Step::Done(Value::String(r.read_string("TAG_String payload")?)),
                Tag::ByteArray => {
                    let count = read_count(r, "TAG_Byte_Array")?;
                    Step::Done(Value::ByteArray(
                        r.read_i8_array(count, "TAG_Byte_Array payload")?,
                    ))
                }
                Tag::IntArray => {
                    let count = read_count(r, "TAG_Int_Array")?;
                    Step::Done(Value::IntArray(
                        r.read_i32_array(count, "TAG_Int_Array payload")?,
                    ))
                }
                Tag::LongArray => {
                    let count = read_count(r, "TAG_Long_Array")?;
                    Step::Done(Value::LongArray(
                        r.read_i64_array(count, "TAG_Long_Array payload")?,
                    ))
                }
                Tag::List => {
                    let pos = r.pos();
                    let elem = r.read_tag()?;
                    let len = r.read_i32("list length")?;
                    if len < 0 {
                        return Err(Error::malformed_length(pos, "TAG_List", len as i64));
                    }
                    if elem == Tag::End && len > 0 {
                        return Err(Error::end_list(pos, len));
                    }
                    // every element costs at least one byte, so a count
                    // larger than the remaining input cannot be honest
                    if len as usize > r.remaining() {
                        return Err(Error::truncated(
                            r.pos(),
                            "TAG_List payload",
                            len as usize,
                            r.remaining(),
                        ));
                    }
                    stack.push(Frame::List {
                        list: List::with_capacity(elem, len as usize),
                        remaining: len,
                    });
                    Step::Next
                }
                Tag::Compound => {
                    stack.push(Frame::Compound {
                        map: Compound::default(),
                        pending: None,
                    });
                    Step::Next
                }
            },

            Step::Done(value) => match stack.last_mut() {
                None => return Ok(value),
                Some(Frame::List { list, .. }) => {
                    list.push_unchecked(value);
                    Step::Next
                }
                Some(Frame::Compound { map, pending }) => match pending.take() {
                    // a later duplicate of a name replaces the earlier value
                    // but keeps its position
                    Some(name) => {
                        map.insert(name, value);
                        Step::Next
                    }
                    None => panic!("compound member finished without a name"),
                },
            },

            Step::Next => {
                let want = match stack.last_mut() {
                    None => panic!("scheduler ran outside any container"),
                    Some(Frame::List { list, remaining }) => {
                        if *remaining > 0 {
                            *remaining -= 1;
                            Some(list.element_kind())
                        } else {
                            None
                        }
                    }
                    Some(Frame::Compound { pending, .. }) => {
                        let tag = r.read_tag()?;
                        if tag == Tag::End {
                            None
                        } else {
                            *pending = Some(r.read_string("member name")?);
                            Some(tag)
                        }
                    }
                };
                match want {
                    Some(tag) => Step::Read(tag),
                    None => {
                        let value = match stack.pop() {
                            Some(Frame::List { list, .. }) => Value::List(list),
                            Some(Frame::Compound { map, .. }) => Value::Compound(map),
                            None => unreachable!(),
                        };
                        Step::Done(value)
                    }
                }
            }
        };
    }
}

fn read_count(r: &mut Reader, what: &str) -> Result<usize> {
    let pos = r.pos();
    let len = r.read_i32(what)?;
    if len < 0 {
        return Err(Error::malformed_length(pos, what, len as i64));
    }
    Ok(len as usize)
}
