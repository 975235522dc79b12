//! Binary encoding of documents.

use crate::cursor::Writer;
use crate::error::Result;
use crate::format::Variant;
use crate::value::Value;
use crate::Tag;

/// Encodes a named root tag with the given field variant. Compression and
/// pocket framing are applied by the caller.
pub(crate) fn document_body(name: &str, root: &Value, variant: Variant) -> Result<Vec<u8>> {
    let mut w = Writer::new(variant);
    w.write_u8(u8::from(root.tag()));
    w.write_string(name)?;
    write_value(&mut w, root)?;
    Ok(w.into_inner())
}

enum Job<'a> {
    /// A bare payload, as in list elements.
    Value(&'a Value),
    /// A compound member: kind byte, name, then the payload.
    Entry(&'a str, &'a Value),
    /// A compound terminator.
    End,
}

/// Writes one payload. Containers queue their children on an explicit job
/// stack, so nesting depth is bounded by memory rather than the call stack.
fn write_value(w: &mut Writer, root: &Value) -> Result<()> {
    let mut jobs: Vec<Job> = vec![Job::Value(root)];

    while let Some(job) = jobs.pop() {
        match job {
            Job::End => w.write_u8(u8::from(Tag::End)),
            Job::Entry(name, value) => {
                w.write_u8(u8::from(value.tag()));
                w.write_string(name)?;
                jobs.push(Job::Value(value));
            }
            Job::Value(value) => match value {
                Value::Byte(v) => w.write_i8(*v),
                Value::Short(v) => w.write_i16(*v),
                Value::Int(v) => w.write_i32(*v),
                Value::Long(v) => w.write_i64(*v),
                Value::Float(v) => w.write_f32(*v),
                Value::Double(v) => w.write_f64(*v),
                Value::String(v) => w.write_string(v)?,
                Value::ByteArray(v) => {
                    w.write_len("TAG_Byte_Array", v.len())?;
                    w.write_i8_slice(v);
                }
                Value::IntArray(v) => {
                    w.write_len("TAG_Int_Array", v.len())?;
                    for &x in v {
                        w.write_i32(x);
                    }
                }
                Value::LongArray(v) => {
                    w.write_len("TAG_Long_Array", v.len())?;
                    for &x in v {
                        w.write_i64(x);
                    }
                }
                Value::List(list) => {
                    w.write_u8(u8::from(list.element_kind()));
                    w.write_len("TAG_List", list.len())?;
                    for v in list.iter().rev() {
                        jobs.push(Job::Value(v));
                    }
                }
                Value::Compound(map) => {
                    jobs.push(Job::End);
                    for (name, v) in map.iter().rev() {
                        jobs.push(Job::Entry(name, v));
                    }
                }
            },
        }
    }
    Ok(())
}
