//! Human readable rendering of tag trees.

use std::fmt::{self, Display, Formatter};

use crate::value::Value;
use crate::Document;

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_tree(f, Some(self.name()), self.root())
    }
}

impl Display for Value {
    /// Renders the value as an unnamed root, `TAG_Kind(None): ...`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_tree(f, None, self)
    }
}

enum Job<'a> {
    Node {
        name: Option<&'a str>,
        value: &'a Value,
        indent: usize,
    },
    Close {
        indent: usize,
    },
}

/// One header line per tag, `TAG_Kind('name'): summary`, with container
/// children inside a brace block indented by two spaces per level. Unnamed
/// tags, which is all list elements, render their name as `None`. Driven by
/// a job stack like the codec passes, so depth is not limited by the call
/// stack. No trailing newline.
fn fmt_tree(f: &mut Formatter<'_>, name: Option<&str>, root: &Value) -> fmt::Result {
    let mut jobs = vec![Job::Node {
        name,
        value: root,
        indent: 0,
    }];
    let mut first = true;

    while let Some(job) = jobs.pop() {
        match job {
            Job::Close { indent } => {
                line(f, &mut first, indent)?;
                f.write_str("}")?;
            }
            Job::Node {
                name,
                value,
                indent,
            } => {
                line(f, &mut first, indent)?;
                match name {
                    Some(name) => write!(f, "{}('{}'): ", value.tag(), name)?,
                    None => write!(f, "{}(None): ", value.tag())?,
                }
                match value {
                    Value::Byte(v) => write!(f, "{v}")?,
                    Value::Short(v) => write!(f, "{v}")?,
                    Value::Int(v) => write!(f, "{v}")?,
                    Value::Long(v) => write!(f, "{v}")?,
                    Value::Float(v) => write!(f, "{v:?}")?,
                    Value::Double(v) => write!(f, "{v:?}")?,
                    Value::String(v) => write!(f, "'{v}'")?,
                    Value::ByteArray(v) => write!(f, "[{} bytes]", v.len())?,
                    Value::IntArray(v) => write!(f, "[{} integers]", v.len())?,
                    Value::LongArray(v) => write!(f, "[{} longs]", v.len())?,
                    Value::List(list) => {
                        write!(f, "{} entries", list.len())?;
                        line(f, &mut first, indent)?;
                        f.write_str("{")?;
                        jobs.push(Job::Close { indent });
                        for v in list.iter().rev() {
                            jobs.push(Job::Node {
                                name: None,
                                value: v,
                                indent: indent + 1,
                            });
                        }
                    }
                    Value::Compound(map) => {
                        write!(f, "{} entries", map.len())?;
                        line(f, &mut first, indent)?;
                        f.write_str("{")?;
                        jobs.push(Job::Close { indent });
                        for (name, v) in map.iter().rev() {
                            jobs.push(Job::Node {
                                name: Some(name),
                                value: v,
                                indent: indent + 1,
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Starts a fresh output line at the given indent.
fn line(f: &mut Formatter<'_>, first: &mut bool, indent: usize) -> fmt::Result {
    if *first {
        *first = false;
    } else {
        f.write_str("\n")?;
    }
    for _ in 0..indent {
        f.write_str("  ")?;
    }
    Ok(())
}
