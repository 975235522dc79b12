use std::fs;
use std::io::Write;
use std::path::Path;

use crate::encode;
use crate::error::Result;
use crate::format::{self, Compression, Format, Variant};
use crate::value::Value;

/// A named root tag plus the wire format it travels in.
///
/// Decoding records the detected format, so saving the document reproduces
/// the framing it arrived with: a gzipped little-endian file round-trips as
/// a gzipped little-endian file. [`set_format`](Document::set_format) or the
/// `_with` methods override that.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    root: Value,
    format: Format,
}

impl Document {
    /// A document in the default format: big-endian, uncompressed.
    pub fn new(name: impl Into<String>, root: impl Into<Value>) -> Document {
        Document::with_format(name, root, Format::default())
    }

    pub fn with_format(
        name: impl Into<String>,
        root: impl Into<Value>,
        format: Format,
    ) -> Document {
        Document {
            name: name.into(),
            root: root.into(),
            format,
        }
    }

    /// The root tag's name. Often empty on real files.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    /// The format this document was decoded from, or was built with.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Encodes in the document's stored format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(self.format)
    }

    pub fn to_bytes_with(&self, format: Format) -> Result<Vec<u8>> {
        let body = encode::document_body(&self.name, &self.root, format.variant)?;
        let body = match format.variant {
            Variant::Pocket => format::frame_pocket(&body)?,
            _ => body,
        };
        match format.compression {
            Compression::None => Ok(body),
            scheme => format::compress(&body, scheme),
        }
    }

    /// Encodes into a writer in the document's stored format.
    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        self.to_writer_with(writer, self.format)
    }

    pub fn to_writer_with(&self, mut writer: impl Write, format: Format) -> Result<()> {
        let bytes = self.to_bytes_with(format)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Writes the document to a file in its stored format.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Compares the name and the tree, not the stored wire format.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.root == other.root
    }
}
