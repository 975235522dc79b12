use std::io;

use crate::Tag;

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// An error from decoding, encoding or format detection.
///
/// Where the failure happened at a known point in the input, the byte offset
/// is available through [`Error::offset`]. The offset is relative to the
/// uncompressed document body, after any compression wrapper or pocket
/// header has been stripped.
#[derive(Debug, Clone)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
    offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input ended before the current tag's payload was complete.
    TruncatedInput,

    /// A length prefix was negative or impossibly large.
    MalformedLength,

    /// A kind byte was outside `0..=12`, or `TAG_End` appeared somewhere it
    /// carries no meaning.
    InvalidTag,

    /// A value's kind did not match the declared element kind of the list it
    /// was being put into.
    MismatchedTag,

    /// A name or string payload was not valid modified UTF-8. The message
    /// contains a lossy rendering of the offending bytes.
    InvalidUtf8,

    /// A string or element count was too large for its wire length prefix.
    EncodingOverflow,

    /// No supported compression scheme or field variant matched the input.
    UnrecognizedFormat,

    /// Any other errors. Users should not match on this variant and should
    /// instead use a wildcard `_`. Errors in this category may be moved to
    /// new variants.
    Other,
}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the document body where the error was detected, if
    /// one makes sense for this error.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub(crate) fn bespoke(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::Other,
            offset: None,
        }
    }

    pub(crate) fn truncated(offset: usize, what: &str, needed: usize, remaining: usize) -> Self {
        Self {
            msg: format!(
                "truncated input at offset {offset}: {what} needs {needed} bytes, {remaining} remain"
            ),
            kind: ErrorKind::TruncatedInput,
            offset: Some(offset),
        }
    }

    pub(crate) fn malformed_length(offset: usize, what: &str, len: i64) -> Self {
        Self {
            msg: format!("malformed length at offset {offset}: {what} claims {len} elements"),
            kind: ErrorKind::MalformedLength,
            offset: Some(offset),
        }
    }

    pub(crate) fn invalid_tag(offset: Option<usize>, tag: u8) -> Self {
        let msg = match offset {
            Some(offset) => format!("invalid tag: {tag} at offset {offset}"),
            None => format!("invalid tag: {tag}"),
        };
        Self {
            msg,
            kind: ErrorKind::InvalidTag,
            offset,
        }
    }

    pub(crate) fn end_list(offset: usize, len: i32) -> Self {
        Self {
            msg: format!("list at offset {offset} declares {len} elements of TAG_End"),
            kind: ErrorKind::InvalidTag,
            offset: Some(offset),
        }
    }

    pub(crate) fn root_end(offset: usize) -> Self {
        Self {
            msg: format!("TAG_End at offset {offset}: document has no root tag"),
            kind: ErrorKind::InvalidTag,
            offset: Some(offset),
        }
    }

    pub(crate) fn mismatched_tag(expected: Tag, found: Tag) -> Self {
        Self {
            msg: format!("list of {expected} cannot hold {found}"),
            kind: ErrorKind::MismatchedTag,
            offset: None,
        }
    }

    pub(crate) fn invalid_utf8(offset: usize, bytes: &[u8]) -> Self {
        Self {
            msg: format!(
                "invalid modified utf-8 at offset {offset}: {}",
                String::from_utf8_lossy(bytes)
            ),
            kind: ErrorKind::InvalidUtf8,
            offset: Some(offset),
        }
    }

    pub(crate) fn overflow(what: &str, len: usize, max: usize) -> Self {
        Self {
            msg: format!("{what} of {len} does not fit the wire maximum of {max}"),
            kind: ErrorKind::EncodingOverflow,
            offset: None,
        }
    }

    pub(crate) fn unrecognized_format(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::UnrecognizedFormat,
            offset: None,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self {
                msg: e.to_string(),
                kind: ErrorKind::TruncatedInput,
                offset: None,
            },
            _ => Self {
                msg: e.to_string(),
                kind: ErrorKind::Other,
                offset: None,
            },
        }
    }
}
