//! Wire format description and detection.
//!
//! A document's framing has two independent parts: the field [`Variant`] and
//! an optional outer [`Compression`] wrapper. [`detect`] works both out from
//! the bytes alone: compression first (gzip magic, then the zlib header
//! check from RFC 1950), decompressing and looking again until the data is
//! bare, then the variant.
//!
//! The variant probe is a heuristic and is ordered by how specific each
//! check is. The pocket framing is tried first since its payload length
//! field must match the remaining input exactly, which a file in another
//! variant practically never satisfies, while pocket files (a small
//! little-endian version, so bytes like `03 00 00 00`) routinely look like
//! plausible big-endian documents. Big-endian is preferred over
//! little-endian when both fit; a root with an empty name is byte-identical
//! in the two and resolves to big-endian. Callers that know the true format
//! of such input should use [`from_bytes_with`](crate::from_bytes_with).
//!
//! ```
//! use kelpnbt::{Compression, Format, Variant};
//!
//! // a bare Java edition document: kind byte, name length, name, end
//! let bytes = [0x0a, 0x00, 0x03, b'f', b'o', b'o', 0x00];
//! let format = kelpnbt::format::detect(&bytes)?;
//! assert_eq!(format, Format::new(Variant::BigEndian, Compression::None));
//! # Ok::<(), kelpnbt::error::Error>(())
//! ```

use std::borrow::Cow;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::read::{GzDecoder, GzEncoder, ZlibDecoder, ZlibEncoder};
use log::debug;

use crate::error::{Error, Result};
use crate::Tag;

/// Field encoding of an NBT document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    /// Java edition order: big-endian numbers and length prefixes.
    #[default]
    BigEndian,
    /// Bedrock edition disk order: little-endian numbers and prefixes.
    LittleEndian,
    /// Pocket `level.dat` framing: little-endian fields behind an eight byte
    /// header of storage version and payload length.
    Pocket,
}

/// Outer compression wrapper around an encoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zlib,
}

/// Everything needed to reproduce a document's bytes: the field variant plus
/// the compression wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Format {
    pub variant: Variant,
    pub compression: Compression,
}

impl Format {
    pub fn new(variant: Variant, compression: Compression) -> Format {
        Format {
            variant,
            compression,
        }
    }
}

/// Storage version written into the pocket header. Matches what pocket
/// edition wrote for `level.dat`.
const POCKET_VERSION: i32 = 3;

/// Versions beyond this are assumed to be some other format entirely.
const POCKET_VERSION_MAX: i32 = 255;

const POCKET_HEADER_SIZE: usize = 8;

// Nested wrappers are unwrapped recursively. Gzip quines exist, so cap the
// recursion.
const MAX_WRAPPERS: usize = 16;

/// Identifies the compression wrapper and field variant of `data` without
/// keeping the decoded payload.
///
/// Fails with an [`UnrecognizedFormat`] error if no supported interpretation
/// fits. A successful detection only means the framing is plausible; the
/// document may still fail to decode.
///
/// [`UnrecognizedFormat`]: crate::error::ErrorKind::UnrecognizedFormat
pub fn detect(data: &[u8]) -> Result<Format> {
    detect_and_unwrap(data).map(|(format, _)| format)
}

/// Detection that also hands back the decompressed document body, so decode
/// does not inflate twice.
pub(crate) fn detect_and_unwrap(data: &[u8]) -> Result<(Format, Cow<'_, [u8]>)> {
    let mut body = Cow::Borrowed(data);
    let mut outer = Compression::None;

    for depth in 0.. {
        let scheme = sniff_compression(&body);
        if scheme == Compression::None {
            break;
        }
        if depth == 0 {
            outer = scheme;
        } else if depth == MAX_WRAPPERS {
            return Err(Error::unrecognized_format(format!(
                "gave up unwrapping after {MAX_WRAPPERS} nested compression layers"
            )));
        }
        debug!("stripping {scheme:?} wrapper");
        body = Cow::Owned(decompress(&body, scheme)?);
    }

    let variant = sniff_variant(&body)?;
    debug!("detected {variant:?} variant");
    Ok((Format::new(variant, outer), body))
}

fn sniff_compression(data: &[u8]) -> Compression {
    if data.len() < 2 {
        return Compression::None;
    }
    if data[0] == 0x1f && data[1] == 0x8b {
        return Compression::Gzip;
    }
    // RFC 1950: deflate method nibble, window size no larger than 32K, and
    // the check bits make CMF|FLG a multiple of 31.
    let cmf_flg = u16::from(data[0]) << 8 | u16::from(data[1]);
    if data[0] & 0x0f == 8 && data[0] >> 4 <= 7 && cmf_flg % 31 == 0 {
        return Compression::Zlib;
    }
    Compression::None
}

fn sniff_variant(data: &[u8]) -> Result<Variant> {
    if pocket_header(data).is_some() {
        return Ok(Variant::Pocket);
    }
    if plausible_root(data, true) {
        return Ok(Variant::BigEndian);
    }
    if plausible_root(data, false) {
        return Ok(Variant::LittleEndian);
    }
    match data.first() {
        None => Err(Error::unrecognized_format(
            "cannot detect the format of an empty input",
        )),
        Some(&first) => Err(Error::unrecognized_format(format!(
            "no supported variant fits the input (first byte {first:#04x})"
        ))),
    }
}

/// Checks for the pocket framing and returns how many bytes it occupies: a
/// small little-endian storage version, then a payload length that must
/// equal the remaining input exactly, then a plausible little-endian root.
pub(crate) fn pocket_header(data: &[u8]) -> Option<usize> {
    if data.len() < POCKET_HEADER_SIZE + 1 {
        return None;
    }
    let version = LittleEndian::read_i32(&data[0..4]);
    let length = LittleEndian::read_i32(&data[4..8]);
    if !(0..=POCKET_VERSION_MAX).contains(&version) || length < 0 {
        return None;
    }
    if length as usize != data.len() - POCKET_HEADER_SIZE {
        return None;
    }
    if !plausible_root(&data[POCKET_HEADER_SIZE..], false) {
        return None;
    }
    Some(POCKET_HEADER_SIZE)
}

/// Wraps an encoded pocket body in the version and length header.
pub(crate) fn frame_pocket(body: &[u8]) -> Result<Vec<u8>> {
    let len = i32::try_from(body.len())
        .map_err(|_| Error::overflow("pocket payload", body.len(), i32::MAX as usize))?;
    let mut out = Vec::with_capacity(POCKET_HEADER_SIZE + body.len());
    let mut raw = [0u8; 4];
    LittleEndian::write_i32(&mut raw, POCKET_VERSION);
    out.extend_from_slice(&raw);
    LittleEndian::write_i32(&mut raw, len);
    out.extend_from_slice(&raw);
    out.extend_from_slice(body);
    Ok(out)
}

/// A plausible document start in the given byte order: a valid kind byte
/// and, for a named root, a name length that fits the buffer.
fn plausible_root(data: &[u8], big: bool) -> bool {
    let kind = match data.first() {
        Some(&kind) => kind,
        None => return false,
    };
    if Tag::try_from(kind).is_err() {
        return false;
    }
    if kind == u8::from(Tag::End) {
        // degenerate but well formed: decode reports the missing root
        return true;
    }
    if data.len() < 3 {
        return false;
    }
    let name_len = if big {
        BigEndian::read_u16(&data[1..3])
    } else {
        LittleEndian::read_u16(&data[1..3])
    };
    3 + name_len as usize <= data.len()
}

pub(crate) fn decompress(data: &[u8], scheme: Compression) -> Result<Vec<u8>> {
    match scheme {
        Compression::None => Ok(data.to_vec()),
        Compression::Gzip => drain(GzDecoder::new(data), "gzip"),
        Compression::Zlib => drain(ZlibDecoder::new(data), "zlib"),
    }
}

pub(crate) fn compress(data: &[u8], scheme: Compression) -> Result<Vec<u8>> {
    let level = flate2::Compression::default();
    match scheme {
        Compression::None => Ok(data.to_vec()),
        Compression::Gzip => drain(GzEncoder::new(data, level), "gzip"),
        Compression::Zlib => drain(ZlibEncoder::new(data, level), "zlib"),
    }
}

fn drain(mut src: impl Read, what: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    src.read_to_end(&mut out).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::from(e),
        _ => Error::bespoke(format!("{what} stream failed: {e}")),
    })?;
    Ok(out)
}
