//! Position tracked access to document bytes, dispatching multi-byte fields
//! on the wire variant.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::format::Variant;
use crate::Tag;

macro_rules! impl_read_num {
    ($name:ident, $t:ty, $size:literal, $method:ident) => {
        pub fn $name(&mut self, what: &str) -> Result<$t> {
            let raw = self.take($size, what)?;
            Ok(match self.variant {
                Variant::BigEndian => BigEndian::$method(raw),
                _ => LittleEndian::$method(raw),
            })
        }
    };
}

macro_rules! impl_write_num {
    ($name:ident, $t:ty, $size:literal, $method:ident) => {
        pub fn $name(&mut self, v: $t) {
            let mut raw = [0u8; $size];
            match self.variant {
                Variant::BigEndian => BigEndian::$method(&mut raw, v),
                _ => LittleEndian::$method(&mut raw, v),
            }
            self.buf.extend_from_slice(&raw);
        }
    };
}

/// Reads wire fields out of a borrowed buffer. Failed reads consume nothing
/// and report the offset the read started at.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    variant: Variant,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], variant: Variant) -> Self {
        Reader {
            data,
            pos: 0,
            variant,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Takes the next `n` bytes. `what` names the field being read for the
    /// error message.
    pub fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::truncated(self.pos, what, n, self.remaining()));
        }
        let raw = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(raw)
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub fn read_i8(&mut self, what: &str) -> Result<i8> {
        Ok(self.read_u8(what)? as i8)
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        let pos = self.pos;
        let raw = self.read_u8("tag byte")?;
        Tag::try_from(raw).map_err(|_| Error::invalid_tag(Some(pos), raw))
    }

    impl_read_num!(read_u16, u16, 2, read_u16);
    impl_read_num!(read_i16, i16, 2, read_i16);
    impl_read_num!(read_i32, i32, 4, read_i32);
    impl_read_num!(read_i64, i64, 8, read_i64);
    impl_read_num!(read_f32, f32, 4, read_f32);
    impl_read_num!(read_f64, f64, 8, read_f64);

    /// Reads a u16 length prefixed modified UTF-8 string.
    pub fn read_string(&mut self, what: &str) -> Result<String> {
        let len = self.read_u16(what)? as usize;
        let pos = self.pos;
        let raw = self.take(len, what)?;
        match cesu8::from_java_cesu8(raw) {
            Ok(s) => Ok(s.into_owned()),
            Err(_) => Err(Error::invalid_utf8(pos, raw)),
        }
    }

    pub fn read_i8_array(&mut self, count: usize, what: &str) -> Result<Vec<i8>> {
        let raw = self.take(count, what)?;
        Ok(vec_u8_into_i8(raw.to_vec()))
    }

    pub fn read_i32_array(&mut self, count: usize, what: &str) -> Result<Vec<i32>> {
        let bytes = count
            .checked_mul(4)
            .ok_or_else(|| Error::malformed_length(self.pos, what, count as i64))?;
        let raw = self.take(bytes, what)?;
        let mut out = vec![0i32; count];
        match self.variant {
            Variant::BigEndian => BigEndian::read_i32_into(raw, &mut out),
            _ => LittleEndian::read_i32_into(raw, &mut out),
        }
        Ok(out)
    }

    pub fn read_i64_array(&mut self, count: usize, what: &str) -> Result<Vec<i64>> {
        let bytes = count
            .checked_mul(8)
            .ok_or_else(|| Error::malformed_length(self.pos, what, count as i64))?;
        let raw = self.take(bytes, what)?;
        let mut out = vec![0i64; count];
        match self.variant {
            Variant::BigEndian => BigEndian::read_i64_into(raw, &mut out),
            _ => LittleEndian::read_i64_into(raw, &mut out),
        }
        Ok(out)
    }
}

/// Appends wire fields to an owned buffer.
pub(crate) struct Writer {
    buf: Vec<u8>,
    variant: Variant,
}

impl Writer {
    pub fn new(variant: Variant) -> Writer {
        Writer {
            buf: Vec::new(),
            variant,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    impl_write_num!(write_u16, u16, 2, write_u16);
    impl_write_num!(write_i16, i16, 2, write_i16);
    impl_write_num!(write_i32, i32, 4, write_i32);
    impl_write_num!(write_i64, i64, 8, write_i64);
    impl_write_num!(write_f32, f32, 4, write_f32);
    impl_write_num!(write_f64, f64, 8, write_f64);

    /// Writes a u16 length prefixed modified UTF-8 string. Fails if the
    /// encoded form does not fit the prefix.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let encoded = cesu8::to_java_cesu8(s);
        if encoded.len() > u16::MAX as usize {
            return Err(Error::overflow(
                "string payload",
                encoded.len(),
                u16::MAX as usize,
            ));
        }
        self.write_u16(encoded.len() as u16);
        self.buf.extend_from_slice(&encoded);
        Ok(())
    }

    /// Writes an i32 element count, failing if it does not fit.
    pub fn write_len(&mut self, what: &str, len: usize) -> Result<()> {
        let len =
            i32::try_from(len).map_err(|_| Error::overflow(what, len, i32::MAX as usize))?;
        self.write_i32(len);
        Ok(())
    }

    pub fn write_i8_slice(&mut self, v: &[i8]) {
        // i8 and u8 share size and alignment
        let bytes = unsafe { std::slice::from_raw_parts(v.as_ptr().cast::<u8>(), v.len()) };
        self.buf.extend_from_slice(bytes);
    }
}

fn vec_u8_into_i8(v: Vec<u8>) -> Vec<i8> {
    // Vec::into_raw_parts is unstable, so take the vec apart by hand. The
    // ManuallyDrop stops the original freeing the buffer it no longer owns.
    let mut v = std::mem::ManuallyDrop::new(v);
    let p = v.as_mut_ptr();
    let len = v.len();
    let cap = v.capacity();
    unsafe { Vec::from_raw_parts(p as *mut i8, len, cap) }
}
