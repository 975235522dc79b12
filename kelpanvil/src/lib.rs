//! For handling Minecraft's region format, Anvil.
//!
//! A region file packs up to 1024 compressed NBT documents ("chunks") into
//! one file, addressed by a sector table in the file's header. [`Region`]
//! reads and writes region files over any seekable stream, and bridges into
//! [`kelpnbt`] for the documents themselves.
//!
//! ```no_run
//! use kelpanvil::Region;
//!
//! let mut region = Region::open("r.0.0.mca")?;
//! if let Some(doc) = region.read_document(0, 0)? {
//!     println!("{doc}");
//! }
//! # Ok::<(), kelpanvil::Error>(())
//! ```

mod region;

pub use region::*;


#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Nbt(kelpnbt::error::Error),
    InvalidOffset(isize, isize),
    InvalidChunkMeta,
    UnsupportedCompressionScheme(u8),
    ChunkTooLarge,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<kelpnbt::error::Error> for Error {
    fn from(err: kelpnbt::error::Error) -> Error {
        Error::Nbt(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => f.write_fmt(format_args!("io error: {:?}", e)),
            Error::Nbt(e) => f.write_fmt(format_args!("nbt error: {}", e)),
            Error::InvalidOffset(x, z) => {
                f.write_fmt(format_args!("invalid offset: x = {}, z = {}", x, z))
            }
            Error::InvalidChunkMeta => f.write_str("chunk metadata was malformed"),
            Error::UnsupportedCompressionScheme(scheme) => {
                f.write_fmt(format_args!("unsupported compression scheme: {}", scheme))
            }
            Error::ChunkTooLarge => f.write_str("chunk too large to fit in a region file"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
use std::io::Cursor;

#[cfg(test)]
pub struct Builder {
    inner: Vec<u8>,
}

#[cfg(test)]
impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Builder {
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    pub fn location(mut self, offset: u32, sectors: u8) -> Self {
        self.inner.extend_from_slice(&offset.to_be_bytes()[1..4]);
        self.inner.push(sectors);
        self
    }

    pub fn timestamp(mut self, epoch_seconds: u32) -> Self {
        self.inner.extend_from_slice(&epoch_seconds.to_be_bytes());
        self
    }

    /// Zero-fill up to the start of the given sector. `pad_to_sector(1)`
    /// finishes the location table, `pad_to_sector(2)` the whole header.
    pub fn pad_to_sector(mut self, sector: usize) -> Self {
        assert!(self.inner.len() <= sector * SECTOR_SIZE);
        self.inner.resize(sector * SECTOR_SIZE, 0);
        self
    }

    /// Append a stored chunk: length (including the scheme byte), the raw
    /// scheme byte, then the payload as given.
    pub fn chunk(mut self, scheme: u8, data: &[u8]) -> Self {
        let len = data.len() as u32 + 1;
        self.inner.extend_from_slice(&len.to_be_bytes());
        self.inner.push(scheme);
        self.inner.extend_from_slice(data);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.inner.extend_from_slice(bytes);
        self
    }

    pub fn build(mut self) -> Cursor<Vec<u8>> {
        let padded_sector_count = (self.inner.len() / SECTOR_SIZE) + 1;
        self.inner.resize(padded_sector_count * SECTOR_SIZE, 0);
        Cursor::new(self.inner)
    }

    pub fn build_unpadded(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.inner)
    }
}
