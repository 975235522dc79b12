use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use kelpnbt::Document;
use num_enum::TryFromPrimitive;

use crate::{Error, Result};

/// The size in bytes of a 'sector', the allocation unit of a region file.
/// Chunks always start on a sector boundary and are tracked in whole
/// sectors; the exact byte length lives in the chunk's own header.
pub const SECTOR_SIZE: usize = 4096;

/// The size of the region file header: the chunk location table followed by
/// the timestamp table, one sector each.
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// The size of the header stored in front of each chunk: a big-endian length
/// and the compression scheme byte.
pub const CHUNK_HEADER_SIZE: usize = 5;

/// Slots in each header table, one per chunk of a 32 by 32 region.
const HEADER_SLOTS: usize = 1024;

/// A Minecraft region: up to 1024 compressed NBT documents addressed by the
/// sector table in the region header.
///
/// The header tables are cached when the region is opened; chunk data is
/// read from the underlying stream on demand.
pub struct Region<S> {
    stream: S,
    /// Location table in slot order. Zeroed entries mean no chunk.
    locations: Vec<ChunkLocation>,
    /// Modification times in seconds since the epoch, slot order. Zero means
    /// never written.
    timestamps: Vec<u32>,
    /// Sorted sector offsets of live chunks. The last entry is always the
    /// first sector past the end of used space.
    offsets: Vec<u64>,
}

impl<S> Region<S>
where
    S: Read + Seek,
{
    /// Load a region from an existing stream. A seek to zero is taken as the
    /// start of the region. The header tables are read up front; chunk data
    /// stays on the stream until asked for.
    pub fn from_stream(mut stream: S) -> Result<Self> {
        stream.rewind()?;
        let mut header = [0u8; REGION_HEADER_SIZE];
        stream.read_exact(&mut header)?;

        let mut locations = Vec::with_capacity(HEADER_SLOTS);
        for slot in 0..HEADER_SLOTS {
            let entry = &header[slot * 4..(slot + 1) * 4];
            locations.push(ChunkLocation {
                offset: BigEndian::read_u24(&entry[..3]) as u64,
                sectors: entry[3] as u64,
            });
        }

        let mut timestamps = Vec::with_capacity(HEADER_SLOTS);
        for slot in 0..HEADER_SLOTS {
            let entry = &header[SECTOR_SIZE + slot * 4..SECTOR_SIZE + (slot + 1) * 4];
            timestamps.push(BigEndian::read_u32(entry));
        }

        let mut offsets = vec![];
        // sector 2 is the first valid place for chunk data, even in a region
        // holding no chunks at all.
        let mut end: u64 = 2;
        for loc in &locations {
            if loc.offset == 0 && loc.sectors == 0 {
                continue;
            }
            offsets.push(loc.offset);
            end = end.max(loc.offset + loc.sectors);
        }
        offsets.sort_unstable();

        // we add an offset representing the end of sectors that are in use.
        offsets.push(end);

        log::debug!("loaded region header, {} chunks present", offsets.len() - 1);

        Ok(Self {
            stream,
            locations,
            timestamps,
            offsets,
        })
    }

    /// Read the chunk at chunk coordinates x, z. These should both be 0..32.
    /// The chunk data returned is uncompressed NBT. `None` means the region
    /// holds no chunk at that coordinate.
    pub fn read_chunk(&mut self, x: usize, z: usize) -> Result<Option<Vec<u8>>> {
        let loc = match self.location(x, z)? {
            Some(loc) => loc,
            None => return Ok(None),
        };

        self.stream
            .seek(SeekFrom::Start(loc.offset * SECTOR_SIZE as u64))?;

        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        self.stream.read_exact(&mut buf)?;
        let meta = ChunkMeta::new(&buf)?;

        let mut compressed = (&mut self.stream).take(meta.compressed_len as u64);
        let mut data = vec![];

        match meta.compression_scheme {
            CompressionScheme::Gzip => {
                let mut decoder = GzDecoder::new(compressed);
                decoder.read_to_end(&mut data)?;
            }
            CompressionScheme::Zlib => {
                let mut decoder = ZlibDecoder::new(compressed);
                decoder.read_to_end(&mut data)?;
            }
            CompressionScheme::Uncompressed => {
                compressed.read_to_end(&mut data)?;
            }
        }

        Ok(Some(data))
    }

    /// Read the chunk at x, z and decode it as an NBT document. Chunk
    /// payloads are big-endian NBT with compression already handled at the
    /// region layer.
    pub fn read_document(&mut self, x: usize, z: usize) -> Result<Option<Document>> {
        let data = match self.read_chunk(x, z)? {
            Some(data) => data,
            None => return Ok(None),
        };

        Ok(Some(kelpnbt::from_bytes_with(&data, chunk_format())?))
    }

    /// Look up a chunk's location in the cached sector table. `None` for a
    /// slot with no chunk.
    pub fn location(&self, x: usize, z: usize) -> Result<Option<ChunkLocation>> {
        let loc = self.locations[slot_index(x, z)?];
        if loc.offset == 0 && loc.sectors == 0 {
            Ok(None)
        } else {
            Ok(Some(loc))
        }
    }

    /// The last modification time of the chunk at x, z in seconds since the
    /// epoch, from the cached timestamp table. Zeroed entries read as
    /// `None`. Writing chunks through this region leaves the table as it
    /// was.
    pub fn timestamp(&self, x: usize, z: usize) -> Result<Option<u32>> {
        let seconds = self.timestamps[slot_index(x, z)?];
        if seconds == 0 {
            Ok(None)
        } else {
            Ok(Some(seconds))
        }
    }

    /// Chunk coordinates with data in this region, in slot order. This only
    /// scans the cached location table, no chunk data is touched.
    pub fn present_chunks(&self) -> Vec<(usize, usize)> {
        let mut present = Vec::new();
        for (slot, loc) in self.locations.iter().enumerate() {
            if loc.offset == 0 && loc.sectors == 0 {
                continue;
            }
            present.push((slot % 32, slot / 32));
        }
        present
    }

    /// Iterate over every chunk present in the region, in slot order. Slots
    /// with no chunk are skipped rather than yielded.
    pub fn iter(&mut self) -> Iter<'_, S> {
        Iter {
            region: self,
            slot: 0,
        }
    }

    /// Return the underlying stream, positioned at the first sector past the
    /// used space so a backing file can be truncated there.
    pub fn into_inner(mut self) -> io::Result<S> {
        let end = *self.offsets.last().expect("offset should always exist");
        self.stream.seek(SeekFrom::Start(end * SECTOR_SIZE as u64))?;
        Ok(self.stream)
    }
}

impl Region<File> {
    /// Open a region file for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Region<File>> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Region::from_stream(file)
    }
}

impl<S> Region<S>
where
    S: Read + Write + Seek,
{
    /// Create an entirely empty region. The provided stream is overwritten,
    /// starting with the zeroed header, and a seek to zero is taken as the
    /// start of the region.
    pub fn new(mut stream: S) -> Result<Self> {
        stream.rewind()?;
        stream.write_all(&[0; REGION_HEADER_SIZE])?;

        Ok(Self {
            stream,
            locations: vec![ChunkLocation::default(); HEADER_SLOTS],
            timestamps: vec![0; HEADER_SLOTS],
            offsets: vec![2], // 2 is the end of the header
        })
    }

    /// Write the given uncompressed NBT chunk data to the chunk coordinates
    /// x, z. The coordinates should both be 0..32. The data is compressed
    /// with zlib, which is what the game itself writes; use
    /// `write_compressed_chunk` for control over the scheme.
    pub fn write_chunk(&mut self, x: usize, z: usize, uncompressed_chunk: &[u8]) -> Result<()> {
        let mut buf = vec![];
        let mut enc = ZlibEncoder::new(uncompressed_chunk, Compression::fast());
        enc.read_to_end(&mut buf)?;
        self.write_compressed_chunk(x, z, CompressionScheme::Zlib, &buf)
    }

    /// Encode a document and store it as the chunk at x, z, big-endian and
    /// zlib compressed at the region layer.
    pub fn write_document(&mut self, x: usize, z: usize, doc: &Document) -> Result<()> {
        let data = doc.to_bytes_with(chunk_format())?;
        self.write_chunk(x, z, &data)
    }

    /// Write chunk data that is already compressed with the given scheme.
    /// The chunk goes back into its current sectors when it still fits,
    /// otherwise it moves to the end of the used space.
    pub fn write_compressed_chunk(
        &mut self,
        x: usize,
        z: usize,
        scheme: CompressionScheme,
        compressed_chunk: &[u8],
    ) -> Result<()> {
        let loc = self.location(x, z)?;
        let required_sectors = (CHUNK_HEADER_SIZE + compressed_chunk.len()).div_ceil(SECTOR_SIZE);

        // the sector count has to fit in the single byte the location table
        // gives it. Checked before anything is written so a failed write
        // leaves the region as it was.
        if required_sectors > 255 {
            return Err(Error::ChunkTooLarge);
        }

        match loc {
            None => {
                // chunk does not exist in the region yet.
                let offset = *self.offsets.last().expect("offset should always exist");

                // add a new offset representing the new 'end' of the current region file.
                self.offsets.push(offset + required_sectors as u64);
                self.set_chunk(offset, scheme, compressed_chunk)?;
                self.set_location(x, z, offset, required_sectors)?;
            }
            Some(loc) => {
                // chunk already exists in the region file, need to update it.
                let i = self.offsets.binary_search(&loc.offset).unwrap();
                let start_offset = self.offsets[i];
                let end_offset = self.offsets[i + 1];
                let available_sectors = (end_offset - start_offset) as usize;

                if required_sectors <= available_sectors {
                    // we fit in the current gap in the file.
                    self.set_chunk(start_offset, scheme, compressed_chunk)?;
                    self.set_location(x, z, start_offset, required_sectors)?;
                } else {
                    // we do not fit in the current gap, need to find a new home for
                    // this chunk.
                    self.offsets.remove(i); // this chunk will no longer be here.
                    let offset = *self.offsets.last().unwrap();

                    log::debug!("chunk ({}, {}) relocated to sector {}", x, z, offset);

                    // add a new offset representing the new 'end' of the current region file.
                    self.offsets.push(offset + required_sectors as u64);
                    self.set_chunk(offset, scheme, compressed_chunk)?;
                    self.set_location(x, z, offset, required_sectors)?;
                }
            }
        }

        Ok(())
    }

    /// Remove the chunk at x, z from the region. Removing an absent chunk is
    /// a no-op. The freed sectors are reused by later writes; the old bytes
    /// are not zeroed.
    pub fn remove_chunk(&mut self, x: usize, z: usize) -> Result<()> {
        let loc = match self.location(x, z)? {
            Some(loc) => loc,
            None => return Ok(()),
        };

        // drop the chunk from the allocator so its sectors can be reused.
        let i = self.offsets.binary_search(&loc.offset).unwrap();
        self.offsets.remove(i);

        self.set_location(x, z, 0, 0)
    }

    fn set_chunk(&mut self, offset: u64, scheme: CompressionScheme, chunk: &[u8]) -> Result<()> {
        self.stream
            .seek(SeekFrom::Start(offset * SECTOR_SIZE as u64))?;

        self.stream.write_all(&chunk_meta(
            chunk.len() as u32, // doesn't include header size
            scheme,
        ))?;

        self.stream.write_all(chunk)?;
        Ok(())
    }

    /// Update one location table entry, on disk and in the cache.
    fn set_location(&mut self, x: usize, z: usize, offset: u64, sectors: usize) -> Result<()> {
        let slot = slot_index(x, z)?;

        let mut buf = [0u8; 4];
        buf[0] = ((offset & 0xFF0000) >> 16) as u8;
        buf[1] = ((offset & 0x00FF00) >> 8) as u8;
        buf[2] = (offset & 0x0000FF) as u8;
        buf[3] = sectors as u8;

        self.stream.seek(SeekFrom::Start(4 * slot as u64))?;
        self.stream.write_all(&buf)?;

        self.locations[slot] = ChunkLocation {
            offset,
            sectors: sectors as u64,
        };
        Ok(())
    }
}

/// Various compression schemes that chunks are stored with, as named by the
/// scheme byte of each chunk's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

/// The location of a chunk inside a region file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkLocation {
    /// The offset, in units of 4 kiB sectors, into the region file this
    /// chunk is located at. Offset 0 is the start of the file.
    pub offset: u64,

    /// The number of 4 kiB sectors that this chunk occupies in the region
    /// file.
    pub sectors: u64,
}

/// An occupied chunk slot yielded by [`Region::iter`]. `data` is the
/// uncompressed NBT payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    pub x: usize,
    pub z: usize,
    pub data: Vec<u8>,
}

pub struct Iter<'a, S> {
    region: &'a mut Region<S>,
    slot: usize,
}

impl<'a, S> Iterator for Iter<'a, S>
where
    S: Read + Seek,
{
    type Item = Result<ChunkData>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < HEADER_SLOTS {
            let (x, z) = (self.slot % 32, self.slot / 32);
            self.slot += 1;

            match self.region.read_chunk(x, z) {
                Ok(None) => continue,
                Ok(Some(data)) => return Some(Ok(ChunkData { x, z, data })),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Per-chunk header: payload length and compression scheme.
#[derive(Debug)]
struct ChunkMeta {
    compressed_len: u32,
    compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(data: &[u8; CHUNK_HEADER_SIZE]) -> Result<Self> {
        let mut buf = &data[..];
        let len = buf.read_u32::<BigEndian>()?;
        let raw_scheme = buf.read_u8()?;

        // the stored length counts the scheme byte too, so zero cannot
        // describe a chunk.
        if len == 0 {
            return Err(Error::InvalidChunkMeta);
        }

        let scheme = CompressionScheme::try_from(raw_scheme)
            .map_err(|_| Error::UnsupportedCompressionScheme(raw_scheme))?;

        Ok(Self {
            compressed_len: len - 1, // this len includes the compression byte.
            compression_scheme: scheme,
        })
    }
}

fn chunk_meta(compressed_chunk_size: u32, scheme: CompressionScheme) -> [u8; CHUNK_HEADER_SIZE] {
    let mut buf = [0u8; CHUNK_HEADER_SIZE];
    let mut c = Cursor::new(buf.as_mut_slice());

    // size written to disk includes the byte representing the compression
    // scheme, so +1.
    c.write_u32::<BigEndian>(compressed_chunk_size + 1).unwrap();
    c.write_u8(scheme as u8).unwrap();

    buf
}

/// The wire format of chunk payloads. Regions predate the little-endian
/// variants and always hold big-endian documents.
fn chunk_format() -> kelpnbt::Format {
    kelpnbt::Format::new(kelpnbt::Variant::BigEndian, kelpnbt::Compression::None)
}

fn slot_index(x: usize, z: usize) -> Result<usize> {
    if x >= 32 || z >= 32 {
        return Err(Error::InvalidOffset(x as isize, z as isize));
    }
    Ok(x + z * 32)
}
