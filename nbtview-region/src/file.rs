//! Reading chunks out of region files

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use nbtview_core::compression::{self, InflationStatus};
use nbtview_core::{codec, NamedTag, NbtError, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::header::{ChunkLocation, RegionHeader, SECTOR_LENGTH};

/// Length of the per-chunk header: u32 length and a compression byte
pub const CHUNK_HEADER_LENGTH: usize = 5;

/// Flag on the compression byte marking a chunk stored in a separate file
const EXTERNAL_FLAG: u8 = 0x80;

/// Compression scheme recorded in a chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkCompression {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

impl ChunkCompression {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ChunkCompression {
    type Error = NbtError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ChunkCompression::Gzip),
            2 => Ok(ChunkCompression::Zlib),
            3 => Ok(ChunkCompression::Uncompressed),
            other => Err(NbtError::UnsupportedCompression(other)),
        }
    }
}

/// Raw payload of one chunk, still compressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    pub compression: ChunkCompression,
    pub data: Vec<u8>,
}

impl ChunkData {
    /// Inflate and decode the chunk's NBT document
    pub fn decode(&self) -> Result<NamedTag> {
        self.decode_with_max_depth(codec::DEFAULT_MAX_DEPTH)
    }

    pub fn decode_with_max_depth(&self, max_depth: usize) -> Result<NamedTag> {
        match self.compression {
            ChunkCompression::Uncompressed => codec::decode_with_max_depth(&self.data, max_depth),
            ChunkCompression::Gzip | ChunkCompression::Zlib => {
                codec::decode_with_max_depth(&compression::decompress(&self.data)?, max_depth)
            }
        }
    }
}

/// Validated location of a chunk's payload
#[derive(Debug, Clone, Copy)]
struct ChunkHeader {
    compression: ChunkCompression,
    payload_start: u64,
    payload_length: usize,
}

/// A region file opened for reading
///
/// Generic over the byte source so tests and tools can read from memory.
#[derive(Debug)]
pub struct RegionFile<R> {
    name: String,
    source: R,
    header: RegionHeader,
}

impl RegionFile<BufReader<File>> {
    /// Open a region file on disk and read its header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(path.display().to_string(), BufReader::new(file))
    }
}

impl<R: Read + Seek> RegionFile<R> {
    /// Read the header of a region held by `source`
    ///
    /// `name` identifies the region in error messages.
    pub fn from_reader(name: impl Into<String>, source: R) -> Result<Self> {
        let mut region = Self {
            name: name.into(),
            source,
            header: RegionHeader::default(),
        };
        let offsets = region.read_sectors(0, 1)?;
        let timestamps = region.read_sectors(1, 1)?;
        region.header = RegionHeader::load_from_sectors(&offsets, &timestamps)?;
        debug!(
            region = %region.name,
            chunks = region.header.present_chunks().len(),
            "Loaded region header"
        );
        Ok(region)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &RegionHeader {
        &self.header
    }

    pub fn location(&self, index: usize) -> Result<ChunkLocation> {
        self.header.location(index).copied()
    }

    /// Index of the first sector of chunk `index`
    pub fn chunk_offset(&self, index: usize) -> Result<u32> {
        Ok(self.location(index)?.offset)
    }

    /// Number of sectors allocated to chunk `index`
    pub fn chunk_length(&self, index: usize) -> Result<u8> {
        Ok(self.location(index)?.sector_count)
    }

    /// Last-modified time of chunk `index`, in seconds since the Unix epoch
    pub fn chunk_timestamp(&self, index: usize) -> Result<u32> {
        Ok(self.location(index)?.timestamp)
    }

    /// Indices of chunks that have data
    pub fn present_chunks(&self) -> Vec<usize> {
        self.header.present_chunks()
    }

    /// Read the still-compressed payload of chunk `index`
    ///
    /// Returns `None` for chunks that are not present.
    ///
    /// # Errors
    ///
    /// - [`NbtError::Region`] if the chunk overlaps the header, its length
    ///   does not fit its sectors, or the file is truncated
    /// - [`NbtError::UnsupportedCompression`] for schemes other than gzip,
    ///   zlib and uncompressed, including externally stored chunks
    pub fn chunk_data(&mut self, index: usize) -> Result<Option<ChunkData>> {
        let Some(header) = self.chunk_header(index)? else {
            return Ok(None);
        };
        let mut data = vec![0u8; header.payload_length];
        self.read_at(header.payload_start, &mut data)?;
        Ok(Some(ChunkData {
            compression: header.compression,
            data,
        }))
    }

    /// Read and decode the NBT document of chunk `index`
    pub fn read_chunk(&mut self, index: usize) -> Result<Option<NamedTag>> {
        match self.chunk_data(index)? {
            Some(chunk) => chunk.decode().map(Some),
            None => Ok(None),
        }
    }

    /// Inflate a zlib chunk sector by sector
    ///
    /// Unlike [`Self::read_chunk`], a damaged stream is not an error: the bytes
    /// recovered so far are returned with a status naming the failing sector,
    /// counted from the chunk's first sector. If the file ends inside the
    /// chunk, the sectors that exist are inflated and the first missing or
    /// partial sector is reported as corrupt. Chunks using another scheme
    /// yield `None`.
    ///
    /// # Errors
    ///
    /// The same header checks as [`Self::chunk_data`].
    pub fn inflate_chunk(&mut self, index: usize) -> Result<Option<(Vec<u8>, InflationStatus)>> {
        let Some(header) = self.chunk_header(index)? else {
            return Ok(None);
        };
        if header.compression != ChunkCompression::Zlib {
            return Ok(None);
        }

        let payload = self.read_up_to(header.payload_start, header.payload_length)?;
        let first_len = (SECTOR_LENGTH - CHUNK_HEADER_LENGTH).min(payload.len());
        let (first, rest) = payload.split_at(first_len);
        let sectors: Vec<&[u8]> = std::iter::once(first)
            .chain(rest.chunks(SECTOR_LENGTH))
            .collect();
        let (inflated, mut status) = compression::inflate_sectors(&sectors);

        if payload.len() < header.payload_length && !status.complete && !status.corrupt {
            let missing = (CHUNK_HEADER_LENGTH + payload.len()) / SECTOR_LENGTH;
            warn!(
                chunk = index,
                sector = missing,
                "Region file {} ends inside chunk",
                self.name
            );
            status.corrupt = true;
            status.corrupt_sector = Some(missing);
        }
        Ok(Some((inflated, status)))
    }

    /// Read and validate the 5-byte header of chunk `index`
    fn chunk_header(&mut self, index: usize) -> Result<Option<ChunkHeader>> {
        let location = self.location(index)?;
        if !location.is_present() {
            return Ok(None);
        }
        if location.offset < 2 {
            return Err(NbtError::Region(format!(
                "Chunk {} starts at sector {}, inside the header of {}",
                index, location.offset, self.name
            )));
        }

        let start = location.offset as u64 * SECTOR_LENGTH as u64;
        let mut raw = [0u8; CHUNK_HEADER_LENGTH];
        self.read_at(start, &mut raw)?;

        let length = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        let scheme = raw[4];

        // The length counts the compression byte but not itself
        let allocated = location.sector_count as usize * SECTOR_LENGTH;
        if length == 0 || length + 4 > allocated {
            return Err(NbtError::Region(format!(
                "Reported encoded chunk length {} does not fit the {} sectors allocated for chunk {}",
                length, location.sector_count, index
            )));
        }
        if scheme & EXTERNAL_FLAG != 0 {
            warn!(chunk = index, "Chunk is stored in an external file");
            return Err(NbtError::UnsupportedCompression(scheme));
        }

        Ok(Some(ChunkHeader {
            compression: ChunkCompression::try_from(scheme)?,
            payload_start: start + CHUNK_HEADER_LENGTH as u64,
            payload_length: length - 1,
        }))
    }

    fn read_sectors(&mut self, first: u32, count: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count as usize * SECTOR_LENGTH];
        self.read_at(first as u64 * SECTOR_LENGTH as u64, &mut buf)
            .map_err(|e| match e {
                NbtError::Region(_) => NbtError::Region(format!(
                    "Could not read sector {} of region file {}",
                    first, self.name
                )),
                other => other,
            })?;
        Ok(buf)
    }

    /// Read at most `len` bytes from `position`, stopping at end of file
    fn read_up_to(&mut self, position: u64, len: usize) -> Result<Vec<u8>> {
        self.source.seek(SeekFrom::Start(position))?;
        let mut buf = Vec::with_capacity(len);
        (&mut self.source).take(len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn read_at(&mut self, position: u64, buf: &mut [u8]) -> Result<()> {
        self.source.seek(SeekFrom::Start(position))?;
        self.source.read_exact(buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                NbtError::Region(format!(
                    "Region file {} ends before byte {}",
                    self.name,
                    position + buf.len() as u64
                ))
            } else {
                NbtError::Io(e)
            }
        })
    }
}
