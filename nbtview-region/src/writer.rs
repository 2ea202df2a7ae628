//! Building region files

use std::io::Write;

use nbtview_core::compression::{self, Compression};
use nbtview_core::{codec, NamedTag, NbtError, Result};
use tracing::debug;

use crate::file::{ChunkCompression, CHUNK_HEADER_LENGTH};
use crate::header::{RegionHeader, MAX_SECTOR_OFFSET, SECTOR_LENGTH};

/// Sector where chunk data begins, after the two header sectors
const FIRST_DATA_SECTOR: u32 = 2;

/// Assembles a region file in memory
///
/// Chunks are laid out one after another in insertion order. Inserting a chunk
/// a second time points its header entry at the new copy and leaves the old
/// sectors unreferenced.
#[derive(Debug, Clone)]
pub struct RegionWriter {
    header: RegionHeader,
    data: Vec<u8>,
}

impl Default for RegionWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionWriter {
    pub fn new() -> Self {
        Self {
            header: RegionHeader::default(),
            data: Vec::new(),
        }
    }

    pub fn header(&self) -> &RegionHeader {
        &self.header
    }

    /// Encode `doc`, compress it with zlib and store it as chunk `index`
    pub fn insert(&mut self, index: usize, doc: &NamedTag, timestamp: u32) -> Result<()> {
        let raw = codec::to_bytes(doc)?;
        let packed = compression::compress(&raw, Compression::Zlib)?;
        self.insert_raw(index, ChunkCompression::Zlib, &packed, timestamp)
    }

    /// Store an already-compressed payload as chunk `index`
    ///
    /// The payload is written as given, so it may be used to build damaged
    /// regions as well as valid ones.
    pub fn insert_raw(
        &mut self,
        index: usize,
        compression: ChunkCompression,
        payload: &[u8],
        timestamp: u32,
    ) -> Result<()> {
        // Validate the index before touching the data area
        self.header.location(index)?;

        let length = u32::try_from(payload.len() + 1)
            .map_err(|_| NbtError::SequenceTooLong(payload.len()))?;
        let blob_len = CHUNK_HEADER_LENGTH + payload.len();
        let sector_count = blob_len.div_ceil(SECTOR_LENGTH);
        let sector_count = u8::try_from(sector_count).map_err(|_| {
            NbtError::Region(format!(
                "Chunk {} needs {} sectors, more than a header entry can describe",
                index, sector_count
            ))
        })?;

        let offset = FIRST_DATA_SECTOR + (self.data.len() / SECTOR_LENGTH) as u32;
        if offset > MAX_SECTOR_OFFSET {
            return Err(NbtError::Region(format!(
                "Sector offset {} exceeds the region file limit",
                offset
            )));
        }

        self.data.extend_from_slice(&length.to_be_bytes());
        self.data.push(compression.id());
        self.data.extend_from_slice(payload);
        let padded = self.data.len().div_ceil(SECTOR_LENGTH) * SECTOR_LENGTH;
        self.data.resize(padded, 0);

        let location = self.header.location_mut(index)?;
        location.offset = offset;
        location.sector_count = sector_count;
        location.timestamp = timestamp;
        debug!(chunk = index, offset, sector_count, "Inserted chunk");
        Ok(())
    }

    /// Write the header sectors followed by the chunk data
    pub fn write_to<W: Write>(&self, mut output: W) -> Result<()> {
        let (offsets, timestamps) = self.header.save_to_sectors();
        output.write_all(&offsets)?;
        output.write_all(&timestamps)?;
        output.write_all(&self.data)?;
        output.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(2 * SECTOR_LENGTH + self.data.len());
        self.write_to(&mut out)?;
        Ok(out)
    }
}
