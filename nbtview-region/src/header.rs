//! Region header layout and chunk coordinates
//!
//! A region file starts with two 4096-byte sectors. The first holds one
//! 4-byte location entry per chunk (a 3-byte big-endian sector offset and a
//! 1-byte sector count); the second holds one 4-byte big-endian timestamp per
//! chunk.

use nbtview_core::{NbtError, Result};
use serde::Serialize;

/// Chunk width in blocks
pub const CHUNK_WIDTH: i32 = 16;

/// Region width in chunks
pub const REGION_WIDTH: i32 = 32;

/// Number of chunks in a region
pub const CHUNK_COUNT: usize = (REGION_WIDTH * REGION_WIDTH) as usize;

/// Length of a region file sector in bytes
pub const SECTOR_LENGTH: usize = 4096;

/// Largest sector offset a location entry can hold
pub const MAX_SECTOR_OFFSET: u32 = 0x00ff_ffff;

/// Where a chunk is stored and when it was last written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChunkLocation {
    /// Index of the first sector holding the chunk
    pub offset: u32,
    /// Number of sectors holding the chunk; zero when absent
    pub sector_count: u8,
    /// Seconds since the Unix epoch
    pub timestamp: u32,
}

impl ChunkLocation {
    pub fn is_present(&self) -> bool {
        self.sector_count > 0
    }
}

/// Metadata for all chunks of a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionHeader {
    chunks: Vec<ChunkLocation>,
}

impl Default for RegionHeader {
    fn default() -> Self {
        Self {
            chunks: vec![ChunkLocation::default(); CHUNK_COUNT],
        }
    }
}

impl RegionHeader {
    /// Parse the two header sectors of a region file
    ///
    /// # Errors
    ///
    /// [`NbtError::InvalidSectorLength`] unless both sectors are exactly
    /// [`SECTOR_LENGTH`] bytes.
    pub fn load_from_sectors(offsets: &[u8], timestamps: &[u8]) -> Result<Self> {
        check_sector(offsets)?;
        check_sector(timestamps)?;

        let chunks = offsets
            .chunks_exact(4)
            .zip(timestamps.chunks_exact(4))
            .map(|(loc, time)| ChunkLocation {
                offset: u32::from_be_bytes([0, loc[0], loc[1], loc[2]]),
                sector_count: loc[3],
                timestamp: u32::from_be_bytes([time[0], time[1], time[2], time[3]]),
            })
            .collect();
        Ok(Self { chunks })
    }

    /// Encode the header back into its two sectors `(offsets, timestamps)`
    pub fn save_to_sectors(&self) -> (Vec<u8>, Vec<u8>) {
        let mut offsets = Vec::with_capacity(SECTOR_LENGTH);
        let mut timestamps = Vec::with_capacity(SECTOR_LENGTH);
        for chunk in &self.chunks {
            let [_, hi, mid, lo] = (chunk.offset & MAX_SECTOR_OFFSET).to_be_bytes();
            offsets.extend_from_slice(&[hi, mid, lo, chunk.sector_count]);
            timestamps.extend_from_slice(&chunk.timestamp.to_be_bytes());
        }
        (offsets, timestamps)
    }

    /// Location entry of chunk `index`
    pub fn location(&self, index: usize) -> Result<&ChunkLocation> {
        self.chunks
            .get(index)
            .ok_or(NbtError::ChunkIndexOutOfRange(index))
    }

    pub fn location_mut(&mut self, index: usize) -> Result<&mut ChunkLocation> {
        self.chunks
            .get_mut(index)
            .ok_or(NbtError::ChunkIndexOutOfRange(index))
    }

    /// Indices of chunks that have data, in ascending order
    pub fn present_chunks(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.is_present())
            .map(|(index, _)| index)
            .collect()
    }
}

fn check_sector(sector: &[u8]) -> Result<()> {
    if sector.len() != SECTOR_LENGTH {
        return Err(NbtError::InvalidSectorLength(sector.len()));
    }
    Ok(())
}

/// Header index of a chunk from its coordinates
///
/// Coordinates are reduced modulo the region width, so both region-local and
/// world chunk coordinates are accepted.
pub fn chunk_index(chunk_x: i32, chunk_z: i32) -> usize {
    ((chunk_z & 0x1f) * REGION_WIDTH + (chunk_x & 0x1f)) as usize
}

/// Region-local `(x, z)` coordinates of the chunk at `index`
pub fn local_coords(index: usize) -> (i32, i32) {
    ((index & 0x1f) as i32, ((index >> 5) & 0x1f) as i32)
}

/// Coordinates of the region containing a world chunk
pub fn region_of_chunk(chunk_x: i32, chunk_z: i32) -> (i32, i32) {
    (chunk_x >> 5, chunk_z >> 5)
}
