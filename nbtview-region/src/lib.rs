//! nbtview-region
//!
//! Access to region (`.mca`) files, which pack the NBT documents of a 32x32
//! grid of chunks into 4096-byte sectors behind a two-sector header.
//!
//! Public API:
//! - `header::RegionHeader`: per-chunk sector locations and timestamps
//! - `file::RegionFile`: reads and decodes chunks from any `Read + Seek` source
//! - `writer::RegionWriter`: assembles new region files
//! - coordinate helpers `chunk_index`, `local_coords` and `region_of_chunk`

pub mod file;
pub mod header;
pub mod writer;

pub use file::{ChunkCompression, ChunkData, RegionFile};
pub use header::{
    chunk_index, local_coords, region_of_chunk, ChunkLocation, RegionHeader, CHUNK_COUNT,
    CHUNK_WIDTH, REGION_WIDTH, SECTOR_LENGTH,
};
pub use writer::RegionWriter;

