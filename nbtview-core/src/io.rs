//! Reading and writing NBT documents from bytes, streams and files

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::codec::{self, NamedTag};
use crate::compression::{self, Compression};
use crate::error::Result;

/// Decode a document, inflating it first if it carries a gzip or zlib header
pub fn read_from_bytes(data: &[u8]) -> Result<NamedTag> {
    read_from_bytes_with_max_depth(data, codec::DEFAULT_MAX_DEPTH)
}

/// [`read_from_bytes`] with an explicit nesting limit
pub fn read_from_bytes_with_max_depth(data: &[u8], max_depth: usize) -> Result<NamedTag> {
    if compression::has_compression_header(data) {
        let inflated = compression::decompress(data)?;
        codec::decode_with_max_depth(&inflated, max_depth)
    } else {
        codec::decode_with_max_depth(data, max_depth)
    }
}

/// Read a stream to its end and decode it
pub fn read_from_reader<R: Read>(mut reader: R) -> Result<NamedTag> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    read_from_bytes(&data)
}

/// Read and decode a file
///
/// # Errors
///
/// [`crate::NbtError::Io`] if the file cannot be read, plus any decoding error.
pub fn read_from_file(path: impl AsRef<Path>) -> Result<NamedTag> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), "Read NBT file");
    read_from_bytes(&data)
}

/// Encode a document, then compress it with `compression`
pub fn write_to_bytes(named: &NamedTag, compression: Compression) -> Result<Vec<u8>> {
    let raw = codec::to_bytes(named)?;
    compression::compress(&raw, compression)
}

/// Encode a document into a file, replacing any existing content
pub fn write_to_file(
    path: impl AsRef<Path>,
    named: &NamedTag,
    compression: Compression,
) -> Result<()> {
    let path = path.as_ref();
    let data = write_to_bytes(named, compression)?;
    fs::write(path, &data)?;
    debug!(path = %path.display(), bytes = data.len(), ?compression, "Wrote NBT file");
    Ok(())
}
