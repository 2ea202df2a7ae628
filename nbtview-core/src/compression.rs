//! Detection, decompression and compression of gzip and zlib streams

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::{Decompress, FlushDecompress, Status};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NbtError, Result};

const INFLATE_STEP: usize = 16 * 1024;

/// Compression applied around a binary NBT document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zlib,
}

/// True if `data` starts with a zlib or gzip header using DEFLATE
///
/// Inputs shorter than four bytes are never considered compressed.
pub fn has_compression_header(data: &[u8]) -> bool {
    detect(data) != Compression::None
}

/// Identify the compression of `data` from its first bytes
pub fn detect(data: &[u8]) -> Compression {
    if data.len() < 4 {
        return Compression::None;
    }
    // Every zlib header for DEFLATE with a 32K window (RFC 1950)
    if data[0] == 0x78 && matches!(data[1], 0x01 | 0x5e | 0x9c | 0xda) {
        return Compression::Zlib;
    }
    // gzip magic and the DEFLATE method byte (RFC 1952)
    if data[..3] == [0x1f, 0x8b, 0x08] {
        return Compression::Gzip;
    }
    Compression::None
}

/// Inflate a complete gzip or zlib stream
///
/// # Errors
///
/// [`NbtError::Decompression`] if the data has no recognised header, or the
/// stream is corrupt or ends early.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 4);
    let result = match detect(data) {
        Compression::Gzip => GzDecoder::new(data).read_to_end(&mut out),
        Compression::Zlib => ZlibDecoder::new(data).read_to_end(&mut out),
        Compression::None => {
            return Err(NbtError::Decompression(
                "no gzip or zlib header found".to_string(),
            ))
        }
    };
    result.map_err(|e| NbtError::Decompression(format!("likely corrupt or incomplete: {}", e)))?;
    debug!(compressed = data.len(), inflated = out.len(), "Decompressed data");
    Ok(out)
}

/// Deflate `data` using the given scheme; [`Compression::None`] copies it
pub fn compress(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let level = flate2::Compression::default();
    Ok(match compression {
        Compression::None => data.to_vec(),
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), level);
            encoder.write_all(data)?;
            encoder.finish()?
        }
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), level);
            encoder.write_all(data)?;
            encoder.finish()?
        }
    })
}

/// Outcome of inflating a stream spread across sectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InflationStatus {
    /// The end of the compressed stream was reached
    pub complete: bool,
    /// Some sector failed to inflate
    pub corrupt: bool,
    /// Index of the sector that failed
    pub corrupt_sector: Option<usize>,
}

/// Inflate a zlib stream whose bytes are split across consecutive sectors
///
/// Inflation stops at the end of the stream, so trailing padding in the last
/// sector is ignored. Whatever was inflated before a failure is returned along
/// with the status.
pub fn inflate_sectors(sectors: &[&[u8]]) -> (Vec<u8>, InflationStatus) {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::new();
    let mut status = InflationStatus::default();

    'sectors: for (index, sector) in sectors.iter().enumerate() {
        let mut input: &[u8] = sector;
        loop {
            out.reserve(INFLATE_STEP);
            let consumed_before = inflater.total_in();
            let result = inflater.decompress_vec(input, &mut out, FlushDecompress::None);
            let consumed = (inflater.total_in() - consumed_before) as usize;
            input = &input[consumed..];

            match result {
                Ok(Status::StreamEnd) => {
                    status.complete = true;
                    break 'sectors;
                }
                Ok(Status::Ok) | Ok(Status::BufError) => {
                    // Move on once this sector is used up and nothing is pending
                    if input.is_empty() && out.len() < out.capacity() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(sector = index, "Sector failed to inflate: {}", e);
                    status.corrupt = true;
                    status.corrupt_sector = Some(index);
                    break 'sectors;
                }
            }
        }
    }
    (out, status)
}
