//! Big-endian scanning of numeric values, arrays, and strings

use tracing::debug;

use crate::error::{NbtError, Result};

/// Fixed-width numeric types that can be decoded from and encoded to
/// big-endian bytes
pub trait BigEndian: Sized + Copy {
    /// Encoded width in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes
    fn from_be_slice(bytes: &[u8]) -> Self;

    /// Append the big-endian encoding to `out`
    fn extend_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_big_endian {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BigEndian for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn from_be_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(raw)
                }

                #[inline]
                fn extend_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_big_endian!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Scans big-endian binary data from a borrowed buffer
///
/// Every read is bounds-checked; a failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(NbtError::UnexpectedEof {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Read one big-endian value
    pub fn read<T: BigEndian>(&mut self) -> Result<T> {
        self.take(T::SIZE).map(T::from_be_slice)
    }

    /// Read `len` raw bytes as a string
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let start = self.pos;
        let bytes = self.take(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                debug!(offset = start, "Replacing invalid UTF-8 in string: {}", e);
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }

    /// Read a u16 length followed by that many string bytes
    pub fn read_prefixed_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read::<u16>()? as usize;
        self.read_string(len).inspect_err(|_| self.pos = start)
    }

    /// Read `len` consecutive big-endian values
    pub fn read_array<T: BigEndian>(&mut self, len: i32) -> Result<Vec<T>> {
        if len < 0 {
            return Err(NbtError::NegativeLength(len));
        }
        // Checked against the remaining input before anything is allocated
        let byte_len = (len as usize).saturating_mul(T::SIZE);
        let bytes = self.take(byte_len)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::from_be_slice).collect())
    }

    /// Read an i32 length followed by that many big-endian values
    pub fn read_prefixed_array<T: BigEndian>(&mut self) -> Result<Vec<T>> {
        let start = self.pos;
        let len = self.read::<i32>()?;
        self.read_array(len).inspect_err(|_| self.pos = start)
    }
}
