//! Big-endian encoding of numeric values, arrays, and strings

use std::io::Write;

use crate::error::{NbtError, Result};
use crate::reader::BigEndian;

/// Writes big-endian binary data to any [`Write`] sink
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    output: W,
    scratch: Vec<u8>,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            scratch: Vec::with_capacity(8),
        }
    }

    /// Recover the underlying sink
    pub fn into_inner(self) -> W {
        self.output
    }

    /// Write one value in big-endian byte order
    pub fn write<T: BigEndian>(&mut self, value: T) -> Result<()> {
        self.scratch.clear();
        value.extend_be(&mut self.scratch);
        self.output.write_all(&self.scratch)?;
        Ok(())
    }

    /// Write a u16 length prefix followed by the UTF-8 bytes of `s`
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| NbtError::StringTooLong(s.len()))?;
        self.write(len)?;
        self.output.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Write an i32 length prefix followed by each element
    pub fn write_array<T: BigEndian>(&mut self, values: &[T]) -> Result<()> {
        let len =
            i32::try_from(values.len()).map_err(|_| NbtError::SequenceTooLong(values.len()))?;
        self.write(len)?;
        self.scratch.clear();
        for &value in values {
            value.extend_be(&mut self.scratch);
        }
        self.output.write_all(&self.scratch)?;
        Ok(())
    }
}
