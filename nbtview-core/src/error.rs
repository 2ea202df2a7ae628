//! Error types for nbtview

use thiserror::Error;

/// Core error type for NBT decoding, encoding, and container access
#[derive(Error, Debug)]
pub enum NbtError {
    /// Input ended before a value could be read
    #[error("Unexpected end of input at byte {offset} (needed {needed} more)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// A length prefix was negative
    #[error("Negative length encountered: {0}")]
    NegativeLength(i32),

    /// A type byte outside the known range
    #[error("Unknown tag type: {0}")]
    UnknownTagType(u8),

    /// An End tag where a payload was required
    #[error("Unexpected End tag")]
    UnexpectedEndTag,

    /// Nested lists/compounds went deeper than allowed
    #[error("Nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),

    /// A tag of the wrong type was added to a list
    #[error("Type mismatch when appending {found} {value} to {expected} {target}")]
    TypeMismatch {
        expected: String,
        target: String,
        found: String,
        value: String,
    },

    /// Size requested from a scalar tag
    #[error("Called size() on a non-container tag ({0})")]
    NotAContainer(String),

    /// String too long for the u16 length prefix
    #[error("String of {0} bytes exceeds the 65535 byte limit")]
    StringTooLong(usize),

    /// Array or list too long for the i32 length prefix
    #[error("Sequence of {0} elements exceeds the i32 length limit")]
    SequenceTooLong(usize),

    /// Corrupt or incomplete compressed data
    #[error("Could not decompress data: {0}")]
    Decompression(String),

    /// Region file structure errors
    #[error("Region error: {0}")]
    Region(String),

    /// Header sector of the wrong size
    #[error("Improper sector length: {0} (expected 4096)")]
    InvalidSectorLength(usize),

    /// Chunk index outside the region
    #[error("Chunk index out of range: {0} (must be 0-1023)")]
    ChunkIndexOutOfRange(usize),

    /// Chunk compression scheme that is not handled
    #[error("Unsupported chunk compression scheme: {0}")]
    UnsupportedCompression(u8),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (JSON/YAML export)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for nbtview operations
pub type Result<T> = std::result::Result<T, NbtError>;

impl From<serde_json::Error> for NbtError {
    fn from(err: serde_json::Error) -> Self {
        NbtError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: NbtError = json_err.into();

        match err {
            NbtError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NbtError = io_err.into();

        match err {
            NbtError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = NbtError::UnexpectedEof {
            offset: 12,
            needed: 4,
        };
        assert_eq!(
            format!("{}", err),
            "Unexpected end of input at byte 12 (needed 4 more)"
        );

        let err = NbtError::UnknownTagType(99);
        assert_eq!(format!("{}", err), "Unknown tag type: 99");

        let err = NbtError::ChunkIndexOutOfRange(1024);
        assert_eq!(
            format!("{}", err),
            "Chunk index out of range: 1024 (must be 0-1023)"
        );

        let err = NbtError::TypeMismatch {
            expected: "List of Int".to_string(),
            target: "[1,2]".to_string(),
            found: "Byte".to_string(),
            value: "3b".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Type mismatch when appending Byte 3b to List of Int [1,2]"
        );
    }
}
