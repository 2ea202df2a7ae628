//! nbtview core library
//!
//! Reading, writing and inspecting NBT (Named Binary Tag) data, the binary
//! format Minecraft uses for worlds, player data and chunk storage.
//!
//! ```
//! use nbtview_core::{codec, Compound, NamedTag};
//!
//! let mut root = Compound::new();
//! root.insert("name", "Bananrama");
//! let bytes = codec::to_bytes(&NamedTag::new("hello world", root)).unwrap();
//!
//! let doc = nbtview_core::read_from_bytes(&bytes).unwrap();
//! assert_eq!(doc.name, "hello world");
//! assert_eq!(doc.tag.to_string(), "{name:\"Bananrama\"}");
//! ```

pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod io;
pub mod reader;
pub mod search;
pub mod snbt;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use codec::{decode, encode_named, to_bytes, Decoder, NamedTag, DEFAULT_MAX_DEPTH};
pub use compression::{has_compression_header, Compression, InflationStatus};
pub use config::default_config_path;
pub use error::*;
pub use io::{read_from_bytes, read_from_file, read_from_reader, write_to_bytes, write_to_file};
pub use search::{fast_find_int, fast_find_long, fast_find_named_tag};
pub use snbt::{to_snbt, to_snbt_pretty};
pub use types::*;
