//! Locating named tags in binary NBT without decoding it
//!
//! These scans look for the raw `[type, name length, name]` prefix of a tag.
//! They are much faster than a full decode, but the pattern can also occur by
//! chance inside another tag's payload, so a hit is not a guarantee.

use crate::reader::BinaryReader;
use crate::types::TagType;

/// Offset of the payload of the first tag named `name` with type `tag_type`
///
/// A match must leave at least one payload byte in `data`.
pub fn fast_find_named_tag(data: &[u8], tag_type: TagType, name: &str) -> Option<usize> {
    let name_len = u16::try_from(name.len()).ok()?;
    let mut pattern = Vec::with_capacity(name.len() + 3);
    pattern.push(tag_type.id());
    pattern.extend_from_slice(&name_len.to_be_bytes());
    pattern.extend_from_slice(name.as_bytes());

    data.windows(pattern.len())
        .position(|window| window == pattern.as_slice())
        .map(|start| start + pattern.len())
        .filter(|&payload| payload < data.len())
}

/// Find an Int tag by name and read its value
///
/// Returns the payload offset together with the value.
pub fn fast_find_int(data: &[u8], name: &str) -> Option<(usize, i32)> {
    let offset = fast_find_named_tag(data, TagType::Int, name)?;
    let mut reader = BinaryReader::new(&data[offset..]);
    reader.read::<i32>().ok().map(|value| (offset, value))
}

/// Find a Long tag by name and read its value
pub fn fast_find_long(data: &[u8], name: &str) -> Option<(usize, i64)> {
    let offset = fast_find_named_tag(data, TagType::Long, name)?;
    let mut reader = BinaryReader::new(&data[offset..]);
    reader.read::<i64>().ok().map(|value| (offset, value))
}
