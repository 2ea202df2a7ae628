//! Binary NBT decoding and encoding of whole documents
//!
//! A document is a single named tag: one type byte, a u16-prefixed name, and
//! the payload. Compound payloads are sequences of named tags terminated by an
//! End byte; list payloads carry an element type byte and an i32 count.

use std::io::Write;

use serde::Serialize;
use tracing::trace;

use crate::error::{NbtError, Result};
use crate::reader::BinaryReader;
use crate::types::{Compound, List, Tag, TagType};
use crate::writer::BinaryWriter;

/// Default limit on nested lists and compounds
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A root tag together with its name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTag {
    pub name: String,
    pub tag: Tag,
}

impl NamedTag {
    pub fn new(name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

/// Decodes binary NBT from a byte slice
#[derive(Debug)]
pub struct Decoder<'a> {
    reader: BinaryReader<'a>,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BinaryReader::new(data),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply lists and compounds may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Offset of the next unread byte
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Read the type byte, name, and payload of the next tag
    ///
    /// # Errors
    ///
    /// [`NbtError::UnexpectedEndTag`] if the next tag is End, plus any error
    /// from decoding the payload.
    pub fn decode_named(&mut self) -> Result<NamedTag> {
        let tag_type = self.read_type()?;
        if tag_type == TagType::End {
            return Err(NbtError::UnexpectedEndTag);
        }
        let name = self.reader.read_prefixed_string()?;
        let tag = self.decode_tree(tag_type)?;
        Ok(NamedTag { name, tag })
    }

    fn read_type(&mut self) -> Result<TagType> {
        TagType::try_from(self.reader.read::<u8>()?)
    }

    /// Decode one payload of `root_type`, however deeply it nests
    ///
    /// Open lists and compounds live on `stack` rather than the call stack,
    /// so nesting is bounded only by `max_depth`.
    fn decode_tree(&mut self, root_type: TagType) -> Result<Tag> {
        let mut stack = Vec::new();
        if let Some(tag) = self.begin_value(root_type, &mut stack)? {
            return Ok(tag);
        }

        while let Some(top) = stack.last_mut() {
            let step = match top {
                Frame::List { list, remaining } if *remaining > 0 => {
                    *remaining -= 1;
                    Step::Value(list.element_type())
                }
                Frame::List { .. } => Step::Close,
                Frame::Compound { pending_name, .. } => {
                    let tag_type = self.read_type()?;
                    if tag_type == TagType::End {
                        Step::Close
                    } else {
                        *pending_name = Some(self.reader.read_prefixed_string()?);
                        Step::Value(tag_type)
                    }
                }
            };

            let finished = match step {
                Step::Value(tag_type) => self.begin_value(tag_type, &mut stack)?,
                Step::Close => stack.pop().map(Frame::into_tag),
            };
            let Some(tag) = finished else { continue };
            match stack.last_mut() {
                None => return Ok(tag),
                Some(Frame::List { list, .. }) => list.push(tag)?,
                Some(Frame::Compound {
                    compound,
                    pending_name,
                }) => {
                    if let Some(name) = pending_name.take() {
                        compound.insert(name, tag);
                    }
                }
            }
        }
        // Only reachable if the root frame vanished without producing a tag
        Err(NbtError::UnexpectedEndTag)
    }

    /// Decode a scalar or array payload, or open a frame for a container
    fn begin_value(&mut self, tag_type: TagType, stack: &mut Vec<Frame>) -> Result<Option<Tag>> {
        let r = &mut self.reader;
        let tag = match tag_type {
            TagType::End => return Err(NbtError::UnexpectedEndTag),
            TagType::Byte => Tag::Byte(r.read()?),
            TagType::Short => Tag::Short(r.read()?),
            TagType::Int => Tag::Int(r.read()?),
            TagType::Long => Tag::Long(r.read()?),
            TagType::Float => Tag::Float(r.read()?),
            TagType::Double => Tag::Double(r.read()?),
            TagType::ByteArray => Tag::ByteArray(r.read_prefixed_array()?),
            TagType::String => Tag::String(r.read_prefixed_string()?),
            TagType::IntArray => Tag::IntArray(r.read_prefixed_array()?),
            TagType::LongArray => Tag::LongArray(r.read_prefixed_array()?),
            TagType::List => {
                self.check_depth(stack.len() + 1)?;
                let list = self.begin_list()?;
                stack.push(list);
                return Ok(None);
            }
            TagType::Compound => {
                self.check_depth(stack.len() + 1)?;
                stack.push(Frame::Compound {
                    compound: Compound::new(),
                    pending_name: None,
                });
                return Ok(None);
            }
        };
        Ok(Some(tag))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(NbtError::DepthLimitExceeded(self.max_depth));
        }
        Ok(())
    }

    fn begin_list(&mut self) -> Result<Frame> {
        let element_type = self.read_type()?;
        let len = self.reader.read::<i32>()?;
        if len < 0 {
            return Err(NbtError::NegativeLength(len));
        }
        if element_type == TagType::End && len > 0 {
            return Err(NbtError::UnexpectedEndTag);
        }
        // Every element takes at least one byte, so this bounds the allocation
        let capacity = (len as usize).min(self.reader.remaining());
        Ok(Frame::List {
            list: List::with_capacity(element_type, capacity),
            remaining: len as usize,
        })
    }
}

/// A list or compound whose payload is still being read
#[derive(Debug)]
enum Frame {
    List { list: List, remaining: usize },
    Compound {
        compound: Compound,
        /// Name of the entry currently being decoded
        pending_name: Option<String>,
    },
}

impl Frame {
    fn into_tag(self) -> Tag {
        match self {
            Frame::List { list, .. } => Tag::List(list),
            Frame::Compound { compound, .. } => Tag::Compound(compound),
        }
    }
}

enum Step {
    Value(TagType),
    Close,
}

/// Decode a document from uncompressed binary NBT
///
/// Bytes after the root tag are ignored.
pub fn decode(data: &[u8]) -> Result<NamedTag> {
    decode_with_max_depth(data, DEFAULT_MAX_DEPTH)
}

/// Decode a document with an explicit nesting limit
pub fn decode_with_max_depth(data: &[u8], max_depth: usize) -> Result<NamedTag> {
    let mut decoder = Decoder::new(data).with_max_depth(max_depth);
    let named = decoder.decode_named()?;
    let trailing = data.len() - decoder.position();
    if trailing > 0 {
        trace!(trailing, "Ignoring bytes after root tag");
    }
    Ok(named)
}

/// Write a document as uncompressed binary NBT
pub fn encode_named<W: Write>(named: &NamedTag, output: W) -> Result<()> {
    let mut writer = BinaryWriter::new(output);
    writer.write(named.tag.tag_type().id())?;
    writer.write_string(&named.name)?;
    encode_payload(&named.tag, &mut writer)
}

/// Encode a document into a new buffer
pub fn to_bytes(named: &NamedTag) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_named(named, &mut out)?;
    Ok(out)
}

fn encode_payload<W: Write>(tag: &Tag, w: &mut BinaryWriter<W>) -> Result<()> {
    match tag {
        Tag::Byte(v) => w.write(*v),
        Tag::Short(v) => w.write(*v),
        Tag::Int(v) => w.write(*v),
        Tag::Long(v) => w.write(*v),
        Tag::Float(v) => w.write(*v),
        Tag::Double(v) => w.write(*v),
        Tag::ByteArray(v) => w.write_array(v),
        Tag::String(v) => w.write_string(v),
        Tag::List(list) => {
            w.write(list.element_type().id())?;
            let len = i32::try_from(list.len()).map_err(|_| NbtError::SequenceTooLong(list.len()))?;
            w.write(len)?;
            for item in list {
                encode_payload(item, w)?;
            }
            Ok(())
        }
        Tag::Compound(compound) => {
            for (name, item) in compound {
                w.write(item.tag_type().id())?;
                w.write_string(name)?;
                encode_payload(item, w)?;
            }
            w.write(TagType::End.id())
        }
        Tag::IntArray(v) => w.write_array(v),
        Tag::LongArray(v) => w.write_array(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unnamed_empty_compound() {
        let data = [0x0a, 0x00, 0x00, 0x00];
        let named = decode(&data).unwrap();
        assert_eq!(named.name, "");
        let cmpd = named.tag.as_compound().unwrap();
        assert!(cmpd.is_empty());
    }

    #[test]
    fn test_root_string_tag() {
        let data = [
            0x08, 0x00, 0x03, b'T', b'a', b'g', 0x00, 0x05, b'H', b'e', b'l', b'l', b'o',
        ];
        let named = decode(&data).unwrap();
        assert_eq!(named.name, "Tag");
        assert_eq!(named.tag.as_str(), Some("Hello"));
    }

    #[test]
    fn test_compound_with_string_entry() {
        let data = [
            0x0a, 0x00, 0x00, 0x08, 0x00, 0x03, b'f', b'o', b'o', 0x00, 0x03, b'b', b'a', b'r',
            0x00,
        ];
        let named = decode(&data).unwrap();
        let cmpd = named.tag.as_compound().unwrap();
        assert_eq!(cmpd.len(), 1);
        assert_eq!(cmpd.get_str("foo"), Some("bar"));
    }

    #[test]
    fn test_list_of_ints() {
        let data = [
            0x09, 0x00, 0x01, b'l', 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x05, 0xff,
            0xff, 0xff, 0xff,
        ];
        let named = decode(&data).unwrap();
        let list = named.tag.as_list().unwrap();
        assert_eq!(list.element_type(), TagType::Int);
        assert_eq!(list.get(0), Some(&Tag::Int(5)));
        assert_eq!(list.get(1), Some(&Tag::Int(-1)));
    }

    #[test]
    fn test_empty_list_of_end_is_accepted() {
        let data = [0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let named = decode(&data).unwrap();
        let list = named.tag.as_list().unwrap();
        assert!(list.is_empty());
        assert_eq!(list.element_type(), TagType::End);
    }

    #[test]
    fn test_nonempty_list_of_end_is_rejected() {
        let data = [0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(decode(&data), Err(NbtError::UnexpectedEndTag)));
    }

    #[test]
    fn test_negative_list_length() {
        let data = [0x09, 0x00, 0x00, 0x01, 0xff, 0xff, 0xff, 0xfe];
        assert!(matches!(decode(&data), Err(NbtError::NegativeLength(-2))));
    }

    #[test]
    fn test_root_end_tag() {
        assert!(matches!(decode(&[0x00]), Err(NbtError::UnexpectedEndTag)));
    }

    #[test]
    fn test_unknown_tag_type() {
        let data = [0x0a, 0x00, 0x00, 0x63, 0x00, 0x00];
        assert!(matches!(decode(&data), Err(NbtError::UnknownTagType(0x63))));
    }

    #[test]
    fn test_truncated_input() {
        // Compound missing its End byte
        let data = [0x0a, 0x00, 0x00, 0x01, 0x00, 0x01, b'b', 0x05];
        assert!(matches!(
            decode(&data),
            Err(NbtError::UnexpectedEof { .. })
        ));
        assert!(matches!(decode(&[]), Err(NbtError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let data = [
            0x0a, 0x00, 0x00, 0x01, 0x00, 0x01, b'a', 0x01, 0x01, 0x00, 0x01, b'a', 0x02, 0x00,
        ];
        let named = decode(&data).unwrap();
        assert_eq!(named.tag.as_compound().unwrap().get_byte("a"), Some(2));
    }

    #[test]
    fn test_depth_limit() {
        // Ten nested compounds, each opening the next under the name ""
        let mut data = vec![0x0a, 0x00, 0x00];
        for _ in 0..10 {
            data.extend_from_slice(&[0x0a, 0x00, 0x00]);
        }
        data.extend(std::iter::repeat(0x00).take(11));

        assert!(decode_with_max_depth(&data, 11).is_ok());
        assert!(matches!(
            decode_with_max_depth(&data, 5),
            Err(NbtError::DepthLimitExceeded(5))
        ));
    }

    /// `levels` nested compounds, each holding the next under the name ""
    fn nested_compounds(levels: usize) -> Vec<u8> {
        let mut data = vec![0x0a, 0x00, 0x00];
        for _ in 1..levels {
            data.extend_from_slice(&[0x0a, 0x00, 0x00]);
        }
        data.extend(std::iter::repeat(0x00).take(levels));
        data
    }

    /// `levels` nested lists; each holds one list, the innermost is empty
    fn nested_lists(levels: usize) -> Vec<u8> {
        let mut data = vec![0x09, 0x00, 0x00];
        for _ in 1..levels {
            data.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        }
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00]);
        data
    }

    #[test]
    fn test_depth_limit_on_nested_lists() {
        let data = nested_lists(11);
        let named = decode_with_max_depth(&data, 11).unwrap();
        let mut tag = &named.tag;
        let mut levels = 1;
        while let Some(inner) = tag.as_list().and_then(|l| l.get(0)) {
            tag = inner;
            levels += 1;
        }
        assert_eq!(levels, 11);

        assert!(matches!(
            decode_with_max_depth(&data, 10),
            Err(NbtError::DepthLimitExceeded(10))
        ));
    }

    #[test]
    fn test_depth_limit_on_mixed_nesting() {
        // Compound { "l": List of Compound [ {} ] }
        let data = [
            0x0a, 0x00, 0x00, 0x09, 0x00, 0x01, b'l', 0x0a, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
        ];
        let named = decode_with_max_depth(&data, 3).unwrap();
        assert_eq!(named.tag.to_string(), "{l:[{}]}");
        assert!(matches!(
            decode_with_max_depth(&data, 2),
            Err(NbtError::DepthLimitExceeded(2))
        ));
    }

    #[test]
    fn test_default_depth_fits_small_thread_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(|| {
                let compounds = nested_compounds(DEFAULT_MAX_DEPTH);
                assert!(decode(&compounds).is_ok());
                let lists = nested_lists(DEFAULT_MAX_DEPTH);
                assert!(decode(&lists).is_ok());

                assert!(matches!(
                    decode(&nested_compounds(DEFAULT_MAX_DEPTH + 1)),
                    Err(NbtError::DepthLimitExceeded(DEFAULT_MAX_DEPTH))
                ));
                // Far past the limit, decoding stops at the limit
                assert!(matches!(
                    decode(&nested_lists(100_000)),
                    Err(NbtError::DepthLimitExceeded(DEFAULT_MAX_DEPTH))
                ));
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_deep_nesting_with_raised_limit() {
        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(|| {
                let data = nested_lists(50_000);
                let named = decode_with_max_depth(&data, 50_000).unwrap();
                assert_eq!(named.tag.as_list().map(List::len), Some(1));
                // Dropping a tree this deep recurses, so unwind it by hand
                let mut tag = named.tag;
                while let Tag::List(mut list) = tag {
                    tag = match list.get_mut(0) {
                        Some(inner) => std::mem::replace(inner, Tag::Byte(0)),
                        None => break,
                    };
                }
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_encode_byte_tag() {
        let unnamed = to_bytes(&NamedTag::new("", 0x17i8)).unwrap();
        assert_eq!(unnamed, vec![0x01, 0x00, 0x00, 0x17]);

        let named = to_bytes(&NamedTag::new("MyByte", 0x17i8)).unwrap();
        assert_eq!(
            named,
            vec![0x01, 0x00, 0x06, b'M', b'y', b'B', b'y', b't', b'e', 0x17]
        );
    }

    #[test]
    fn test_encode_string_and_empty_compound() {
        let bytes = to_bytes(&NamedTag::new("Tag", "Hello")).unwrap();
        assert_eq!(
            bytes,
            vec![0x08, 0x00, 0x03, b'T', b'a', b'g', 0x00, 0x05, b'H', b'e', b'l', b'l', b'o']
        );

        let bytes = to_bytes(&NamedTag::new("", Compound::new())).unwrap();
        assert_eq!(bytes, vec![0x0a, 0x00, 0x00, 0x00]);
    }

    fn arb_tag() -> impl Strategy<Value = Tag> {
        let leaf = prop_oneof![
            any::<i8>().prop_map(Tag::Byte),
            any::<i16>().prop_map(Tag::Short),
            any::<i32>().prop_map(Tag::Int),
            any::<i64>().prop_map(Tag::Long),
            any::<f32>()
                .prop_filter("NaN never compares equal", |v| !v.is_nan())
                .prop_map(Tag::Float),
            any::<f64>()
                .prop_filter("NaN never compares equal", |v| !v.is_nan())
                .prop_map(Tag::Double),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Tag::String),
            prop::collection::vec(any::<i8>(), 0..8).prop_map(Tag::ByteArray),
            prop::collection::vec(any::<i32>(), 0..8).prop_map(Tag::IntArray),
            prop::collection::vec(any::<i64>(), 0..8).prop_map(Tag::LongArray),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 0..6)
                    .prop_map(|entries| Tag::Compound(entries.into_iter().collect())),
                prop::collection::vec(inner, 0..6).prop_map(|items| {
                    // Keep only elements matching the first one's type
                    let first = items.first().map(Tag::tag_type);
                    let same: Vec<Tag> = items
                        .into_iter()
                        .filter(|t| Some(t.tag_type()) == first)
                        .collect();
                    Tag::List(List::from_tags(same).expect("homogeneous by construction"))
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_encoded_documents_decode_to_the_same_tree(
            name in "[a-zA-Z]{0,10}",
            tag in arb_tag(),
        ) {
            let named = NamedTag::new(name, tag);
            let bytes = to_bytes(&named).unwrap();
            let decoded = decode(&bytes).unwrap();
            prop_assert_eq!(decoded, named);
        }

        #[test]
        fn test_truncation_never_panics(tag in arb_tag(), cut in 0usize..64) {
            let bytes = to_bytes(&NamedTag::new("root", tag)).unwrap();
            let end = bytes.len().saturating_sub(cut);
            let _ = decode(&bytes[..end]);
        }
    }
}
