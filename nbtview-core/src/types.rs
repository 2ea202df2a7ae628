//! Core tag types: [`TagType`], [`Tag`], [`List`] and [`Compound`]

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NbtError, Result};

/// One-byte encoding of the data type of an NBT tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum TagType {
    /// Marks the end of a Compound payload
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagType {
    /// Wire value of this type code
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name as used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            TagType::End => "End",
            TagType::Byte => "Byte",
            TagType::Short => "Short",
            TagType::Int => "Int",
            TagType::Long => "Long",
            TagType::Float => "Float",
            TagType::Double => "Double",
            TagType::ByteArray => "Byte_Array",
            TagType::String => "String",
            TagType::List => "List",
            TagType::Compound => "Compound",
            TagType::IntArray => "Int_Array",
            TagType::LongArray => "Long_Array",
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = NbtError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }
}

impl std::str::FromStr for TagType {
    type Err = NbtError;

    /// Parse a type name, case-insensitively, with or without underscores
    ///
    /// ```
    /// use std::str::FromStr;
    /// use nbtview_core::TagType;
    ///
    /// assert_eq!(TagType::from_str("int").unwrap(), TagType::Int);
    /// assert_eq!(TagType::from_str("Long_Array").unwrap(), TagType::LongArray);
    /// assert!(TagType::from_str("widget").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace(['_', '-'], "");
        Ok(match normalized.as_str() {
            "end" => TagType::End,
            "byte" => TagType::Byte,
            "short" => TagType::Short,
            "int" => TagType::Int,
            "long" => TagType::Long,
            "float" => TagType::Float,
            "double" => TagType::Double,
            "bytearray" => TagType::ByteArray,
            "string" => TagType::String,
            "list" => TagType::List,
            "compound" => TagType::Compound,
            "intarray" => TagType::IntArray,
            "longarray" => TagType::LongArray,
            _ => {
                return Err(NbtError::Serialization(format!(
                    "Unknown tag type name: '{}'",
                    s
                )))
            }
        })
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single NBT value
///
/// End only exists on the wire and has no variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Type code of this tag's payload
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::String(_) => TagType::String,
            Tag::List(_) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
        }
    }

    /// Descriptive type name; lists include their element type ("List of Int")
    pub fn type_name(&self) -> String {
        match self {
            Tag::List(list) => list.type_name(),
            other => other.tag_type().name().to_string(),
        }
    }

    /// Number of elements in a container tag (arrays, String, List, Compound)
    ///
    /// # Errors
    ///
    /// Returns [`NbtError::NotAContainer`] for numeric tags.
    pub fn len(&self) -> Result<usize> {
        match self {
            Tag::ByteArray(v) => Ok(v.len()),
            Tag::String(s) => Ok(s.len()),
            Tag::List(l) => Ok(l.len()),
            Tag::Compound(c) => Ok(c.len()),
            Tag::IntArray(v) => Ok(v.len()),
            Tag::LongArray(v) => Ok(v.len()),
            other => Err(NbtError::NotAContainer(other.type_name())),
        }
    }

    /// Whether a container tag is empty
    ///
    /// # Errors
    ///
    /// Returns [`NbtError::NotAContainer`] for numeric tags.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Tag::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            Tag::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Tag::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Tag::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Tag::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            Tag::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Tag::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Tag::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Tag::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Tag::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(v) => Some(v),
            _ => None,
        }
    }

    /// Resolve a `/`-separated path below this tag
    ///
    /// Segments name compound entries; numeric segments index into lists.
    /// An empty path resolves to the tag itself.
    pub fn lookup(&self, path: &str) -> Option<&Tag> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| match current {
                Tag::Compound(c) => c.get(segment),
                Tag::List(l) => segment.parse::<usize>().ok().and_then(|i| l.get(i)),
                _ => None,
            })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::snbt::to_snbt(self))
    }
}

macro_rules! impl_from_payload {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Tag {
                fn from(value: $ty) -> Self {
                    Tag::$variant(value)
                }
            }
        )*
    };
}

impl_from_payload! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    List => List,
    Compound => Compound,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Tag::Byte(v) => serializer.serialize_i8(*v),
            Tag::Short(v) => serializer.serialize_i16(*v),
            Tag::Int(v) => serializer.serialize_i32(*v),
            Tag::Long(v) => serializer.serialize_i64(*v),
            Tag::Float(v) => serializer.serialize_f32(*v),
            Tag::Double(v) => serializer.serialize_f64(*v),
            Tag::ByteArray(v) => v.serialize(serializer),
            Tag::String(v) => serializer.serialize_str(v),
            Tag::List(v) => v.serialize(serializer),
            Tag::Compound(v) => v.serialize(serializer),
            Tag::IntArray(v) => v.serialize(serializer),
            Tag::LongArray(v) => v.serialize(serializer),
        }
    }
}

/// Homogeneous sequence of tags
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    element_type: TagType,
    items: Vec<Tag>,
}

impl List {
    /// Create an empty list holding elements of `element_type`
    pub fn new(element_type: TagType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Create an empty list with room for `capacity` elements
    pub fn with_capacity(element_type: TagType, capacity: usize) -> Self {
        Self {
            element_type,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Build a list from tags, taking the element type from the first one
    ///
    /// An empty iterator gives an empty list of End.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Result<Self> {
        let mut iter = tags.into_iter().peekable();
        let element_type = iter
            .peek()
            .map(Tag::tag_type)
            .unwrap_or(TagType::End);
        let mut list = List::new(element_type);
        for tag in iter {
            list.push(tag)?;
        }
        Ok(list)
    }

    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tag> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    /// Append a tag, enforcing the list's element type
    ///
    /// An empty End-typed list adopts the type of its first element.
    pub fn push(&mut self, tag: Tag) -> Result<()> {
        if self.items.is_empty() && self.element_type == TagType::End {
            self.element_type = tag.tag_type();
        }
        if tag.tag_type() != self.element_type {
            return Err(NbtError::TypeMismatch {
                expected: self.type_name(),
                target: crate::snbt::to_snbt_list(self),
                found: tag.type_name(),
                value: crate::snbt::to_snbt(&tag),
            });
        }
        self.items.push(tag);
        Ok(())
    }

    /// "List of <element type>"
    pub fn type_name(&self) -> String {
        format!("List of {}", self.element_type)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// Map from names to tags, iterated in ascending name order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    entries: BTreeMap<String, Tag>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        self.entries.insert(name.into(), tag.into())
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.entries.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        self.entries.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True if `name` is present and holds a tag of `tag_type`
    pub fn contains_typed(&self, name: &str, tag_type: TagType) -> bool {
        self.entries
            .get(name)
            .is_some_and(|tag| tag.tag_type() == tag_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Tag> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get_byte(&self, name: &str) -> Option<i8> {
        self.get(name).and_then(Tag::as_byte)
    }

    pub fn get_short(&self, name: &str) -> Option<i16> {
        self.get(name).and_then(Tag::as_short)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Tag::as_int)
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Tag::as_long)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(Tag::as_float)
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Tag::as_double)
    }

    pub fn get_byte_array(&self, name: &str) -> Option<&[i8]> {
        self.get(name).and_then(Tag::as_byte_array)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Tag::as_str)
    }

    pub fn get_list(&self, name: &str) -> Option<&List> {
        self.get(name).and_then(Tag::as_list)
    }

    pub fn get_compound(&self, name: &str) -> Option<&Compound> {
        self.get(name).and_then(Tag::as_compound)
    }

    pub fn get_compound_mut(&mut self, name: &str) -> Option<&mut Compound> {
        self.get_mut(name).and_then(Tag::as_compound_mut)
    }

    pub fn get_int_array(&self, name: &str) -> Option<&[i32]> {
        self.get(name).and_then(Tag::as_int_array)
    }

    pub fn get_long_array(&self, name: &str) -> Option<&[i64]> {
        self.get(name).and_then(Tag::as_long_array)
    }

    /// Resolve a `/`-separated path starting at this compound
    ///
    /// ```
    /// use nbtview_core::{Compound, Tag};
    ///
    /// let mut level = Compound::new();
    /// level.insert("xPos", 3i32);
    /// let mut root = Compound::new();
    /// root.insert("Level", level);
    ///
    /// assert_eq!(root.lookup("Level/xPos"), Some(&Tag::Int(3)));
    /// assert_eq!(root.lookup("Level/zPos"), None);
    /// ```
    pub fn lookup(&self, path: &str) -> Option<&Tag> {
        let trimmed = path.trim_start_matches('/');
        let (head, rest) = match trimmed.split_once('/') {
            Some((head, rest)) => (head, rest),
            None => (trimmed, ""),
        };
        self.get(head).and_then(|tag| tag.lookup(rest))
    }
}

impl<'a> IntoIterator for &'a Compound {
    type Item = (&'a String, &'a Tag);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Tag)> for Compound {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Compound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, tag) in &self.entries {
            map.serialize_entry(name, tag)?;
        }
        map.end()
    }
}
