//! Rendering of tags as Stringified NBT (SNBT)
//!
//! Compact output follows the usual SNBT suffix conventions (`1b`, `2s`,
//! `3L`, `4.5f`, `6.7d`, `[I;1,2]`). Pretty output spreads lists and
//! compounds over multiple lines; arrays always stay on one line.
//!
//! SNBT has no literal for non-finite floats. They are written with Java's
//! spellings, the same as the game's own output (`NaNf`, `Infinityd`,
//! `-Infinityf`), and do not parse back as numbers.

use std::fmt::Write;

use crate::types::{Compound, List, Tag};

/// Render a tag as compact SNBT
pub fn to_snbt(tag: &Tag) -> String {
    let mut out = String::new();
    write_tag(&mut out, tag, None, 0);
    out
}

/// Render a tag as indented, multi-line SNBT
pub fn to_snbt_pretty(tag: &Tag, indent: usize) -> String {
    let mut out = String::new();
    write_tag(&mut out, tag, Some(indent), 0);
    out
}

/// Render a list as compact SNBT
pub fn to_snbt_list(list: &List) -> String {
    let mut out = String::new();
    write_list(&mut out, list, None, 0);
    out
}

/// Render a compound as compact SNBT
pub fn to_snbt_compound(compound: &Compound) -> String {
    let mut out = String::new();
    write_compound(&mut out, compound, None, 0);
    out
}

/// Whether a compound key must be quoted to be read back
///
/// Bare keys are limited to `[A-Za-z0-9_-.+]`; the empty key is quoted.
pub fn requires_quoting(key: &str) -> bool {
    key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

/// Double-quote a string, escaping `"` and `\`
pub fn quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn write_tag(out: &mut String, tag: &Tag, indent: Option<usize>, depth: usize) {
    // write! into a String is infallible
    match tag {
        Tag::Byte(v) => {
            let _ = write!(out, "{}b", v);
        }
        Tag::Short(v) => {
            let _ = write!(out, "{}s", v);
        }
        Tag::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Tag::Long(v) => {
            let _ = write!(out, "{}L", v);
        }
        Tag::Float(v) => {
            let _ = match non_finite(v.is_nan(), v.is_infinite(), v.is_sign_negative()) {
                Some(token) => write!(out, "{}f", token),
                None => write!(out, "{}f", v),
            };
        }
        Tag::Double(v) => {
            let _ = match non_finite(v.is_nan(), v.is_infinite(), v.is_sign_negative()) {
                Some(token) => write!(out, "{}d", token),
                None => write!(out, "{}d", v),
            };
        }
        Tag::ByteArray(v) => write_array(out, "B", v, "b"),
        Tag::String(s) => out.push_str(&quoted_string(s)),
        Tag::List(list) => write_list(out, list, indent, depth),
        Tag::Compound(cmpd) => write_compound(out, cmpd, indent, depth),
        Tag::IntArray(v) => write_array(out, "I", v, ""),
        Tag::LongArray(v) => write_array(out, "L", v, "L"),
    }
}

fn non_finite(nan: bool, infinite: bool, negative: bool) -> Option<&'static str> {
    match (nan, infinite, negative) {
        (true, _, _) => Some("NaN"),
        (false, true, false) => Some("Infinity"),
        (false, true, true) => Some("-Infinity"),
        _ => None,
    }
}

fn write_array<T: std::fmt::Display>(out: &mut String, prefix: &str, values: &[T], suffix: &str) {
    out.push('[');
    out.push_str(prefix);
    out.push(';');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}{}", value, suffix);
    }
    out.push(']');
}

fn write_list(out: &mut String, list: &List, indent: Option<usize>, depth: usize) {
    if list.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push('[');
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline(out, indent, depth + 1);
        write_tag(out, item, indent, depth + 1);
    }
    newline(out, indent, depth);
    out.push(']');
}

fn write_compound(out: &mut String, compound: &Compound, indent: Option<usize>, depth: usize) {
    if compound.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push('{');
    for (i, (name, tag)) in compound.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline(out, indent, depth + 1);
        if requires_quoting(name) {
            out.push_str(&quoted_string(name));
        } else {
            out.push_str(name);
        }
        out.push(':');
        if indent.is_some() {
            out.push(' ');
        }
        write_tag(out, tag, indent, depth + 1);
    }
    newline(out, indent, depth);
    out.push('}');
}

fn newline(out: &mut String, indent: Option<usize>, depth: usize) {
    if let Some(width) = indent {
        out.push('\n');
        out.extend(std::iter::repeat(' ').take(width * depth));
    }
}
