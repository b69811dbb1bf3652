//! EMV tag-length-value fields.
//!
//! Every field serializes as `tag ++ length ++ value`, where `tag` is two ASCII
//! digits and `length` is the value's UTF-16 length zero-padded to two
//! digits, the same units the CRC consumes. Composite fields carry the
//! concatenated serialization of their children as their value, so the outer
//! length is the total serialized length of the children, not the child count.

use crate::{PixError, Result};
use std::fmt;

/// Largest value length a 2-digit length prefix can describe.
pub const MAX_VALUE_LEN: usize = 99;

/// A single TLV field, possibly composite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmvField {
    tag: String,
    value: String,
    children: Vec<EmvField>,
}

impl EmvField {
    /// Create a primitive field.
    ///
    /// # Errors
    ///
    /// - [`PixError::InvalidTag`] if `tag` is not exactly two ASCII digits.
    /// - [`PixError::FieldTooLong`] if `value` is longer than 99 UTF-16 units.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pixkit_lib::tlv::EmvField;
    ///
    /// let field = EmvField::new("58", "BR").unwrap();
    /// assert_eq!(field.serialize(), "5802BR");
    /// ```
    pub fn new(tag: &str, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        validate(tag, &value)?;
        Ok(Self {
            tag: tag.to_string(),
            value,
            children: Vec::new(),
        })
    }

    /// Create a composite field whose value is the serialized `children`.
    ///
    /// # Errors
    ///
    /// Same as [`EmvField::new`], applied to the concatenated children.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pixkit_lib::tlv::EmvField;
    ///
    /// let txid = EmvField::new("05", "***").unwrap();
    /// let field = EmvField::composite("62", vec![txid]).unwrap();
    /// assert_eq!(field.serialize(), "62070503***");
    /// ```
    pub fn composite(tag: &str, children: Vec<EmvField>) -> Result<Self> {
        let value: String = children.iter().map(EmvField::serialize).collect();
        validate(tag, &value)?;
        Ok(Self {
            tag: tag.to_string(),
            value,
            children,
        })
    }

    /// The 2-digit tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The value; for composites, the serialized children.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Child fields of a composite, empty for primitives.
    pub fn children(&self) -> &[EmvField] {
        &self.children
    }

    /// Find a direct child by tag.
    pub fn child(&self, tag: &str) -> Option<&EmvField> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// True when built from child fields.
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    /// Value length in UTF-16 code units.
    pub fn len(&self) -> usize {
        utf16_len(&self.value)
    }

    /// True for an empty value.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The zero-padded 2-digit length prefix.
    pub fn length_prefix(&self) -> String {
        format!("{:02}", self.len())
    }

    /// Serialize as `tag ++ length ++ value`.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(4 + self.value.len());
        self.write_to(&mut out);
        out
    }

    /// Append the serialized field to `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.tag);
        out.push_str(&self.length_prefix());
        out.push_str(&self.value);
    }
}

impl fmt::Display for EmvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.tag, self.length_prefix(), self.value)
    }
}

/// Shorthand for [`EmvField::new`].
pub fn field(tag: &str, value: impl Into<String>) -> Result<EmvField> {
    EmvField::new(tag, value)
}

fn validate(tag: &str, value: &str) -> Result<()> {
    if tag.len() != 2 || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PixError::InvalidTag(tag.to_string()));
    }
    let length = utf16_len(value);
    if length > MAX_VALUE_LEN {
        return Err(PixError::FieldTooLong {
            tag: tag.to_string(),
            length,
        });
    }
    Ok(())
}

pub(crate) fn utf16_len(value: &str) -> usize {
    value.chars().map(char::len_utf16).sum()
}

/// Split `input` after its first `n` UTF-16 units. `None` if it is shorter
/// or the split would fall inside a surrogate pair.
pub(crate) fn split_utf16(input: &str, n: usize) -> Option<(&str, &str)> {
    let mut units = 0;
    for (at, c) in input.char_indices() {
        if units == n {
            return Some(input.split_at(at));
        }
        units += c.len_utf16();
        if units > n {
            return None;
        }
    }
    (units == n).then_some((input, ""))
}

/// Parse a flat sequence of serialized fields. Nested values are left as
/// text; call again on a field's value to descend into a composite.
///
/// # Errors
///
/// Returns [`PixError::MalformedPayload`] if the input does not split into
/// whole `tag ++ length ++ value` triples.
pub fn parse_fields(mut input: &str) -> Result<Vec<EmvField>> {
    let mut fields = Vec::new();
    while !input.is_empty() {
        let (tag, rest) = split_utf16(input, 2)
            .ok_or_else(|| PixError::MalformedPayload(format!("truncated tag in {:?}", input)))?;
        let (len, rest) = split_utf16(rest, 2).ok_or_else(|| {
            PixError::MalformedPayload(format!("truncated length after tag {}", tag))
        })?;
        let len: usize = len
            .parse()
            .ok()
            .filter(|_| len.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| {
                PixError::MalformedPayload(format!("bad length {:?} for tag {}", len, tag))
            })?;
        let (value, rest) = split_utf16(rest, len).ok_or_else(|| {
            PixError::MalformedPayload(format!("value of tag {} shorter than {}", tag, len))
        })?;
        fields.push(EmvField::new(tag, value).map_err(|e| match e {
            PixError::InvalidTag(t) => PixError::MalformedPayload(format!("bad tag {:?}", t)),
            other => other,
        })?);
        input = rest;
    }
    Ok(fields)
}
