//! Metadata extraction: embedded EXIF tag table → [`MetadataSummary`].
//!
//! This stage cannot fail. A screenshot forwarded through a messaging app or
//! saved from an editor usually has its tags stripped, and that absence is
//! itself a forensic signal, so "no tags" and "tags we could not read" both
//! collapse to [`MetadataSummary::Absent`] rather than an error.
//!
//! Only the primary image directory is read; thumbnail directories describe
//! the embedded preview, not the screenshot.

use crate::pipeline::input::UploadedImage;
use exif::{In, Reader, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Display text of the sentinel.
pub const NO_METADATA: &str = "No Metadata Found (Likely a WhatsApp forward or Edited).";

/// Summary of the embedded tag table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "tags", rename_all = "snake_case")]
pub enum MetadataSummary {
    /// No readable tags: stripped by a messaging app or an image editor.
    Absent,
    /// Tag name (or raw numeric key when unnamed) → value.
    Tags(BTreeMap<String, TagValue>),
}

impl MetadataSummary {
    pub fn is_absent(&self) -> bool {
        matches!(self, MetadataSummary::Absent)
    }

    pub fn tags(&self) -> Option<&BTreeMap<String, TagValue>> {
        match self {
            MetadataSummary::Absent => None,
            MetadataSummary::Tags(tags) => Some(tags),
        }
    }

    pub fn len(&self) -> usize {
        self.tags().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MetadataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSummary::Absent => f.write_str(NO_METADATA),
            MetadataSummary::Tags(tags) => {
                f.write_str("{")?;
                for (i, (key, value)) in tags.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A tag value as stored in the file, without unit or type conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Unsigned(Vec<u64>),
    Signed(Vec<i64>),
    /// (numerator, denominator) pairs.
    Rational(Vec<(u32, u32)>),
    SignedRational(Vec<(i32, i32)>),
    Float(Vec<f64>),
    Bytes(Vec<u8>),
}

impl From<&Value> for TagValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Ascii(parts) => TagValue::Text(
                parts
                    .iter()
                    .map(|p| String::from_utf8_lossy(p).into_owned())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Byte(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::Short(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::Long(v) => TagValue::Unsigned(v.iter().map(|&x| x as u64).collect()),
            Value::SByte(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::SShort(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::SLong(v) => TagValue::Signed(v.iter().map(|&x| x as i64).collect()),
            Value::Rational(v) => TagValue::Rational(v.iter().map(|r| (r.num, r.denom)).collect()),
            Value::SRational(v) => {
                TagValue::SignedRational(v.iter().map(|r| (r.num, r.denom)).collect())
            }
            Value::Float(v) => TagValue::Float(v.iter().map(|&x| x as f64).collect()),
            Value::Double(v) => TagValue::Float(v.clone()),
            Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
            Value::Unknown(typ, count, _) => {
                TagValue::Text(format!("<unknown type {typ}, {count} values>"))
            }
        }
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    if let [only] = items {
        return item(f, only);
    }
    f.write_str("[")?;
    for (i, x) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(f, x)?;
    }
    f.write_str("]")
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Unsigned(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TagValue::Signed(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TagValue::Rational(v) => write_list(f, v, |f, (n, d)| write!(f, "{n}/{d}")),
            TagValue::SignedRational(v) => write_list(f, v, |f, (n, d)| write!(f, "{n}/{d}")),
            TagValue::Float(v) => write_list(f, v, |f, x| write!(f, "{x}")),
            TagValue::Bytes(b) => {
                if !b.is_empty() && b.iter().all(|c| c.is_ascii_graphic() || *c == b' ') {
                    f.write_str(&String::from_utf8_lossy(b))
                } else {
                    write!(f, "<{} bytes>", b.len())
                }
            }
        }
    }
}

/// Why a tag table could not be read. Never leaves this module.
#[derive(Debug, Error)]
enum MetadataReadError {
    #[error("no tag table present")]
    NotFound,
    #[error("unreadable tag table: {0}")]
    Corrupt(#[from] exif::Error),
}

/// Extract the metadata summary. Never fails.
pub fn extract(image: &UploadedImage) -> MetadataSummary {
    match read_tags(image) {
        Ok(tags) if tags.is_empty() => {
            debug!("Tag table present but empty");
            MetadataSummary::Absent
        }
        Ok(tags) => {
            debug!("Read {} embedded tags", tags.len());
            MetadataSummary::Tags(tags)
        }
        Err(e) => {
            debug!("Metadata degraded to sentinel: {}", e);
            MetadataSummary::Absent
        }
    }
}

fn read_tags(image: &UploadedImage) -> Result<BTreeMap<String, TagValue>, MetadataReadError> {
    let mut cursor = Cursor::new(image.bytes());
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Err(MetadataReadError::NotFound),
        Err(e) => return Err(e.into()),
    };

    Ok(exif
        .fields()
        .filter(|field| field.ifd_num == In::PRIMARY)
        .map(|field| {
            // Known tags get their canonical name; unknown ones keep the raw number.
            let key = if field.tag.description().is_some() {
                field.tag.to_string()
            } else {
                field.tag.number().to_string()
            };
            (key, TagValue::from(&field.value))
        })
        .collect())
}
