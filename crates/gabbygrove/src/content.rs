//! Content classification: turning a payload into typed, canonical bytes.

use bytes::Bytes;
use ciborium::value::Value as CborValue;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::io;

use crate::error::{Error, Result};

/// Largest content a single entry may carry.
pub const MAX_CONTENT_SIZE: usize = u16::MAX as usize;

/// How the content bytes of an entry are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Opaque bytes, passed through unchanged.
    Arbitrary = 0,
    /// Compact JSON followed by a single newline.
    Json = 1,
    /// CBOR. Accepted when decoding, never produced by the encoder.
    Cbor = 2,
}

impl ContentType {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Arbitrary),
            1 => Some(Self::Json),
            2 => Some(Self::Cbor),
            _ => None,
        }
    }
}

/// A value to be published in a feed entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw bytes, stored as-is.
    Raw(Bytes),
    /// A structured value, stored as JSON text.
    Structured(JsonValue),
}

impl Payload {
    /// Build a structured payload from any serializable value.
    ///
    /// Non-finite floats are rejected: JSON has no spelling for them.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let shape = CborValue::serialized(value)
            .map_err(|e| Error::UnsupportedPayload(e.to_string()))?;
        if has_non_finite_float(&shape) {
            return Err(Error::UnsupportedPayload(
                "NaN and infinite floats cannot be written as JSON".into(),
            ));
        }
        serde_json::to_value(value)
            .map(Self::Structured)
            .map_err(|e| Error::UnsupportedPayload(e.to_string()))
    }

    /// Classify the payload and produce its canonical bytes.
    pub fn into_content(self) -> Result<(ContentType, Bytes)> {
        match self {
            Self::Raw(bytes) => Ok((ContentType::Arbitrary, bytes)),
            Self::Structured(value) => {
                let mut buf = to_json_vec(&value)?;
                buf.push(b'\n');
                Ok((ContentType::Json, buf.into()))
            }
        }
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Self::Raw(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Self::Raw(v.into())
    }
}

impl From<&[u8]> for Payload {
    fn from(v: &[u8]) -> Self {
        Self::Raw(Bytes::copy_from_slice(v))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Raw(s.into())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Raw(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<JsonValue> for Payload {
    fn from(v: JsonValue) -> Self {
        Self::Structured(v)
    }
}

/// Parse JSON content bytes back into a value.
pub fn parse_json(content: &[u8]) -> Result<JsonValue> {
    let trimmed = content.strip_suffix(b"\n").unwrap_or(content);
    serde_json::from_slice(trimmed)
        .map_err(|e| Error::InvalidContent(format!("invalid JSON: {e}")))
}

fn has_non_finite_float(value: &CborValue) -> bool {
    match value {
        CborValue::Float(f) => !f.is_finite(),
        CborValue::Array(items) => items.iter().any(has_non_finite_float),
        CborValue::Map(entries) => entries
            .iter()
            .any(|(k, v)| has_non_finite_float(k) || has_non_finite_float(v)),
        CborValue::Tag(_, inner) => has_non_finite_float(inner),
        _ => false,
    }
}

fn to_json_vec(value: &JsonValue) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, HtmlSafeFormatter);
    SortedKeys(value)
        .serialize(&mut ser)
        .map_err(|e| Error::UnsupportedPayload(e.to_string()))?;
    Ok(buf)
}

/// Serializes a JSON value with object keys in byte order, whatever map
/// implementation serde_json was built with.
struct SortedKeys<'a>(&'a JsonValue);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&SortedKeys(item))?;
                }
                seq.end()
            }
            JsonValue::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut m = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    m.serialize_entry(k, &SortedKeys(v))?;
                }
                m.end()
            }
            other => other.serialize(serializer),
        }
    }
}

/// Compact JSON that escapes `<`, `>`, `&`, U+2028 and U+2029 inside strings
/// and spells floats the way Go's `encoding/json` does.
struct HtmlSafeFormatter;

impl serde_json::ser::Formatter for HtmlSafeFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped: &[u8] = match c {
                '<' => b"\\u003c",
                '>' => b"\\u003e",
                '&' => b"\\u0026",
                '\u{2028}' => b"\\u2028",
                '\u{2029}' => b"\\u2029",
                _ => continue,
            };
            writer.write_all(&fragment.as_bytes()[start..i])?;
            writer.write_all(escaped)?;
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Shortest round-trip digits; exponent form (`1e+21`, `1e-7`) only below
/// 1e-6 or from 1e21 up.
fn format_float(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let sci = format!("{value:e}");
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => sci,
        }
    } else {
        format!("{value}")
    }
}
