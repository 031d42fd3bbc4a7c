//! Event: the unsigned metadata record of a feed entry.
//!
//! Wire layout (a 5-element CBOR array, in this order):
//!
//! ```text
//! [ previous | null, author, sequence, timestamp, [ hash, size, type ] ]
//! ```
//!
//! These exact bytes are what the author signs and what the message key is
//! derived from. The field order is frozen.

use ciborium::value::Value;

use crate::cbor;
use crate::content::{ContentType, MAX_CONTENT_SIZE};
use crate::crypto::sha256;
use crate::error::{Error, Result};
use crate::refs::{BinaryRef, RefType};

/// Upper bound for serialized event bytes accepted from the wire.
///
/// The largest well-formed event is well under this: two tagged references,
/// two 9-byte integers and the content info.
pub const MAX_EVENT_SIZE: usize = 256;

/// Describes the content carried next to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentInfo {
    /// SHA-256 of the content bytes.
    pub hash: BinaryRef,
    /// Exact length of the content bytes.
    pub size: u16,
    pub content_type: ContentType,
}

impl ContentInfo {
    /// Describe `content`, rejecting anything over 65535 bytes.
    pub fn describe(content_type: ContentType, content: &[u8]) -> Result<Self> {
        if content.len() > MAX_CONTENT_SIZE {
            return Err(Error::ContentTooLarge {
                size: content.len() as u64,
            });
        }
        Ok(Self {
            hash: BinaryRef::Content(sha256(content)),
            size: content.len() as u16,
            content_type,
        })
    }

    /// Check that `content` is what this record describes.
    pub fn matches(&self, content: &[u8]) -> bool {
        content.len() == usize::from(self.size) && self.hash.digest() == &sha256(content)
    }

    fn to_cbor_value(&self) -> Value {
        Value::Array(vec![
            self.hash.to_cbor_value(),
            Value::Integer(self.size.into()),
            Value::Integer(self.content_type.to_u8().into()),
        ])
    }

    fn from_cbor_value(value: &Value) -> Result<Self> {
        let fields = match value {
            Value::Array(a) if a.len() == 3 => a,
            _ => return Err(Error::MalformedEvent("content info must be an array of 3".into())),
        };

        let hash = BinaryRef::from_cbor_value(&fields[0])
            .map_err(|e| Error::MalformedEvent(format!("content hash: {e}")))?;
        if hash.ref_type() != RefType::Content {
            return Err(Error::MalformedEvent(format!(
                "content hash must be a content reference, got {}",
                hash.ref_type()
            )));
        }

        let size = integer_field(&fields[1], "content size")?;
        let size = match u64::try_from(size) {
            Ok(s) => u16::try_from(s).map_err(|_| Error::ContentTooLarge { size: s })?,
            Err(_) => return Err(Error::MalformedEvent(format!("negative content size {size}"))),
        };

        let raw_type = integer_field(&fields[2], "content type")?;
        let content_type = u8::try_from(raw_type)
            .ok()
            .and_then(ContentType::from_u8)
            .ok_or_else(|| Error::MalformedEvent(format!("unknown content type {raw_type}")))?;

        Ok(Self {
            hash,
            size,
            content_type,
        })
    }
}

/// The metadata signed by the author of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Key of the preceding entry. `None` only for sequence 1.
    pub previous: Option<BinaryRef>,
    /// The author's feed reference.
    pub author: BinaryRef,
    /// Position in the author's feed (1-indexed).
    pub sequence: u64,
    /// Author-claimed timestamp (Unix seconds). Untrusted.
    pub timestamp: i64,
    pub content: ContentInfo,
}

impl Event {
    /// Assemble an event for `content`.
    ///
    /// The content size is checked first, before anything is hashed or
    /// serialized. For sequence 1 any supplied `previous` is dropped.
    pub fn build(
        author: BinaryRef,
        previous: Option<BinaryRef>,
        sequence: u64,
        timestamp: i64,
        content_type: ContentType,
        content: &[u8],
    ) -> Result<Self> {
        let content = ContentInfo::describe(content_type, content)?;

        author.expect_type(RefType::Feed)?;
        let previous = match sequence {
            0 => return Err(Error::InvalidSequence(0)),
            1 => None,
            seq => {
                let prev = previous.ok_or(Error::MissingPrevious(seq))?;
                prev.expect_type(RefType::Message)?;
                Some(prev)
            }
        };

        Ok(Self {
            previous,
            author,
            sequence,
            timestamp,
            content,
        })
    }

    /// Serialize to the signed wire form.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        cbor::encode_value(&self.to_cbor_value())
    }

    fn to_cbor_value(&self) -> Value {
        Value::Array(vec![
            self.previous
                .as_ref()
                .map_or(Value::Null, BinaryRef::to_cbor_value),
            self.author.to_cbor_value(),
            Value::Integer(self.sequence.into()),
            Value::Integer(self.timestamp.into()),
            self.content.to_cbor_value(),
        ])
    }

    /// Parse and structurally check serialized event bytes.
    ///
    /// The input must be the canonical encoding of the event it describes;
    /// alternative encodings of the same values are rejected.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_EVENT_SIZE {
            return Err(Error::MalformedEvent(format!(
                "event is {} bytes, max {}",
                bytes.len(),
                MAX_EVENT_SIZE
            )));
        }

        let value = cbor::decode_value(bytes)?;
        let event = Self::from_cbor_value(&value)?;

        if event.to_cbor()? != bytes {
            return Err(Error::MalformedEvent(
                "non-canonical encoding or trailing data".into(),
            ));
        }
        Ok(event)
    }

    fn from_cbor_value(value: &Value) -> Result<Self> {
        let fields = match value {
            Value::Array(a) if a.len() == 5 => a,
            Value::Array(a) => {
                return Err(Error::MalformedEvent(format!(
                    "expected 5 fields, got {}",
                    a.len()
                )))
            }
            _ => return Err(Error::MalformedEvent("expected array".into())),
        };

        let previous = match &fields[0] {
            Value::Null => None,
            v => {
                let prev = BinaryRef::from_cbor_value(v)
                    .map_err(|e| Error::MalformedEvent(format!("previous: {e}")))?;
                if prev.ref_type() != RefType::Message {
                    return Err(Error::MalformedEvent(format!(
                        "previous must be a message reference, got {}",
                        prev.ref_type()
                    )));
                }
                Some(prev)
            }
        };

        let author = BinaryRef::from_cbor_value(&fields[1])
            .map_err(|e| Error::MalformedEvent(format!("author: {e}")))?;
        if author.ref_type() != RefType::Feed {
            return Err(Error::MalformedEvent(format!(
                "author must be a feed reference, got {}",
                author.ref_type()
            )));
        }

        let sequence = integer_field(&fields[2], "sequence")?;
        let sequence = u64::try_from(sequence)
            .map_err(|_| Error::MalformedEvent(format!("sequence out of range: {sequence}")))?;
        match (sequence, &previous) {
            (0, _) => return Err(Error::MalformedEvent("sequence must be at least 1".into())),
            (1, Some(_)) => {
                return Err(Error::MalformedEvent(
                    "first entry must not have a previous".into(),
                ))
            }
            (seq, None) if seq > 1 => {
                return Err(Error::MalformedEvent(format!(
                    "sequence {seq} without previous"
                )))
            }
            _ => {}
        }

        let timestamp = integer_field(&fields[3], "timestamp")?;
        let timestamp = i64::try_from(timestamp)
            .map_err(|_| Error::MalformedEvent(format!("timestamp out of range: {timestamp}")))?;

        let content = ContentInfo::from_cbor_value(&fields[4])?;

        Ok(Self {
            previous,
            author,
            sequence,
            timestamp,
            content,
        })
    }
}

fn integer_field(value: &Value, name: &str) -> Result<i128> {
    match value {
        Value::Integer(i) => Ok(i128::from(*i)),
        _ => Err(Error::MalformedEvent(format!("{name} must be an integer"))),
    }
}
