//! Binary references: the compact 33-byte identifiers for feeds, messages and
//! content blobs.
//!
//! On the wire a reference is CBOR tag 1050 wrapping a byte string of one
//! type byte followed by the 32-byte digest. Outside the wire format the same
//! reference is written as `ssb:<category>/gabbygrove-v1/<base64url digest>`.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use ciborium::value::Value;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// CBOR tag marking a byte string as a Gabby Grove reference.
pub const CBOR_TAG_BINARY_REF: u64 = 1050;

/// Length of a reference on the wire: one type byte plus the digest.
pub const BINARY_REF_LEN: usize = 33;

/// Algorithm identifier used in the external string form.
pub const ALGORITHM: &str = "gabbygrove-v1";

const URI_SCHEME: &str = "ssb:";

/// The three kinds of reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RefType {
    Feed = 1,
    Message = 2,
    Content = 3,
}

impl RefType {
    /// Parse the wire type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Feed),
            2 => Some(Self::Message),
            3 => Some(Self::Content),
            _ => None,
        }
    }

    /// Category name in the external string form.
    pub fn category(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Message => "message",
            Self::Content => "content",
        }
    }

    fn from_category(category: &str) -> Option<Self> {
        match category {
            "feed" => Some(Self::Feed),
            "message" => Some(Self::Message),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// A typed 32-byte reference.
///
/// "No previous entry" is expressed as `Option::<BinaryRef>::None`, never as
/// a zeroed reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryRef {
    /// An author identity (Ed25519 public key).
    Feed([u8; 32]),
    /// A message key: SHA-256 of the signed event and its signature.
    Message([u8; 32]),
    /// A content address: SHA-256 of the content bytes.
    Content([u8; 32]),
}

impl BinaryRef {
    /// Build a reference of the given kind.
    pub const fn new(ref_type: RefType, digest: [u8; 32]) -> Self {
        match ref_type {
            RefType::Feed => Self::Feed(digest),
            RefType::Message => Self::Message(digest),
            RefType::Content => Self::Content(digest),
        }
    }

    pub const fn ref_type(&self) -> RefType {
        match self {
            Self::Feed(_) => RefType::Feed,
            Self::Message(_) => RefType::Message,
            Self::Content(_) => RefType::Content,
        }
    }

    pub const fn digest(&self) -> &[u8; 32] {
        match self {
            Self::Feed(d) | Self::Message(d) | Self::Content(d) => d,
        }
    }

    /// Encode to the 33-byte wire form.
    pub fn to_bytes(&self) -> [u8; BINARY_REF_LEN] {
        let mut out = [0u8; BINARY_REF_LEN];
        out[0] = self.ref_type() as u8;
        out[1..].copy_from_slice(self.digest());
        out
    }

    /// Decode from the 33-byte wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BINARY_REF_LEN {
            return Err(Error::InvalidRef(format!(
                "expected {} bytes, got {}",
                BINARY_REF_LEN,
                bytes.len()
            )));
        }
        let ref_type = RefType::from_u8(bytes[0])
            .ok_or_else(|| Error::InvalidRef(format!("unknown type byte {:#04x}", bytes[0])))?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[1..]);
        Ok(Self::new(ref_type, digest))
    }

    /// Decode and require a specific kind.
    pub fn from_bytes_as(bytes: &[u8], expected: RefType) -> Result<Self> {
        let r = Self::from_bytes(bytes)?;
        r.expect_type(expected)?;
        Ok(r)
    }

    /// Fail unless this reference is of the given kind.
    pub fn expect_type(&self, expected: RefType) -> Result<()> {
        if self.ref_type() != expected {
            return Err(Error::InvalidRef(format!(
                "expected {} reference, got {}",
                expected,
                self.ref_type()
            )));
        }
        Ok(())
    }

    /// The tagged CBOR value for this reference.
    pub fn to_cbor_value(&self) -> Value {
        Value::Tag(
            CBOR_TAG_BINARY_REF,
            Box::new(Value::Bytes(self.to_bytes().to_vec())),
        )
    }

    /// Read a reference from a decoded CBOR value.
    ///
    /// The value must carry tag 1050.
    pub fn from_cbor_value(value: &Value) -> Result<Self> {
        match value {
            Value::Tag(CBOR_TAG_BINARY_REF, inner) => match inner.as_ref() {
                Value::Bytes(b) => Self::from_bytes(b),
                _ => Err(Error::InvalidRef("tag 1050 must wrap a byte string".into())),
            },
            Value::Tag(tag, _) => Err(Error::InvalidRef(format!("unexpected CBOR tag {tag}"))),
            _ => Err(Error::InvalidRef("expected tagged reference".into())),
        }
    }

    /// Render the external string form.
    pub fn to_uri(&self) -> String {
        format!(
            "{}{}/{}/{}",
            URI_SCHEME,
            self.ref_type().category(),
            ALGORITHM,
            URL_SAFE.encode(self.digest())
        )
    }

    /// Parse the external string form.
    pub fn from_uri(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(URI_SCHEME)
            .ok_or_else(|| Error::InvalidRef(format!("missing '{URI_SCHEME}' scheme: {s}")))?;

        let mut parts = rest.splitn(3, '/');
        let (Some(category), Some(algo), Some(encoded)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidRef(format!("expected <category>/<algo>/<digest>: {s}")));
        };

        let ref_type = RefType::from_category(category)
            .ok_or_else(|| Error::InvalidRef(format!("unknown category '{category}'")))?;

        if algo != ALGORITHM {
            return Err(Error::UnsupportedAlgorithm(algo.to_string()));
        }

        let bytes = URL_SAFE
            .decode(encoded)
            .map_err(|e| Error::InvalidRef(format!("invalid base64: {e}")))?;
        let digest: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidRef(format!("digest must be 32 bytes, got {}", bytes.len()))
        })?;

        Ok(Self::new(ref_type, digest))
    }
}

impl fmt::Debug for BinaryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinaryRef::{:?}({})",
            self.ref_type(),
            &hex::encode(self.digest())[..16]
        )
    }
}

impl fmt::Display for BinaryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for BinaryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_uri(s)
    }
}

impl Serialize for BinaryRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for BinaryRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_uri(&s).map_err(de::Error::custom)
    }
}
