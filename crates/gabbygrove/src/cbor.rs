//! The constrained CBOR subset used by Gabby Grove.
//!
//! Encoding follows RFC 8949 preferred serialization:
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//! - No maps, no floats
//!
//! Events are small and are decoded into a [`ciborium::value::Value`]. The
//! transfer envelope is read with [`Reader`], which checks every declared
//! length against a caller limit before touching the payload.

use ciborium::value::Value;

use crate::error::{Error, Result};

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_TAG: u8 = 6;

const SIMPLE_FALSE: u8 = 0xf4;
const SIMPLE_TRUE: u8 = 0xf5;
const SIMPLE_NULL: u8 = 0xf6;

/// Encode a CBOR value to bytes.
///
/// Only the subset of values this format produces is supported.
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Integer(i) => encode_integer(buf, i128::from(*i)),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => {
            encode_uint(buf, MAJOR_TEXT, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(arr) => {
            encode_array_header(buf, arr.len());
            for item in arr {
                encode_value_to(buf, item)?;
            }
        }
        Value::Tag(tag, inner) => {
            encode_tag(buf, *tag);
            encode_value_to(buf, inner)?;
        }
        Value::Bool(b) => buf.push(if *b { SIMPLE_TRUE } else { SIMPLE_FALSE }),
        Value::Null => encode_null(buf),
        Value::Float(_) => {
            return Err(Error::MalformedEvent("floats are not part of the format".into()))
        }
        Value::Map(_) => {
            return Err(Error::MalformedEvent("maps are not part of the format".into()))
        }
        _ => return Err(Error::MalformedEvent("unsupported CBOR value".into())),
    }
    Ok(())
}

/// Encode a signed integer (major types 0 and 1).
pub fn encode_integer(buf: &mut Vec<u8>, n: i128) {
    if n >= 0 {
        encode_uint(buf, MAJOR_UINT, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, MAJOR_NEGINT, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
pub fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
pub fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, MAJOR_BYTES, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode an array header (major type 4).
pub fn encode_array_header(buf: &mut Vec<u8>, len: usize) {
    encode_uint(buf, MAJOR_ARRAY, len as u64);
}

/// Encode a tag header (major type 6).
pub fn encode_tag(buf: &mut Vec<u8>, tag: u64) {
    encode_uint(buf, MAJOR_TAG, tag);
}

pub fn encode_null(buf: &mut Vec<u8>) {
    buf.push(SIMPLE_NULL);
}

/// Decode exactly one CBOR value from `bytes`.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    ciborium::from_reader(bytes).map_err(|e| Error::MalformedEvent(e.to_string()))
}

/// Why a bounded read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The input ended before the declared item did.
    UnexpectedEnd,
    /// A different major type was found.
    UnexpectedType { expected: u8, found: u8 },
    /// Indefinite lengths and reserved additional info values.
    Unsupported(u8),
    /// The declared length exceeds the caller's limit.
    TooLong { declared: u64, limit: u64 },
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEnd => f.write_str("unexpected end of input"),
            Self::UnexpectedType { expected, found } => {
                write!(f, "expected major type {expected}, found {found}")
            }
            Self::Unsupported(info) => write!(f, "unsupported additional info {info}"),
            Self::TooLong { declared, limit } => {
                write!(f, "declared length {declared} exceeds limit {limit}")
            }
        }
    }
}

/// A cursor over a CBOR byte slice.
///
/// Items are borrowed from the input; nothing is allocated while reading.
#[derive(Debug)]
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], ReadError> {
        if self.remaining() < n {
            return Err(ReadError::UnexpectedEnd);
        }
        let out = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read an item header, returning its major type and argument.
    fn read_header(&mut self) -> std::result::Result<(u8, u64), ReadError> {
        let initial = self.take(1)?[0];
        let major = initial >> 5;
        let info = initial & 0x1f;
        let arg = match info {
            0..=23 => u64::from(info),
            24 => u64::from(self.take(1)?[0]),
            25 => {
                let b = self.take(2)?;
                u64::from(u16::from_be_bytes([b[0], b[1]]))
            }
            26 => {
                let b = self.take(4)?;
                u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            }
            27 => {
                let b = self.take(8)?;
                let mut arr = [0u8; 8];
                arr.copy_from_slice(b);
                u64::from_be_bytes(arr)
            }
            _ => return Err(ReadError::Unsupported(info)),
        };
        Ok((major, arg))
    }

    /// Read an array header and return its length.
    pub fn read_array_len(&mut self) -> std::result::Result<u64, ReadError> {
        match self.read_header()? {
            (MAJOR_ARRAY, len) => Ok(len),
            (found, _) => Err(ReadError::UnexpectedType {
                expected: MAJOR_ARRAY,
                found,
            }),
        }
    }

    /// Read a byte string whose declared length must not exceed `limit`.
    ///
    /// The limit is checked against the header before the body is read.
    pub fn read_bytes(&mut self, limit: u64) -> std::result::Result<&'a [u8], ReadError> {
        let len = match self.read_header()? {
            (MAJOR_BYTES, len) => len,
            (found, _) => {
                return Err(ReadError::UnexpectedType {
                    expected: MAJOR_BYTES,
                    found,
                })
            }
        };
        if len > limit {
            return Err(ReadError::TooLong {
                declared: len,
                limit,
            });
        }
        // len <= limit, and every caller limit fits in usize.
        self.take(len as usize)
    }
}
