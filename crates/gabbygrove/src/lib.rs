//! # Gabby Grove
//!
//! A compact, signed, content-addressed feed entry format.
//!
//! This crate contains no I/O, no storage, no networking. It turns payloads
//! into signed wire bytes and back, and checks what it reads.
//!
//! ## Key Types
//!
//! - [`Encoder`] - Signs payloads into [`Transfer`]s for one author
//! - [`Transfer`] - The wire envelope: event bytes, signature, content
//! - [`Event`] - The signed metadata: previous, author, sequence, timestamp, content info
//! - [`BinaryRef`] - 33-byte typed reference to a feed, message or content blob
//!
//! ## Chaining
//!
//! Every entry after the first names its predecessor by message key
//! ([`Transfer::key`]). Keeping the chain is up to the caller:
//!
//! ```rust
//! use gabbygrove::{Encoder, Keypair, Transfer};
//! use serde_json::json;
//!
//! let encoder = Encoder::new(Keypair::generate());
//! let (first, key) = encoder.encode(1, None, "hello").unwrap();
//! let (second, _) = encoder.encode(2, Some(&key), json!({"type": "post"})).unwrap();
//!
//! let wire = second.to_cbor();
//! let decoded = Transfer::from_cbor(&wire).unwrap();
//! assert!(decoded.verify(None));
//! assert_eq!(decoded.previous().unwrap(), Some(first.key()));
//! ```

pub mod cbor;
pub mod clock;
pub mod content;
pub mod crypto;
pub mod encoder;
pub mod error;
pub mod event;
pub mod refs;
pub mod transfer;
pub mod validation;
pub mod value;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use content::{ContentType, Payload, MAX_CONTENT_SIZE};
pub use crypto::{DomainKey, Keypair, Signature};
pub use encoder::{Encoder, EncoderConfig};
pub use error::{Error, Result, ValidationError};
pub use event::{ContentInfo, Event, MAX_EVENT_SIZE};
pub use refs::{BinaryRef, RefType};
pub use transfer::Transfer;
pub use validation::{validate_append, validate_link};
pub use value::MessageValue;
