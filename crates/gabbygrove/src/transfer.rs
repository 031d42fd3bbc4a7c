//! Transfer: the signed envelope that travels between peers.
//!
//! Wire layout is a 3-element CBOR array of byte strings:
//!
//! ```text
//! [ event bytes, signature (64), content (0..=65535) ]
//! ```

use bytes::Bytes;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::cbor::{self, ReadError, Reader};
use crate::content::{self, ContentType, MAX_CONTENT_SIZE};
use crate::crypto::{self, sha256, DomainKey, SIGNATURE_LEN};
use crate::error::{Error, Result, ValidationError};
use crate::event::{Event, MAX_EVENT_SIZE};
use crate::refs::BinaryRef;

/// A signed feed entry as exchanged on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transfer {
    /// Serialized [`Event`]; the exact bytes that were signed.
    pub event: Bytes,
    /// Ed25519 signature over `event` (or its domain MAC).
    pub signature: Bytes,
    /// The content described by the event.
    pub content: Bytes,
}

impl Transfer {
    /// Serialize to the wire form.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut buf =
            Vec::with_capacity(16 + self.event.len() + self.signature.len() + self.content.len());
        cbor::encode_array_header(&mut buf, 3);
        cbor::encode_bytes(&mut buf, &self.event);
        cbor::encode_bytes(&mut buf, &self.signature);
        cbor::encode_bytes(&mut buf, &self.content);
        buf
    }

    /// Parse the wire form.
    ///
    /// Every length is checked against its limit from the item header, so an
    /// oversized content claim fails with [`Error::ContentTooLarge`] before
    /// any of it is read or copied.
    pub fn from_cbor(input: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(input);

        let fields = reader.read_array_len().map_err(malformed)?;
        if fields != 3 {
            return Err(Error::MalformedTransfer(format!(
                "expected 3 fields, got {fields}"
            )));
        }

        let event = reader
            .read_bytes(MAX_EVENT_SIZE as u64)
            .map_err(malformed)?;

        let signature = reader.read_bytes(SIGNATURE_LEN as u64).map_err(malformed)?;
        if signature.len() != SIGNATURE_LEN {
            return Err(Error::MalformedTransfer(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )));
        }

        let content = reader
            .read_bytes(MAX_CONTENT_SIZE as u64)
            .map_err(|e| match e {
                ReadError::TooLong { declared, .. } => Error::ContentTooLarge { size: declared },
                other => malformed(other),
            })?;

        if reader.remaining() != 0 {
            return Err(Error::MalformedTransfer(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        tracing::debug!(
            event_len = event.len(),
            content_len = content.len(),
            "decoded transfer"
        );

        Ok(Self {
            event: Bytes::copy_from_slice(event),
            signature: Bytes::copy_from_slice(signature),
            content: Bytes::copy_from_slice(content),
        })
    }

    /// The message key of this entry: SHA-256 over event and signature.
    ///
    /// This is the value the next entry in the feed uses as `previous`.
    pub fn key(&self) -> BinaryRef {
        let mut signed = Vec::with_capacity(self.event.len() + self.signature.len());
        signed.extend_from_slice(&self.event);
        signed.extend_from_slice(&self.signature);
        BinaryRef::Message(sha256(&signed))
    }

    /// Parse the embedded event.
    pub fn event(&self) -> Result<Event> {
        Event::from_cbor(&self.event)
    }

    pub fn author(&self) -> Result<BinaryRef> {
        Ok(self.event()?.author)
    }

    pub fn previous(&self) -> Result<Option<BinaryRef>> {
        Ok(self.event()?.previous)
    }

    pub fn sequence(&self) -> Result<u64> {
        Ok(self.event()?.sequence)
    }

    /// The author-claimed creation time.
    pub fn claimed(&self) -> Result<SystemTime> {
        let ts = self.event()?.timestamp;
        let offset = Duration::from_secs(ts.unsigned_abs());
        let claimed = if ts >= 0 {
            UNIX_EPOCH.checked_add(offset)
        } else {
            UNIX_EPOCH.checked_sub(offset)
        };
        claimed.ok_or_else(|| Error::MalformedEvent(format!("timestamp {ts} not representable")))
    }

    pub fn content_type(&self) -> Result<ContentType> {
        Ok(self.event()?.content.content_type)
    }

    pub fn content_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Parse JSON content. Fails for other content types.
    pub fn content_json(&self) -> Result<serde_json::Value> {
        match self.content_type()? {
            ContentType::Json => content::parse_json(&self.content),
            other => Err(Error::InvalidContent(format!(
                "content type is {other:?}, not JSON"
            ))),
        }
    }

    /// Run every check and report the first one that fails.
    ///
    /// Checks, in order: the event parses, the content length matches,
    /// the content hash matches, and the signature verifies.
    pub fn validate(
        &self,
        domain: Option<&DomainKey>,
    ) -> std::result::Result<Event, ValidationError> {
        let event = self.event()?;

        if self.content.len() != usize::from(event.content.size) {
            return Err(ValidationError::ContentSizeMismatch {
                declared: event.content.size,
                actual: self.content.len(),
            });
        }

        if event.content.hash.digest() != &sha256(&self.content) {
            return Err(ValidationError::ContentHashMismatch);
        }

        if !crypto::verify_event(event.author.digest(), &self.event, &self.signature, domain) {
            return Err(ValidationError::SignatureFailed);
        }

        Ok(event)
    }

    /// Decode the wire form and run every check, reporting failures as
    /// codec errors: [`Error::ContentMismatch`] for content that does not
    /// match its event, [`Error::SignatureInvalid`] for a bad signature.
    pub fn decode_verified(input: &[u8], domain: Option<&DomainKey>) -> Result<(Self, Event)> {
        let tr = Self::from_cbor(input)?;
        let event = tr.validate(domain).map_err(|e| match e {
            ValidationError::SignatureFailed => Error::SignatureInvalid,
            e @ (ValidationError::ContentSizeMismatch { .. }
            | ValidationError::ContentHashMismatch) => Error::ContentMismatch(e.to_string()),
            other => Error::MalformedEvent(other.to_string()),
        })?;
        Ok((tr, event))
    }

    /// Pass/fail form of [`Transfer::validate`].
    pub fn verify(&self, domain: Option<&DomainKey>) -> bool {
        match self.validate(domain) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "transfer failed verification");
                false
            }
        }
    }
}

fn malformed(e: ReadError) -> Error {
    Error::MalformedTransfer(e.to_string())
}
