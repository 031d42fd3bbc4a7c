//! A JSON view of a transfer, for consumers that index feed entries as
//! JSON documents.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::content::{self, ContentType};
use crate::error::Result;
use crate::refs::{BinaryRef, ALGORITHM};
use crate::transfer::Transfer;

/// Suffix marking a base64 signature over CBOR event bytes.
pub const SIGNATURE_SUFFIX: &str = ".cbor.sig.ed25519";

/// The decoded fields of a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageValue {
    pub previous: Option<BinaryRef>,
    pub author: BinaryRef,
    pub sequence: u64,
    /// Claimed time in Unix milliseconds.
    pub timestamp: i64,
    /// Always the format's algorithm identifier.
    pub hash: String,
    /// Parsed JSON content, or standard base64 for other content types.
    pub content: JsonValue,
    pub signature: String,
}

impl MessageValue {
    /// Build the view from a transfer. The transfer is not verified.
    pub fn from_transfer(tr: &Transfer) -> Result<Self> {
        let event = tr.event()?;
        let content = match event.content.content_type {
            ContentType::Json => content::parse_json(&tr.content)?,
            ContentType::Arbitrary | ContentType::Cbor => {
                JsonValue::String(STANDARD.encode(&tr.content))
            }
        };
        Ok(Self {
            previous: event.previous,
            author: event.author,
            sequence: event.sequence,
            timestamp: event.timestamp.saturating_mul(1000),
            hash: ALGORITHM.to_string(),
            content,
            signature: format!("{}{}", STANDARD.encode(&tr.signature), SIGNATURE_SUFFIX),
        })
    }
}

impl Transfer {
    /// See [`MessageValue::from_transfer`].
    pub fn value_content(&self) -> Result<MessageValue> {
        MessageValue::from_transfer(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::encoder::Encoder;
    use serde_json::json;

    #[test]
    fn test_json_content_view() {
        let enc = Encoder::new(Keypair::from_seed(&[3; 32]));
        let (t1, k1) = enc.encode_with_timestamp(1, None, 7, "raw").unwrap();
        let (t2, _) = enc
            .encode_with_timestamp(2, Some(&k1), 8, json!({"type": "post", "text": "hi"}))
            .unwrap();

        let v1 = t1.value_content().unwrap();
        assert_eq!(v1.previous, None);
        assert_eq!(v1.content, json!("cmF3"));
        assert_eq!(v1.timestamp, 7000);
        assert!(v1.signature.ends_with(SIGNATURE_SUFFIX));

        let v2 = t2.value_content().unwrap();
        assert_eq!(v2.previous, Some(k1));
        assert_eq!(v2.sequence, 2);
        assert_eq!(v2.content, json!({"type": "post", "text": "hi"}));
        assert_eq!(v2.hash, "gabbygrove-v1");

        let doc = serde_json::to_value(&v2).unwrap();
        assert_eq!(doc["author"], json!(enc.author().to_uri()));
        assert_eq!(doc["previous"], json!(k1.to_uri()));
    }
}
