//! The encoder: turns payloads into signed transfers for one author.

use bytes::Bytes;

use crate::clock::{Clock, SystemClock};
use crate::content::Payload;
use crate::crypto::{sign_event, DomainKey, Keypair};
use crate::error::Result;
use crate::event::Event;
use crate::refs::BinaryRef;
use crate::transfer::Transfer;

/// Configuration for an [`Encoder`].
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Stamp entries with the encoder's clock. When unset, [`Encoder::encode`]
    /// writes timestamp 0.
    pub now_timestamps: bool,
    /// Scope signatures to a network.
    pub domain_key: Option<DomainKey>,
}

/// Creates signed entries for a single author.
///
/// An encoder holds no per-feed state: the caller passes the sequence number
/// and previous key for every entry, so one encoder can be shared between
/// threads as long as its clock can.
pub struct Encoder<C: Clock = SystemClock> {
    keypair: Keypair,
    config: EncoderConfig,
    clock: C,
}

impl Encoder<SystemClock> {
    /// Create an encoder with the default configuration and the system clock.
    pub fn new(keypair: Keypair) -> Self {
        Self::with_config(keypair, EncoderConfig::default())
    }

    pub fn with_config(keypair: Keypair, config: EncoderConfig) -> Self {
        Self {
            keypair,
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Encoder<C> {
    /// Replace the clock used for timestamps.
    pub fn with_clock<D: Clock>(self, clock: D) -> Encoder<D> {
        Encoder {
            keypair: self.keypair,
            config: self.config,
            clock,
        }
    }

    pub fn with_now_timestamps(mut self, enabled: bool) -> Self {
        self.config.now_timestamps = enabled;
        self
    }

    pub fn with_domain_key(mut self, key: DomainKey) -> Self {
        self.config.domain_key = Some(key);
        self
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The author reference of every entry this encoder produces.
    pub fn author(&self) -> BinaryRef {
        self.keypair.feed_ref()
    }

    /// Encode `payload` as entry `sequence`, chained to `previous`.
    ///
    /// The timestamp is read from the clock if `now_timestamps` is set.
    /// Returns the transfer and its message key.
    pub fn encode(
        &self,
        sequence: u64,
        previous: Option<&BinaryRef>,
        payload: impl Into<Payload>,
    ) -> Result<(Transfer, BinaryRef)> {
        let timestamp = if self.config.now_timestamps {
            self.clock.now()
        } else {
            0
        };
        self.encode_with_timestamp(sequence, previous, timestamp, payload)
    }

    /// Encode with a caller-supplied timestamp.
    pub fn encode_with_timestamp(
        &self,
        sequence: u64,
        previous: Option<&BinaryRef>,
        timestamp: i64,
        payload: impl Into<Payload>,
    ) -> Result<(Transfer, BinaryRef)> {
        let (content_type, content) = payload.into().into_content()?;

        let event = Event::build(
            self.author(),
            previous.copied(),
            sequence,
            timestamp,
            content_type,
            &content,
        )?;
        let event_bytes = event.to_cbor()?;

        let signature = sign_event(&self.keypair, &event_bytes, self.config.domain_key.as_ref());

        let transfer = Transfer {
            event: event_bytes.into(),
            signature: Bytes::copy_from_slice(signature.as_ref()),
            content,
        };
        let key = transfer.key();

        tracing::debug!(
            sequence,
            timestamp,
            content_type = ?content_type,
            content_len = transfer.content.len(),
            key = %key,
            "encoded entry"
        );

        Ok((transfer, key))
    }
}

impl<C: Clock + std::fmt::Debug> std::fmt::Debug for Encoder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("author", &self.keypair)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::content::ContentType;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::Arc;

    fn keypair() -> Keypair {
        Keypair::from_seed(b"deaddeaddeaddeaddeaddeaddeaddead")
    }

    #[test]
    fn test_timestamps_follow_clock() {
        let clock = Arc::new(SteppingClock::starting_at(-5));
        let encoder = Encoder::new(keypair())
            .with_clock(Arc::clone(&clock))
            .with_now_timestamps(true);

        let mut prev = None;
        for (i, want) in [-5i64, -4, -3].into_iter().enumerate() {
            let (tr, key) = encoder
                .encode(i as u64 + 1, prev.as_ref(), json!({"i": i}))
                .unwrap();
            assert_eq!(tr.event().unwrap().timestamp, want);
            prev = Some(key);
        }
    }

    #[test]
    fn test_timestamp_zero_without_flag() {
        let clock = SteppingClock::starting_at(100);
        let encoder = Encoder::new(keypair()).with_clock(&clock);
        let (tr, _) = encoder.encode(1, None, "x").unwrap();
        assert_eq!(tr.event().unwrap().timestamp, 0);
        assert_eq!(clock.peek(), 100);
    }

    #[test]
    fn test_caller_supplied_timestamp() {
        let encoder = Encoder::new(keypair());
        let (tr, _) = encoder.encode_with_timestamp(1, None, 42, "x").unwrap();
        assert_eq!(tr.event().unwrap().timestamp, 42);
    }

    #[test]
    fn test_chain_keys() {
        let encoder = Encoder::new(keypair());
        let (first, k1) = encoder.encode(1, None, "one").unwrap();
        let (second, _) = encoder.encode(2, Some(&k1), "two").unwrap();

        assert_eq!(first.key(), k1);
        assert_eq!(second.previous().unwrap(), Some(k1));
        assert_eq!(second.author().unwrap(), encoder.author());
    }

    #[test]
    fn test_sequence_rules() {
        let encoder = Encoder::new(keypair());
        assert!(matches!(
            encoder.encode(0, None, "x"),
            Err(Error::InvalidSequence(0))
        ));
        assert!(matches!(
            encoder.encode(2, None, "x"),
            Err(Error::MissingPrevious(2))
        ));
        let feed = encoder.author();
        assert!(matches!(
            encoder.encode(2, Some(&feed), "x"),
            Err(Error::InvalidRef(_))
        ));
    }

    #[test]
    fn test_too_large_rejected() {
        let encoder = Encoder::new(keypair());
        let err = encoder
            .encode(1, None, vec![b'A'; u16::MAX as usize + 10])
            .unwrap_err();
        assert!(matches!(err, Error::ContentTooLarge { size: 65545 }));
    }

    #[test]
    fn test_domain_key_signing() {
        let key = DomainKey::from_bytes([0x5a; 32]);
        let encoder = Encoder::new(keypair()).with_domain_key(key.clone());
        let (tr, _) = encoder.encode(1, None, "scoped").unwrap();

        assert!(tr.verify(Some(&key)));
        assert!(!tr.verify(None));
        assert!(!tr.verify(Some(&DomainKey::from_bytes([0x5b; 32]))));
    }

    #[test]
    fn test_content_types() {
        let encoder = Encoder::new(keypair());
        let (raw, _) = encoder.encode(1, None, vec![0xffu8, 0x00]).unwrap();
        assert_eq!(raw.content_type().unwrap(), ContentType::Arbitrary);

        let (structured, k) = encoder.encode(1, None, json!({"type": "post"})).unwrap();
        assert_eq!(structured.content_type().unwrap(), ContentType::Json);
        assert_eq!(structured.content_json().unwrap()["type"], "post");
        assert_eq!(structured.key(), k);
    }

    #[test]
    fn test_encoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Encoder>();
        assert_send_sync::<Encoder<Arc<SteppingClock>>>();
    }
}
