//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::Value as JsonValue;

use gabbygrove::{BinaryRef, Encoder, Keypair, Payload, RefType, Result, Transfer};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

pub fn ref_type() -> impl Strategy<Value = RefType> {
    prop_oneof![
        Just(RefType::Feed),
        Just(RefType::Message),
        Just(RefType::Content),
    ]
}

/// Generate a reference of any type.
pub fn binary_ref() -> impl Strategy<Value = BinaryRef> {
    (ref_type(), any::<[u8; 32]>()).prop_map(|(t, digest)| BinaryRef::new(t, digest))
}

/// Generate a message reference, usable as `previous`.
pub fn message_ref() -> impl Strategy<Value = BinaryRef> {
    any::<[u8; 32]>().prop_map(BinaryRef::Message)
}

/// Generate a valid sequence number (1-indexed).
pub fn seq() -> impl Strategy<Value = u64> {
    1u64..=u64::MAX
}

/// Generate a timestamp, negative ones included.
pub fn timestamp() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// Generate raw bytes of at most `max_len`.
pub fn raw_content(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a small JSON object with string keys.
pub fn json_object() -> impl Strategy<Value = JsonValue> {
    prop::collection::btree_map(
        "[a-z]{1,8}",
        prop_oneof![
            any::<i64>().prop_map(JsonValue::from),
            any::<bool>().prop_map(JsonValue::from),
            ".{0,24}".prop_map(JsonValue::from),
        ],
        0..6,
    )
    .prop_map(|m| JsonValue::Object(m.into_iter().collect()))
}

/// Generate a raw or structured payload.
pub fn payload() -> impl Strategy<Value = Payload> {
    prop_oneof![
        raw_content(512).prop_map(Payload::from),
        json_object().prop_map(Payload::from),
    ]
}

/// Parameters for generating an entry.
#[derive(Debug, Clone)]
pub struct EntryParams {
    pub keypair: Keypair,
    pub sequence: u64,
    pub previous: BinaryRef,
    pub timestamp: i64,
    pub payload: Payload,
}

impl EntryParams {
    /// Encode the entry. `previous` is dropped for sequence 1.
    pub fn encode(&self) -> Result<(Transfer, BinaryRef)> {
        Encoder::new(self.keypair.clone()).encode_with_timestamp(
            self.sequence,
            Some(&self.previous),
            self.timestamp,
            self.payload.clone(),
        )
    }
}

impl Arbitrary for EntryParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            prop_oneof![Just(1u64), seq()],
            message_ref(),
            timestamp(),
            payload(),
        )
            .prop_map(|(seed, sequence, previous, timestamp, payload)| EntryParams {
                keypair: Keypair::from_seed(&seed),
                sequence,
                previous,
                timestamp,
                payload,
            })
            .boxed()
    }
}
