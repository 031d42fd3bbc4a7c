//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use gabbygrove::{BinaryRef, Encoder, Keypair, Payload, SteppingClock, Transfer};
use serde_json::json;

use crate::vectors::{DEAD_SEED, GOLDEN_START};

/// A test author: a keypair and an encoder stamping entries from a stepping
/// clock.
pub struct TestFixture {
    pub keypair: Keypair,
    pub clock: Arc<SteppingClock>,
    pub encoder: Encoder<Arc<SteppingClock>>,
}

impl TestFixture {
    /// The author of the golden feed, with the clock at its first reading.
    pub fn new() -> Self {
        Self::with_seed(DEAD_SEED)
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let keypair = Keypair::from_seed(&seed);
        let clock = Arc::new(SteppingClock::starting_at(GOLDEN_START));
        let encoder = Encoder::new(keypair.clone())
            .with_clock(Arc::clone(&clock))
            .with_now_timestamps(true);
        Self {
            keypair,
            clock,
            encoder,
        }
    }

    pub fn author(&self) -> BinaryRef {
        self.encoder.author()
    }

    /// Encode one entry.
    pub fn make_entry(
        &self,
        sequence: u64,
        previous: Option<&BinaryRef>,
        payload: impl Into<Payload>,
    ) -> (Transfer, BinaryRef) {
        self.encoder
            .encode(sequence, previous, payload)
            .expect("fixture entry encodes")
    }

    /// Encode a feed of `count` JSON entries, each chained to the last.
    pub fn make_chain(&self, count: u64) -> Vec<(Transfer, BinaryRef)> {
        let mut out: Vec<(Transfer, BinaryRef)> = Vec::new();
        for seq in 1..=count {
            let previous = out.last().map(|(_, key)| *key);
            let entry = self.make_entry(seq, previous.as_ref(), json!({"type": "test", "i": seq}));
            out.push(entry);
        }
        out
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            TestFixture::with_seed(seed)
        })
        .collect()
}
