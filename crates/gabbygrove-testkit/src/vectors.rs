//! Golden test vectors for cross-implementation verification.
//!
//! These are recorded wire bytes. An implementation that signs the same
//! payloads with the same key and clock must reproduce them exactly.

use std::sync::Arc;

use gabbygrove::{BinaryRef, Encoder, Keypair, Payload, Result, SteppingClock, Transfer};
use serde_json::json;

/// Seed of the author that produced every recorded vector.
pub const DEAD_SEED: [u8; 32] = *b"deaddeaddeaddeaddeaddeaddeaddead";

/// Public key derived from [`DEAD_SEED`].
pub const DEAD_PUBLIC_KEY: &str =
    "aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd";

/// Feed URI of the [`DEAD_SEED`] author.
pub const DEAD_AUTHOR_URI: &str = "ssb:feed/gabbygrove-v1/rtPatlzp4NbFDUb87_tVIpbtIbbgtTemoBhFdc6PXL0=";

/// Clock reading of the first recorded entry (1969-12-31T23:59:55Z).
pub const GOLDEN_START: i64 = -5;

/// A recorded entry of the golden feed.
#[derive(Debug, Clone)]
pub struct GoldenMessage {
    pub name: &'static str,
    pub sequence: u64,
    pub payload: Payload,
    /// The full transfer, hex encoded.
    pub expected_hex: &'static str,
}

/// The three entries of the golden feed, in order.
///
/// Entry `i` is stamped `GOLDEN_START + i` and chained to entry `i - 1`.
pub fn golden_messages() -> Vec<GoldenMessage> {
    let author = Keypair::from_seed(&DEAD_SEED).feed_ref();
    vec![
        GoldenMessage {
            name: "arbitrary_bytes",
            sequence: 1,
            payload: Payload::from(b"\xffs01mBytz".as_slice()),
            expected_hex: "83585385f6d9041a582101aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd012483d9041a582103a7ac59b52aff894ba89508b35f445ae90628f6d5f358157e4f45f39b5b3be96b090058408a3739fdb99d91e28552e9a2e22650c14a8cdbfe607cdca5767569db2b1e24caa3c31d65964143dc752e568b05c99e0e97c198885bfb8f3549b9c6ccbc99120549ff7330316d4279747a",
        },
        GoldenMessage {
            name: "json_test",
            sequence: 2,
            payload: Payload::from(json!({"type": "test", "i": 1})),
            expected_hex: "83587885d9041a582102ccd8fd8392c1b9d1e3026dea42bec93e04b6f8eceb9af2d591489eb8b831c5e1d9041a582101aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd022383d9041a58210395cca4fa7b24abc6049683e716292b00c49509be147aa024c06286bd9b7dbda8160158403a7f29f7395cc454c3904de2236eef2c0147496b77c556ade1a08bf57d3e70d2a43a4c723aeb5366d4f073ceeb8b2677e03ec62e49d1647c670d95cc77f9db07567b2269223a312c2274797065223a2274657374227d0a",
        },
        GoldenMessage {
            name: "json_contact",
            sequence: 3,
            payload: Payload::from(json!({
                "type": "contact",
                "contact": author,
                "spectating": true,
            })),
            expected_hex: "83587985d9041a5821021aaef1f6980c8d9f3f1ebc84dce391212c2f01cd8861943127cd58ec04bc1bb7d9041a582101aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd032283d9041a5821037018dbc9080ae947c1eea299b7c08bd88d1964f6e35847aae835ff68c1ee55ec1875015840071b5eec6e3b0fcdcedbfd187f43fc621cded3bf81ad37f67374454b12e3f6c72b44926e1b487b4892bff1082d6514e022ce58253956cd4a38212b46a9777d0c58757b22636f6e74616374223a227373623a666565642f676162627967726f76652d76312f72745061746c7a70344e624644556238375f745649706274496262677454656d6f42684664633650584c303d222c2273706563746174696e67223a747275652c2274797065223a22636f6e74616374227d0a",
        },
    ]
}

/// The encoder that produced the golden feed: [`DEAD_SEED`], clock timestamps
/// starting at [`GOLDEN_START`].
pub fn golden_encoder() -> Encoder<Arc<SteppingClock>> {
    Encoder::new(Keypair::from_seed(&DEAD_SEED))
        .with_clock(Arc::new(SteppingClock::starting_at(GOLDEN_START)))
        .with_now_timestamps(true)
}

/// Encode the golden feed from scratch.
pub fn encode_golden_feed() -> Result<Vec<(Transfer, BinaryRef)>> {
    let encoder = golden_encoder();
    let mut previous: Option<BinaryRef> = None;
    let mut out = Vec::new();
    for msg in golden_messages() {
        let (tr, key) = encoder.encode(msg.sequence, previous.as_ref(), msg.payload)?;
        previous = Some(key);
        out.push((tr, key));
    }
    Ok(out)
}

/// Re-encode the golden feed and compare against the recorded bytes.
///
/// Returns `(name, matches, got_hex)` per entry.
pub fn verify_golden_messages() -> Vec<(String, bool, String)> {
    let encoded = match encode_golden_feed() {
        Ok(encoded) => encoded,
        Err(e) => {
            return vec![("encode".to_string(), false, e.to_string())];
        }
    };

    golden_messages()
        .iter()
        .zip(encoded)
        .map(|(msg, (tr, _))| {
            let hex = hex::encode(tr.to_cbor());
            let matches = hex == msg.expected_hex;
            (msg.name.to_string(), matches, hex)
        })
        .collect()
}

/// A standalone event: sequence 3, timestamp -3, 105 bytes of JSON content.
pub const EVENT_HEX: &str = "85d9041a5821024226e0304155aeea683a98882ca5683579e1cdd5505597fb76498bf4c4973b98d9041a582101aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd032283d9041a58210327d0b22f26328f03ffce2a7c66b2ee27e337ca5d28cdc89ead668f1dd7f0218b186901";

/// `previous` of [`EVENT_HEX`].
pub const EVENT_PREVIOUS_URI: &str =
    "ssb:message/gabbygrove-v1/QibgMEFVrupoOpiILKVoNXnhzdVQVZf7dkmL9MSXO5g=";

/// Content hash of [`EVENT_HEX`].
pub const EVENT_CONTENT_URI: &str =
    "ssb:content/gabbygrove-v1/J9CyLyYyjwP_zip8ZrLuJ-M3yl0ozcierWaPHdfwIYs=";

/// Everything of an oversized transfer up to and including the content
/// header, which claims 65545 bytes.
const TOO_LARGE_PREFIX: &str = "83585385f6d9041a582101aed3dab65ce9e0d6c50d46fceffb552296ed21b6e0b537a6a0184575ce8f5cbd0124830009d9041a582103e083c9bbcf9d9a5e096f3282216242afe6ec263b6b03b88b7aa509a1ef59d3b25840763688ad9221a30cf05ef71d1e7daa2824741fa0981c67114f1cb0c6cbd63edee8f022fd52a2104eeee0d690995a44c362f971fe34c0531689ae8ae6d75a0f0a5a00010009";

/// Declared content size of [`too_large_transfer`].
pub const TOO_LARGE_CONTENT_SIZE: usize = u16::MAX as usize + 10;

/// Wire bytes of a transfer carrying 65545 bytes of content, produced by an
/// encoder without the size check. Decoding must fail.
pub fn too_large_transfer() -> Vec<u8> {
    let mut data = hex::decode(TOO_LARGE_PREFIX).expect("prefix is valid hex");
    data.resize(data.len() + TOO_LARGE_CONTENT_SIZE, b'A');
    data
}

/// Sequence number of [`largest_message`].
pub const LARGEST_SEQUENCE: u64 = 9_999_999;

/// The largest entry the format allows: 65535 bytes of content at a high
/// sequence number, chained to a made-up previous key.
pub fn largest_message() -> Result<(Transfer, BinaryRef)> {
    let encoder = Encoder::new(Keypair::from_seed(&DEAD_SEED));
    let previous = BinaryRef::Message(*b"b4utb4utb4utb4utb4utb4utb4utb4ut");
    encoder.encode(
        LARGEST_SEQUENCE,
        Some(&previous),
        vec![b'X'; u16::MAX as usize],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_author() {
        let kp = Keypair::from_seed(&DEAD_SEED);
        assert_eq!(hex::encode(kp.public_key()), DEAD_PUBLIC_KEY);
        assert_eq!(kp.feed_ref().to_uri(), DEAD_AUTHOR_URI);
    }

    #[test]
    fn test_golden_feed_matches() {
        for (name, matches, hex) in verify_golden_messages() {
            assert!(matches, "vector '{name}' diverged: {hex}");
        }
    }

    #[test]
    fn test_golden_feed_is_deterministic() {
        let a = encode_golden_feed().unwrap();
        let b = encode_golden_feed().unwrap();
        for ((ta, ka), (tb, kb)) in a.iter().zip(b.iter()) {
            assert_eq!(ta.to_cbor(), tb.to_cbor());
            assert_eq!(ka, kb);
        }
    }

    #[test]
    fn test_too_large_transfer_shape() {
        let data = too_large_transfer();
        assert_eq!(data.len(), TOO_LARGE_PREFIX.len() / 2 + TOO_LARGE_CONTENT_SIZE);
    }
}
