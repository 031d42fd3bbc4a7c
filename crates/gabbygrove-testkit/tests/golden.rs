//! Golden vectors for cross-implementation verification.
//!
//! Every implementation must produce, for the same key, clock and payloads:
//! - identical transfer bytes (deterministic Ed25519)
//! - identical message keys
//! - identical decoded events

use gabbygrove::{
    BinaryRef, ContentType, DomainKey, Encoder, Error, Event, Keypair, Transfer, ValidationError,
};
use gabbygrove_testkit::vectors::{
    encode_golden_feed, golden_messages, largest_message, too_large_transfer, DEAD_AUTHOR_URI,
    DEAD_SEED, EVENT_CONTENT_URI, EVENT_HEX, EVENT_PREVIOUS_URI, GOLDEN_START, LARGEST_SEQUENCE,
    TOO_LARGE_CONTENT_SIZE,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn golden_transfer(idx: usize) -> Transfer {
    let bytes = hex::decode(golden_messages()[idx].expected_hex).unwrap();
    Transfer::from_cbor(&bytes).unwrap()
}

#[test]
fn test_encoder_reproduces_golden_bytes() {
    init_tracing();
    let encoded = encode_golden_feed().unwrap();

    for (msg, (tr, _)) in golden_messages().iter().zip(encoded.iter()) {
        let got = tr.to_cbor();
        let want = hex::decode(msg.expected_hex).unwrap();
        assert_eq!(got.len(), want.len(), "{}: wrong length", msg.name);
        assert_eq!(hex::encode(&got), msg.expected_hex, "{}: bytes differ", msg.name);
        assert!(tr.verify(None), "{}: did not verify", msg.name);
    }
}

#[test]
fn test_golden_transfers_decode() {
    init_tracing();
    for (idx, msg) in golden_messages().iter().enumerate() {
        let tr = golden_transfer(idx);
        assert!(tr.verify(None), "{}: did not verify", msg.name);
        assert_eq!(tr.to_cbor(), hex::decode(msg.expected_hex).unwrap());

        let evt = tr.event().unwrap();
        assert_eq!(evt.author.to_uri(), DEAD_AUTHOR_URI);
        assert_eq!(evt.sequence, msg.sequence);
        assert_eq!(evt.timestamp, GOLDEN_START + idx as i64);
        assert_ne!(evt.content.size, 0);

        if idx == 0 {
            assert_eq!(evt.previous, None);
            assert_eq!(evt.content.content_type, ContentType::Arbitrary);
        } else {
            assert!(evt.previous.is_some());
            assert_eq!(evt.content.content_type, ContentType::Json);
        }
    }
}

#[test]
fn test_golden_feed_chains_by_key() {
    let feed: Vec<Transfer> = (0..3).map(golden_transfer).collect();

    assert_eq!(
        hex::encode(feed[0].key().digest()),
        "ccd8fd8392c1b9d1e3026dea42bec93e04b6f8eceb9af2d591489eb8b831c5e1"
    );
    assert_eq!(
        hex::encode(feed[1].key().digest()),
        "1aaef1f6980c8d9f3f1ebc84dce391212c2f01cd8861943127cd58ec04bc1bb7"
    );

    for pair in feed.windows(2) {
        assert_eq!(pair[1].previous().unwrap(), Some(pair[0].key()));
    }

    let mut head: Option<&Transfer> = None;
    for tr in &feed {
        gabbygrove::validate_append(head, tr, None).unwrap();
        head = Some(tr);
    }
}

#[test]
fn test_golden_content() {
    assert_eq!(golden_transfer(0).content_bytes(), b"\xffs01mBytz");

    let json = golden_transfer(1).content_json().unwrap();
    assert_eq!(json["type"], "test");
    assert_eq!(json["i"], 1);

    let contact = golden_transfer(2).content_json().unwrap();
    assert_eq!(contact["contact"], DEAD_AUTHOR_URI);
    assert_eq!(contact["spectating"], true);
    let contact_ref: BinaryRef = contact["contact"].as_str().unwrap().parse().unwrap();
    assert_eq!(contact_ref, Keypair::from_seed(&DEAD_SEED).feed_ref());
}

#[test]
fn test_event_decode() {
    let evt = Event::from_cbor(&hex::decode(EVENT_HEX).unwrap()).unwrap();

    assert_eq!(evt.author.to_uri(), DEAD_AUTHOR_URI);
    assert_eq!(evt.previous.unwrap().to_uri(), EVENT_PREVIOUS_URI);
    assert_eq!(evt.content.hash.to_uri(), EVENT_CONTENT_URI);
    assert_eq!(evt.content.size, 105);
    assert_eq!(evt.content.content_type, ContentType::Json);
    assert_eq!(evt.sequence, 3);
    assert_eq!(evt.timestamp, -3);
}

#[test]
fn test_encode_largest_message() {
    let (tr, key) = largest_message().unwrap();
    assert_eq!(tr.content.len(), u16::MAX as usize);

    let wire = tr.to_cbor();
    let decoded = Transfer::from_cbor(&wire).unwrap();
    assert_eq!(decoded, tr);
    assert_eq!(decoded.key(), key);
    assert!(decoded.verify(None));

    let evt = decoded.event().unwrap();
    assert_eq!(evt.sequence, LARGEST_SEQUENCE);
    assert_eq!(evt.timestamp, 0);
    assert_eq!(
        evt.previous,
        Some(BinaryRef::Message(*b"b4utb4utb4utb4utb4utb4utb4utb4ut"))
    );
}

#[test]
fn test_encode_too_large() {
    let encoder = Encoder::new(Keypair::from_seed(&DEAD_SEED));
    let result = encoder.encode(1, None, vec![b'A'; TOO_LARGE_CONTENT_SIZE]);
    assert!(matches!(result, Err(Error::ContentTooLarge { size: 65545 })));
}

#[test]
fn test_decode_content_too_large() {
    let err = Transfer::from_cbor(&too_large_transfer()).unwrap_err();
    assert!(matches!(err, Error::ContentTooLarge { size: 65545 }));
}

#[test]
fn test_tampering_detected() {
    init_tracing();
    let good = golden_transfer(1);

    let mut bad_sig = good.clone();
    let mut sig = bad_sig.signature.to_vec();
    sig[10] ^= 0x01;
    bad_sig.signature = sig.into();
    assert!(matches!(
        bad_sig.validate(None),
        Err(ValidationError::SignatureFailed)
    ));
    assert!(!bad_sig.verify(None));

    let mut bad_content = good.clone();
    let mut content = bad_content.content.to_vec();
    content[2] = b'j';
    bad_content.content = content.into();
    assert!(matches!(
        bad_content.validate(None),
        Err(ValidationError::ContentHashMismatch)
    ));

    let mut short = good.clone();
    short.content = short.content.slice(1..);
    assert!(matches!(
        short.validate(None),
        Err(ValidationError::ContentSizeMismatch { .. })
    ));

    let other_network = DomainKey::from_bytes([0x0b; 32]);
    assert!(!good.verify(Some(&other_network)));
}

#[test]
fn test_truncated_transfers_rejected() {
    let wire = hex::decode(golden_messages()[2].expected_hex).unwrap();
    for cut in [0, 1, 2, 50, wire.len() - 1] {
        assert!(
            Transfer::from_cbor(&wire[..cut]).is_err(),
            "accepted transfer cut at {cut}"
        );
    }

    let mut trailing = wire.clone();
    trailing.push(0x00);
    assert!(matches!(
        Transfer::from_cbor(&trailing),
        Err(Error::MalformedTransfer(_))
    ));
}
