//! Feed-level validation: checking that one entry correctly follows another.
//!
//! Single entries are checked with [`Transfer::validate`]. A feed store calls
//! the functions here when appending, since only it knows the feed's head.

use crate::crypto::DomainKey;
use crate::error::ValidationError;
use crate::event::Event;
use crate::refs::BinaryRef;
use crate::transfer::Transfer;

/// Check that `next` is the direct successor of the entry with key
/// `prev_key` and event `prev`.
///
/// This verifies:
/// - Same author
/// - Sequence advances by exactly one
/// - `next.previous` points at `prev_key`
pub fn validate_link(
    prev_key: &BinaryRef,
    prev: &Event,
    next: &Event,
) -> Result<(), ValidationError> {
    if next.author != prev.author {
        return Err(ValidationError::AuthorMismatch {
            expected: prev.author,
            got: next.author,
        });
    }

    let expected = prev.sequence.saturating_add(1);
    if next.sequence != expected {
        return Err(ValidationError::InvalidSequence {
            expected,
            got: next.sequence,
        });
    }

    if next.previous.as_ref() != Some(prev_key) {
        return Err(ValidationError::InvalidPrevious {
            expected: *prev_key,
            got: next.previous,
        });
    }

    Ok(())
}

/// Validate an entry against the current head of its feed.
///
/// `head` is `None` for an empty feed, in which case `next` must be the
/// first entry. Returns the parsed event of `next`.
pub fn validate_append(
    head: Option<&Transfer>,
    next: &Transfer,
    domain: Option<&DomainKey>,
) -> Result<Event, ValidationError> {
    let next_event = next.validate(domain)?;

    match head {
        None => {
            if next_event.sequence != 1 {
                return Err(ValidationError::InvalidSequence {
                    expected: 1,
                    got: next_event.sequence,
                });
            }
        }
        Some(head) => {
            let head_event = head.event()?;
            validate_link(&head.key(), &head_event, &next_event)?;
        }
    }

    Ok(next_event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::encoder::Encoder;

    fn encoder(seed: u8) -> Encoder {
        Encoder::new(Keypair::from_seed(&[seed; 32]))
    }

    #[test]
    fn test_valid_chain() {
        let enc = encoder(0x42);
        let (t1, k1) = enc.encode(1, None, "one").unwrap();
        let (t2, k2) = enc.encode(2, Some(&k1), "two").unwrap();
        let (t3, _) = enc.encode(3, Some(&k2), "three").unwrap();

        assert!(validate_append(None, &t1, None).is_ok());
        assert!(validate_append(Some(&t1), &t2, None).is_ok());
        assert!(validate_append(Some(&t2), &t3, None).is_ok());
    }

    #[test]
    fn test_first_entry_must_be_sequence_one() {
        let enc = encoder(0x42);
        let (t2, _) = enc.encode(2, Some(&BinaryRef::Message([1; 32])), "two").unwrap();
        assert!(matches!(
            validate_append(None, &t2, None),
            Err(ValidationError::InvalidSequence { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn test_sequence_gap() {
        let enc = encoder(0x42);
        let (t1, k1) = enc.encode(1, None, "one").unwrap();
        let (t3, _) = enc.encode(3, Some(&k1), "three").unwrap();
        assert!(matches!(
            validate_append(Some(&t1), &t3, None),
            Err(ValidationError::InvalidSequence { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_wrong_previous() {
        let enc = encoder(0x42);
        let (t1, _) = enc.encode(1, None, "one").unwrap();
        let (t2, _) = enc.encode(2, Some(&BinaryRef::Message([9; 32])), "two").unwrap();
        assert!(matches!(
            validate_append(Some(&t1), &t2, None),
            Err(ValidationError::InvalidPrevious { .. })
        ));
    }

    #[test]
    fn test_author_mismatch() {
        let alice = encoder(0x01);
        let bob = encoder(0x02);
        let (t1, k1) = alice.encode(1, None, "one").unwrap();
        let (t2, _) = bob.encode(2, Some(&k1), "two").unwrap();
        assert!(matches!(
            validate_append(Some(&t1), &t2, None),
            Err(ValidationError::AuthorMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_entry_rejected_before_link_check() {
        let enc = encoder(0x42);
        let (t1, k1) = enc.encode(1, None, "one").unwrap();
        let (mut t2, _) = enc.encode(2, Some(&k1), "two").unwrap();
        t2.content = bytes::Bytes::from_static(b"tw0");
        assert!(matches!(
            validate_append(Some(&t1), &t2, None),
            Err(ValidationError::ContentHashMismatch)
        ));
    }

    #[test]
    fn test_unreadable_head_is_malformed() {
        let enc = encoder(0x42);
        let (mut t1, k1) = enc.encode(1, None, "one").unwrap();
        let (t2, _) = enc.encode(2, Some(&k1), "two").unwrap();
        t1.event = bytes::Bytes::from_static(&[0x85]);
        assert!(matches!(
            validate_append(Some(&t1), &t2, None),
            Err(ValidationError::MalformedEvent(_))
        ));
    }
}
