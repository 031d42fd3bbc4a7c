//! Cryptographic primitives: Ed25519 signing, SHA-256 addressing and the
//! network domain MAC.
//!
//! This is the only module that touches key material. It performs no size or
//! structural validation of what it signs.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

use crate::error::{Error, Result};
use crate::refs::BinaryRef;

type HmacSha512 = Hmac<Sha512>;

/// Length of an Ed25519 signature on the wire.
pub const SIGNATURE_LEN: usize = 64;

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte key scoping signatures to one network.
///
/// When present, the signed message is `HMAC-SHA-512-256(key, event)`
/// (NaCl `crypto_auth`) instead of the raw event bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct DomainKey([u8; 32]);

impl DomainKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidRef(format!("domain key: {e}")))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidRef(format!("domain key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Authenticate `message` under this key, truncated to 32 bytes.
    pub fn authenticate(&self, message: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha512::new_from_slice(&self.0).expect("HMAC can take key of any size");
        mac.update(message);
        let full = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&full[..32]);
        out
    }
}

impl fmt::Debug for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DomainKey(..)")
    }
}

/// A keypair for signing feed entries.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the raw public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The feed reference identifying this keypair as an author.
    pub fn feed_ref(&self) -> BinaryRef {
        BinaryRef::Feed(self.public_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", hex::encode(&self.public_key()[..8]))
    }
}

/// Sign serialized event bytes, optionally scoped to a network domain.
pub fn sign_event(keypair: &Keypair, event: &[u8], domain: Option<&DomainKey>) -> Signature {
    match domain {
        Some(key) => keypair.sign(&key.authenticate(event)),
        None => keypair.sign(event),
    }
}

/// Check a signature over serialized event bytes.
///
/// Returns `false` for a malformed public key or signature length instead of
/// failing.
pub fn verify_event(
    public_key: &[u8; 32],
    event: &[u8],
    signature: &[u8],
    domain: Option<&DomainKey>,
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = DalekSignature::from_slice(signature) else {
        return false;
    };
    match domain {
        Some(key) => verifying_key.verify(&key.authenticate(event), &sig).is_ok(),
        None => verifying_key.verify(event, &sig).is_ok(),
    }
}
