//! Ed25519 key material in the Solana keypair layout

use std::fmt;

use ed25519_dalek::SigningKey;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::base58_encode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("Invalid secret key length: expected 32 or 64 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Secret key does not match its embedded public key")]
    PublicKeyMismatch,
}

/// One signing keypair.
///
/// `secret_key` is `seed || public_key`, the 64-byte form Solana wallets
/// import. Both buffers are wiped when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    public_key: [u8; 32],
    secret_key: [u8; 64],
}

impl KeyMaterial {
    /// Derive the keypair for a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let public_key = signing_key.verifying_key().to_bytes();

        let mut secret_key = [0u8; 64];
        secret_key[..32].copy_from_slice(seed);
        secret_key[32..].copy_from_slice(&public_key);

        Self {
            public_key,
            secret_key,
        }
    }

    /// Rebuild from either a bare 32-byte seed or a 64-byte keypair.
    ///
    /// A 64-byte input must carry the public key its seed derives.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let mut seed = [0u8; 32];
        match bytes.len() {
            32 | 64 => seed.copy_from_slice(&bytes[..32]),
            n => return Err(KeyError::InvalidLength(n)),
        }

        let material = Self::from_seed(&seed);
        seed.zeroize();

        if bytes.len() == 64 && bytes[32..] != material.public_key {
            return Err(KeyError::PublicKeyMismatch);
        }
        Ok(material)
    }

    /// Public key bytes (32 bytes)
    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Full keypair bytes (64 bytes: seed || pubkey)
    pub fn secret_key(&self) -> &[u8; 64] {
        &self.secret_key
    }

    /// Base58 address of the public half
    pub fn address(&self) -> String {
        base58_encode(&self.public_key)
    }

    /// Public key as hex
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address())
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Serializes as the 64-number array found in Solana keypair files.
impl Serialize for KeyMaterial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.secret_key.len()))?;
        for byte in &self.secret_key {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }
}
