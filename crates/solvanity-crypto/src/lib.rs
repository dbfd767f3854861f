//! SolVanity Crypto Primitives
//!
//! Base58 address encoding and Ed25519 key generation for vanity search.

pub mod ed25519;
pub mod encoding;
pub mod source;

pub use self::ed25519::{KeyError, KeyMaterial};
pub use self::encoding::{
    base58_decode, base58_encode, invalid_characters, is_alphabet_char, is_valid_pattern, EncodingError,
    ALPHABET,
};
pub use self::source::{KeypairSource, OsKeypairSource};

// Re-export dependencies for use by other crates
pub use bs58;
pub use hex;
