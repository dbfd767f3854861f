//! Address encoding: Base58 (Bitcoin/Solana alphabet, no checksum)

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid character '{character}' at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("Invalid base58 input: {0}")]
    Malformed(String),
}

/// The 58 symbols, in digit order. Excludes `0`, `O`, `I` and `l`.
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58 encode a buffer read as a big-endian unsigned integer.
///
/// Every leading zero byte becomes a leading `'1'`, so the output stays
/// bit-exact with other Solana tooling even for fixed-length keys.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Base58 decode
pub fn base58_decode(input: &str) -> Result<Vec<u8>, EncodingError> {
    bs58::decode(input).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            EncodingError::InvalidCharacter { character, index }
        }
        other => EncodingError::Malformed(other.to_string()),
    })
}

/// Returns true if `c` is one of the 58 alphabet symbols.
#[inline]
pub fn is_alphabet_char(c: char) -> bool {
    c.is_ascii() && ALPHABET.as_bytes().contains(&(c as u8))
}

/// A pattern is valid when it is non-empty and drawn solely from [`ALPHABET`].
pub fn is_valid_pattern(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_alphabet_char)
}

/// Distinct characters of `s` that are not in the alphabet, in first-seen order.
pub fn invalid_characters(s: &str) -> Vec<char> {
    let mut invalid = Vec::new();
    for c in s.chars() {
        if !is_alphabet_char(c) && !invalid.contains(&c) {
            invalid.push(c);
        }
    }
    invalid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_shape() {
        assert_eq!(ALPHABET.len(), 58);
        for c in ['0', 'O', 'I', 'l'] {
            assert!(!ALPHABET.contains(c));
        }
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(base58_encode(b"Hello World!"), "2NEpo7TZRRrLZSi2U");
        assert_eq!(base58_encode(&[0u8; 32]), "11111111111111111111111111111111");
        assert_eq!(base58_encode(&[]), "");
    }

    #[test]
    fn test_leading_zeros_preserved() {
        assert_eq!(base58_encode(&[0, 0, 1]), "112");

        let mut key = [0xffu8; 32];
        key[0] = 0;
        key[1] = 0;
        let encoded = base58_encode(&key);
        assert!(encoded.starts_with("11"));
        assert_eq!(base58_decode(&encoded).unwrap(), key.to_vec());
    }

    #[test]
    fn test_roundtrip_varied_buffers() {
        let buffers: Vec<Vec<u8>> = vec![
            vec![0],
            vec![0, 0, 0, 57],
            (0u8..32).collect(),
            (0u8..32).rev().collect(),
            vec![0xde, 0xad, 0xbe, 0xef],
        ];

        for buf in buffers {
            let encoded = base58_encode(&buf);
            assert_eq!(base58_decode(&encoded).unwrap(), buf);
        }
    }

    #[test]
    fn test_roundtrip_random_buffers() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let len = rng.gen_range(0..=64);
            let zeros = rng.gen_range(0..=len.min(8));
            let mut buf = vec![0u8; len];
            rng.fill(&mut buf[zeros..]);

            let encoded = base58_encode(&buf);
            let leading_zeros = buf.iter().take_while(|b| **b == 0).count();
            assert_eq!(encoded.chars().take_while(|c| *c == '1').count(), leading_zeros);
            assert_eq!(base58_decode(&encoded).unwrap(), buf, "{}", encoded);
        }
    }

    #[test]
    fn test_decode_rejects_excluded_symbols() {
        let err = base58_decode("abc0").unwrap_err();
        assert_eq!(err, EncodingError::InvalidCharacter { character: '0', index: 3 });
    }

    #[test]
    fn test_pattern_validation() {
        assert!(is_valid_pattern("9z"));
        assert!(is_valid_pattern("ABCxyz"));
        assert!(is_valid_pattern(ALPHABET));

        assert!(!is_valid_pattern(""));
        for bad in ["0", "O", "I", "l", "ab0", "Hello", "sol_", "é"] {
            assert!(!is_valid_pattern(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_invalid_characters_dedup() {
        assert_eq!(invalid_characters("l0l0x"), vec!['l', '0']);
        assert!(invalid_characters("abc").is_empty());
    }
}
