//! Keypair sources for the search loop

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::ed25519::{KeyError, KeyMaterial};

/// Produces one fresh keypair per call.
///
/// Implementations are shared read-only between workers, so `generate`
/// must not depend on mutable state held across calls.
pub trait KeypairSource: Send + Sync {
    /// Generate a new keypair
    fn generate(&self) -> Result<KeyMaterial, KeyError>;
}

/// Uniformly random keypairs seeded from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeypairSource;

impl KeypairSource for OsKeypairSource {
    fn generate(&self) -> Result<KeyMaterial, KeyError> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| KeyError::RandomnessUnavailable(e.to_string()))?;

        let material = KeyMaterial::from_seed(&seed);
        seed.zeroize();
        Ok(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_generates_distinct_keys() {
        let source = OsKeypairSource;
        let a = source.generate().unwrap();
        let b = source.generate().unwrap();
        assert_ne!(a.public_key(), b.public_key());
        assert_eq!(a.secret_key().len(), 64);
    }

    #[test]
    fn test_os_source_is_shareable() {
        let source: std::sync::Arc<dyn KeypairSource> = std::sync::Arc::new(OsKeypairSource);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let source = source.clone();
                std::thread::spawn(move || source.generate().map(|k| k.address()))
            })
            .collect();

        for handle in handles {
            let address = handle.join().unwrap().unwrap();
            assert!(address.len() >= 32 && address.len() <= 44);
        }
    }
}
