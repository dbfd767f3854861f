//! Deterministic keypair sources for tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use solvanity_crypto::{KeyError, KeyMaterial, KeypairSource, ALPHABET};

/// Always returns the same keypair and counts calls.
pub struct FixedSource {
    keypair: KeyMaterial,
    calls: AtomicU64,
}

impl FixedSource {
    pub fn zeros() -> Self {
        Self {
            keypair: KeyMaterial::from_seed(&[0u8; 32]),
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// A two-character prefix this source can never produce
    pub fn unmatched_prefix(&self) -> String {
        let first = self.keypair.address().chars().next();
        let c = ALPHABET
            .chars()
            .find(|c| Some(*c) != first)
            .unwrap_or('z');
        format!("{c}{c}")
    }
}

impl KeypairSource for FixedSource {
    fn generate(&self) -> Result<KeyMaterial, KeyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keypair.clone())
    }
}

/// Replays seeds in order, then repeats the all-zero seed.
pub struct ScriptedSource {
    seeds: Mutex<VecDeque<[u8; 32]>>,
}

impl ScriptedSource {
    pub fn new(seeds: Vec<[u8; 32]>) -> Self {
        Self {
            seeds: Mutex::new(seeds.into()),
        }
    }
}

impl KeypairSource for ScriptedSource {
    fn generate(&self) -> Result<KeyMaterial, KeyError> {
        let seed = self.seeds.lock().unwrap().pop_front().unwrap_or([0u8; 32]);
        Ok(KeyMaterial::from_seed(&seed))
    }
}

/// Simulates an unavailable OS random source.
pub struct FailingSource;

impl KeypairSource for FailingSource {
    fn generate(&self) -> Result<KeyMaterial, KeyError> {
        Err(KeyError::RandomnessUnavailable("randomness source offline".into()))
    }
}

/// Returns the winning seed's keypair on exactly one call, the all-zero
/// seed's keypair on every other.
pub struct WinOnCall {
    winner: [u8; 32],
    on_call: u64,
    calls: AtomicU64,
}

impl WinOnCall {
    pub fn new(winner: [u8; 32], on_call: u64) -> Self {
        Self {
            winner,
            on_call,
            calls: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeypairSource for WinOnCall {
    fn generate(&self) -> Result<KeyMaterial, KeyError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.on_call {
            Ok(KeyMaterial::from_seed(&self.winner))
        } else {
            Ok(KeyMaterial::from_seed(&[0u8; 32]))
        }
    }
}
