//! Messages exchanged between the orchestrator and each search loop

use serde::{Deserialize, Serialize};

use solvanity_crypto::KeyMaterial;
use solvanity_pattern::PatternPosition;

/// Commands into a search loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Start searching. Only honored while the loop is idle.
    Generate {
        characters: String,
        position: PatternPosition,
        worker_id: usize,
        progress_interval_ms: u64,
        yield_interval_attempts: u64,
    },
    /// Suspend attempt generation
    Pause,
    /// Continue after a pause; paused time is not counted as elapsed
    Resume,
    /// Stop and release the loop
    Cancel,
}

/// Events out of a search loop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    /// Periodic status; `rate` is attempts per second of unpaused time
    Progress {
        attempts: u64,
        rate: f64,
        elapsed_ms: u64,
        worker_id: usize,
    },
    /// A matching keypair
    Success {
        public_key: String,
        #[serde(rename = "secretKey")]
        keypair: KeyMaterial,
        attempts: u64,
        duration_ms: u64,
        worker_id: usize,
    },
    Paused {
        worker_id: usize,
    },
    Resumed {
        worker_id: usize,
    },
    Cancelled {
        worker_id: usize,
    },
    /// Fatal failure; the loop has stopped
    Error {
        reason: String,
        worker_id: usize,
    },
}

impl Event {
    pub fn worker_id(&self) -> usize {
        match self {
            Event::Progress { worker_id, .. }
            | Event::Success { worker_id, .. }
            | Event::Paused { worker_id }
            | Event::Resumed { worker_id }
            | Event::Cancelled { worker_id }
            | Event::Error { worker_id, .. } => *worker_id,
        }
    }

    /// True for events after which the loop emits nothing else
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::Success { .. } | Event::Cancelled { .. } | Event::Error { .. }
        )
    }
}
