//! SolVanity Core Engine
//!
//! Multi-threaded vanity address search: independent search loops driven
//! over channels, coordinated by a worker pool that surfaces the first match.

mod aggregate;
mod config;
mod error;
mod pool;
mod protocol;
mod search_loop;
mod state;
mod stats;

#[cfg(test)]
mod testing;

pub use aggregate::{AggregateProgress, ProgressAggregator, WorkerProgress};
pub use config::{available_parallelism, clamp_workers, PerformanceProfile, SearchConfig, MAX_WORKERS};
pub use error::SearchError;
pub use pool::{SearchController, SearchOutcome, SearchResult, SearchUpdate, VanitySearch};
pub use protocol::{Command, Event};
pub use search_loop::{LoopPhase, SearchLoop};
pub use state::SearchState;

// Re-exports for convenience
pub use solvanity_crypto::{KeyMaterial, KeypairSource, OsKeypairSource};
pub use solvanity_pattern::{
    analyze, estimate_time, format_duration, search_space, DifficultyLevel, DifficultyReport,
    PatternPosition, VanityPattern,
};
