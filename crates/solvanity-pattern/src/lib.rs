//! SolVanity Pattern Matching Engine
//!
//! Pattern types: prefix, suffix

mod difficulty;
mod matcher;

pub use difficulty::{
    analyze, estimate_time, expected_attempts, format_count, format_duration, search_space, DifficultyLevel,
    DifficultyReport, MAX_ESTIMATED_ATTEMPTS,
};
pub use matcher::{PatternError, PatternPosition, VanityPattern};
