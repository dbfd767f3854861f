//! Search errors

use thiserror::Error;

use solvanity_pattern::PatternError;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),
    #[error("Could not start any search worker: {0}")]
    ResourceExhausted(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
