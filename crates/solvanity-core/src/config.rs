//! Search configuration and performance profiles

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Hard cap on concurrent search loops
pub const MAX_WORKERS: usize = 4;

/// Trade-off between device responsiveness and search throughput
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceProfile {
    /// One worker, frequent yields
    Eco,
    #[default]
    Balanced,
    /// As many workers as the device allows
    Performance,
}

impl PerformanceProfile {
    /// Requested worker count, before clamping
    pub fn worker_count(self) -> usize {
        match self {
            PerformanceProfile::Eco => 1,
            PerformanceProfile::Balanced => 2,
            PerformanceProfile::Performance => MAX_WORKERS,
        }
    }

    pub fn progress_interval_ms(self) -> u64 {
        match self {
            PerformanceProfile::Eco => 250,
            PerformanceProfile::Balanced => 200,
            PerformanceProfile::Performance => 100,
        }
    }

    pub fn yield_interval_attempts(self) -> u64 {
        match self {
            PerformanceProfile::Eco => 1_000,
            PerformanceProfile::Balanced => 5_000,
            PerformanceProfile::Performance => 10_000,
        }
    }
}

impl FromStr for PerformanceProfile {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eco" => Ok(PerformanceProfile::Eco),
            "balanced" => Ok(PerformanceProfile::Balanced),
            "performance" | "perf" => Ok(PerformanceProfile::Performance),
            _ => Err(SearchError::Config(format!("unknown performance profile '{}'", s))),
        }
    }
}

impl fmt::Display for PerformanceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceProfile::Eco => write!(f, "eco"),
            PerformanceProfile::Balanced => write!(f, "balanced"),
            PerformanceProfile::Performance => write!(f, "performance"),
        }
    }
}

/// Search configuration
///
/// Unset overrides fall back to the profile's presets. Every field has a
/// default, so a partial JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    pub profile: PerformanceProfile,
    /// Worker count override (still clamped)
    pub workers: Option<usize>,
    pub progress_interval_ms: Option<u64>,
    pub yield_interval_attempts: Option<u64>,
}

impl SearchConfig {
    pub fn from_profile(profile: PerformanceProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        serde_json::from_str(json).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Worker count before clamping
    pub fn requested_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| self.profile.worker_count())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(
            self.progress_interval_ms
                .unwrap_or_else(|| self.profile.progress_interval_ms()),
        )
    }

    pub fn yield_interval(&self) -> u64 {
        self.yield_interval_attempts
            .unwrap_or_else(|| self.profile.yield_interval_attempts())
            .max(1)
    }
}

/// Clamp a requested worker count to what the host can spare.
///
/// Leaves one hardware thread free and never exceeds [`MAX_WORKERS`],
/// but always allows at least one worker.
pub fn clamp_workers(requested: usize, available: usize) -> usize {
    requested
        .min(available.saturating_sub(1))
        .min(MAX_WORKERS)
        .max(1)
}

/// Hardware threads available to this process
pub fn available_parallelism() -> usize {
    num_cpus::get()
}
