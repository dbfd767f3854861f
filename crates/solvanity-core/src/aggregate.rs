//! Progress aggregation across workers

use std::collections::BTreeMap;

use serde::Serialize;

/// Latest progress reported by one worker
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkerProgress {
    pub attempts: u64,
    pub rate: f64,
    pub elapsed_ms: u64,
}

/// Combined view over every worker's latest report
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateProgress {
    /// Sum of attempts
    pub total_attempts: u64,
    /// Sum of rates, attempts per second
    pub total_rate: f64,
    /// Largest unpaused elapsed time
    pub elapsed_ms: u64,
    /// Workers that have reported at least once
    pub workers_reporting: usize,
}

/// Keeps the most recent report per worker and recomputes the totals.
///
/// Reports may arrive interleaved across workers in any order.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    latest: BTreeMap<usize, WorkerProgress>,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a worker's report and return the new aggregate
    pub fn record(&mut self, worker_id: usize, progress: WorkerProgress) -> AggregateProgress {
        self.latest.insert(worker_id, progress);
        self.snapshot()
    }

    /// A stopped worker keeps its attempts but no longer contributes rate.
    pub fn mark_stopped(&mut self, worker_id: usize) {
        if let Some(progress) = self.latest.get_mut(&worker_id) {
            progress.rate = 0.0;
        }
    }

    pub fn snapshot(&self) -> AggregateProgress {
        self.latest.values().fold(
            AggregateProgress {
                workers_reporting: self.latest.len(),
                ..AggregateProgress::default()
            },
            |mut acc, p| {
                acc.total_attempts += p.attempts;
                acc.total_rate += p.rate;
                acc.elapsed_ms = acc.elapsed_ms.max(p.elapsed_ms);
                acc
            },
        )
    }
}
