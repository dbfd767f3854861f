//! Live search statistics

use std::time::Duration;

use solvanity_pattern::{format_count, format_duration};

use crate::aggregate::AggregateProgress;

impl AggregateProgress {
    /// Unpaused elapsed time of the longest-running worker
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Probability that at least one match has been found by now,
    /// for a pattern with `search_space` equally likely outcomes.
    pub fn probability(&self, search_space: f64) -> f64 {
        if search_space > 0.0 {
            1.0 - (-(self.total_attempts as f64) / search_space).exp()
        } else {
            0.0
        }
    }

    /// Time until the 50% probability mark at the current rate.
    ///
    /// `None` while no rate is known; zero once the mark is passed.
    pub fn eta(&self, search_space: f64) -> Option<Duration> {
        if !(self.total_rate.is_finite() && self.total_rate > 0.0) {
            return None;
        }
        let keys_for_half = search_space * std::f64::consts::LN_2;
        let remaining = (keys_for_half - self.total_attempts as f64).max(0.0);
        Duration::try_from_secs_f64(remaining / self.total_rate).ok()
    }

    /// One-line status: rate, total, probability and time to the 50% mark
    pub fn format(&self, search_space: f64) -> String {
        let eta = match self.eta(search_space) {
            Some(eta) if eta.is_zero() => "now".to_string(),
            Some(eta) => format_duration(eta),
            None => "?".to_string(),
        };

        format!(
            "[{} key/s][Total {}][Prob {:.1}%][50% in {}]",
            format_count(self.total_rate),
            format_count(self.total_attempts as f64),
            self.probability(search_space) * 100.0,
            eta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(total_attempts: u64, total_rate: f64) -> AggregateProgress {
        AggregateProgress {
            total_attempts,
            total_rate,
            elapsed_ms: 1000,
            workers_reporting: 1,
        }
    }

    #[test]
    fn test_probability() {
        assert_eq!(progress(0, 0.0).probability(3364.0), 0.0);
        let p = progress(3364, 100.0).probability(3364.0);
        assert!((p - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_eta() {
        assert_eq!(progress(10, 0.0).eta(1000.0), None);
        // 1000 * ln 2 ~= 693 keys at 100 key/s
        let eta = progress(0, 100.0).eta(1000.0).unwrap();
        assert!((eta.as_secs_f64() - 6.931).abs() < 0.01);
        assert_eq!(progress(5000, 100.0).eta(1000.0), Some(Duration::ZERO));
    }

    #[test]
    fn test_format() {
        let line = progress(1500, 2500.0).format(195_112.0);
        assert!(line.starts_with("[2.50K key/s][Total 1.50K]"), "{}", line);
        assert!(line.contains("50% in 53s"), "{}", line);
    }

    #[test]
    fn test_format_long_and_passed_eta() {
        // ~3.8h to the 50% mark at 1 key/s
        let line = progress(0, 1.0).format(20_000.0);
        assert!(line.ends_with("[50% in 3h 51m]"), "{}", line);

        let line = progress(50_000, 10.0).format(20_000.0);
        assert!(line.ends_with("[50% in now]"), "{}", line);

        let line = progress(0, 0.0).format(20_000.0);
        assert!(line.ends_with("[50% in ?]"), "{}", line);
    }
}
