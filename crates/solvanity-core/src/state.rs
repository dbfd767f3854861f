//! Per-loop search state

use std::time::{Duration, Instant};

/// Attempt counter and pause-aware clock owned by one search loop.
///
/// Elapsed time never includes paused intervals, so rates computed from it
/// reflect actual search throughput.
#[derive(Debug, Clone)]
pub struct SearchState {
    attempts: u64,
    started_at: Instant,
    paused_accumulated: Duration,
    pause_started: Option<Instant>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(now: Instant) -> Self {
        Self {
            attempts: 0,
            started_at: now,
            paused_accumulated: Duration::ZERO,
            pause_started: None,
        }
    }

    /// Count one attempt, returning the new total
    #[inline]
    pub fn record_attempt(&mut self) -> u64 {
        self.attempts += 1;
        self.attempts
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started.is_some()
    }

    /// Returns false if already paused.
    pub fn pause_at(&mut self, now: Instant) -> bool {
        if self.pause_started.is_some() {
            return false;
        }
        self.pause_started = Some(now);
        true
    }

    /// Returns false if not paused.
    pub fn resume_at(&mut self, now: Instant) -> bool {
        match self.pause_started.take() {
            Some(since) => {
                self.paused_accumulated += now.saturating_duration_since(since);
                true
            }
            None => false,
        }
    }

    /// Total paused time, including a pause still in progress
    pub fn paused_at(&self, now: Instant) -> Duration {
        let current = self
            .pause_started
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        self.paused_accumulated + current
    }

    /// Unpaused time since the search started
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
            .saturating_sub(self.paused_at(now))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Attempts per second of unpaused time
    pub fn rate_at(&self, now: Instant) -> f64 {
        let secs = self.elapsed_at(now).as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pause_excluded_from_elapsed() {
        let t0 = Instant::now();
        let mut state = SearchState::started_at(t0);

        assert!(state.pause_at(t0 + ms(1000)));
        assert!(state.resume_at(t0 + ms(1500)));

        assert_eq!(state.elapsed_at(t0 + ms(2500)), ms(2000));
    }

    #[test]
    fn test_open_pause_freezes_elapsed() {
        let t0 = Instant::now();
        let mut state = SearchState::started_at(t0);

        state.pause_at(t0 + ms(300));
        assert_eq!(state.elapsed_at(t0 + ms(300)), ms(300));
        assert_eq!(state.elapsed_at(t0 + ms(5000)), ms(300));
        assert!(state.is_paused());
    }

    #[test]
    fn test_repeated_pause_and_resume_are_idempotent() {
        let t0 = Instant::now();
        let mut state = SearchState::started_at(t0);

        assert!(state.pause_at(t0 + ms(100)));
        assert!(!state.pause_at(t0 + ms(200)));
        assert!(state.resume_at(t0 + ms(300)));
        assert!(!state.resume_at(t0 + ms(400)));

        assert_eq!(state.paused_at(t0 + ms(1000)), ms(200));
    }

    #[test]
    fn test_rate_uses_unpaused_time() {
        let t0 = Instant::now();
        let mut state = SearchState::started_at(t0);
        for _ in 0..200 {
            state.record_attempt();
        }

        state.pause_at(t0 + ms(1000));
        state.resume_at(t0 + ms(3000));

        let rate = state.rate_at(t0 + ms(2000 + 2000));
        assert!((rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_rate() {
        let t0 = Instant::now();
        let state = SearchState::started_at(t0);
        assert_eq!(state.rate_at(t0), 0.0);
    }
}
