use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// Monotonic rate gate for automatic re-evaluation.
///
/// Requests arriving inside the interval are dropped, not deferred.
#[derive(Clone, Debug)]
pub struct RateGate {
    interval: Duration,
    last_pass: Option<Instant>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_pass: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when more than `interval` has elapsed since the last committed
    /// pass. Before the first commit the gate is always open.
    pub fn is_open(&self, now: Instant) -> bool {
        self.last_pass
            .map_or(true, |last| now.saturating_duration_since(last) > self.interval)
    }

    /// Restart the window at `now`.
    pub fn commit(&mut self, now: Instant) {
        self.last_pass = Some(now);
    }

    /// `is_open` followed by `commit` when it passes.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        let open = self.is_open(now);
        if open {
            self.commit(now);
        }
        open
    }

    /// Time until the next request would pass.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_pass {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_passes_then_window_closes() {
        let mut gate = RateGate::default();
        let t0 = Instant::now();
        assert!(gate.try_pass(t0));
        assert!(!gate.try_pass(t0 + Duration::from_secs(1)));
        assert!(!gate.try_pass(t0 + Duration::from_secs(10)));
        assert!(gate.try_pass(t0 + Duration::from_millis(10_001)));
    }

    #[test]
    fn dropped_requests_do_not_extend_window() {
        let mut gate = RateGate::new(Duration::from_secs(5));
        let t0 = Instant::now();
        assert!(gate.try_pass(t0));
        assert!(!gate.try_pass(t0 + Duration::from_secs(4)));
        assert!(gate.try_pass(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn remaining_counts_down() {
        let mut gate = RateGate::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert_eq!(gate.remaining(t0), Duration::ZERO);
        gate.try_pass(t0);
        assert_eq!(gate.remaining(t0 + Duration::from_secs(3)), Duration::from_secs(7));
        assert_eq!(gate.remaining(t0 + Duration::from_secs(30)), Duration::ZERO);
    }

    #[test]
    fn window_starts_only_on_commit() {
        let mut gate = RateGate::new(Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(gate.is_open(t0));
        assert!(gate.is_open(t0 + Duration::from_secs(1)));

        gate.commit(t0 + Duration::from_secs(1));
        assert!(!gate.is_open(t0 + Duration::from_secs(2)));
        assert!(gate.is_open(t0 + Duration::from_secs(12)));
    }
}
