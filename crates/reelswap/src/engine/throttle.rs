use std::time::{Duration, Instant};

/// Drops updates that arrive sooner than `interval` after the last accepted one.
pub struct ProgressThrottle {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Returns true (and records `now`) if an update may go through.
    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_always_passes() {
        let mut t = ProgressThrottle::new(Duration::from_millis(250));
        assert!(t.accept(Instant::now()));
    }

    #[test]
    fn updates_inside_window_are_dropped() {
        let mut t = ProgressThrottle::new(Duration::from_millis(250));
        let t0 = Instant::now();
        assert!(t.accept(t0));
        assert!(!t.accept(t0 + Duration::from_millis(100)));
        assert!(!t.accept(t0 + Duration::from_millis(249)));
        assert!(t.accept(t0 + Duration::from_millis(250)));
        // Window restarts from the last accepted update.
        assert!(!t.accept(t0 + Duration::from_millis(400)));
        assert!(t.accept(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn zero_interval_accepts_everything() {
        let mut t = ProgressThrottle::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(t.accept(t0));
        assert!(t.accept(t0));
    }
}
