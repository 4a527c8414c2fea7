//! Trailing-edge debounce driven by caller-supplied instants.
//!
//! The engine never reads the clock here: the host passes `now` to every
//! call, so tests can step time explicitly and the browser facade can
//! drive it from a timer callback.

use std::time::Duration;

use web_time::Instant;

/// Fires once after `quiet` has elapsed since the last [`touch`](Self::touch).
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub const fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending edit will fire, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once when `now` reaches the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.touch(t0);
        assert!(!d.poll(t0 + Duration::from_millis(499)));
        assert!(d.poll(t0 + QUIET));
        assert!(!d.poll(t0 + Duration::from_secs(5)));
        assert!(!d.is_pending());
    }

    #[test]
    fn touch_pushes_deadline_back() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.touch(t0);
        d.touch(t0 + Duration::from_millis(400));
        assert!(!d.poll(t0 + Duration::from_millis(600)));
        assert!(d.poll(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_clears_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.touch(t0);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + QUIET));
    }

    #[test]
    fn idle_never_fires() {
        let mut d = Debouncer::new(Duration::ZERO);
        assert!(!d.poll(Instant::now()));
    }
}
