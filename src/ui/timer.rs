// src/ui/timer.rs
//! Cancellable debounce timer driven by caller-supplied timestamps

use embassy_time::{Duration, Instant};

/// Fires once after a burst of triggers has been quiet for `delay`.
///
/// Every `restart` replaces the pending deadline, so only the last trigger of
/// a burst can ever fire.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the deadline has passed.
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

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn fires_once_after_delay() {
        let mut debounce = Debounce::new(Duration::from_millis(80));
        debounce.restart(at(0));

        assert!(!debounce.poll(at(79)));
        assert!(debounce.poll(at(80)));
        assert!(!debounce.poll(at(200)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn restart_pushes_deadline_back() {
        let mut debounce = Debounce::new(Duration::from_millis(80));
        debounce.restart(at(0));
        debounce.restart(at(50));

        assert!(!debounce.poll(at(100)));
        assert!(debounce.poll(at(130)));
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.restart(at(0));
        debounce.cancel();

        assert!(!debounce.poll(at(1_000)));
    }
}
