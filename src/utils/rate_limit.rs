//! Timer-driven rate limiters.
//!
//! Both limiters are plain state machines: callers feed them the current
//! instant and ask for the next deadline, so the owning event loop decides
//! how to sleep. Nothing here depends on how a runtime coalesces timers.

use tokio::time::{Duration, Instant};

/// Trailing-edge debounce.
///
/// Every `call` pushes the deadline `wait` past the call; the debounce fires
/// once when the deadline passes without another call.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Debounce {
            wait,
            deadline: None,
        }
    }

    /// Records a call at `now`, restarting the quiet period.
    pub fn call(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Clears a pending firing, returning whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Leading- and trailing-edge throttle.
///
/// The first call in a quiet period runs immediately. Calls inside the
/// interval are coalesced into one trailing run at the end of the interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last_run: None,
            trailing: None,
        }
    }

    /// Records a call at `now`.
    ///
    /// Returns `true` when the caller should run immediately (leading edge).
    /// Otherwise a trailing run is scheduled and reported later by `poll`.
    pub fn call(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                if self.trailing.is_none() {
                    self.trailing = Some(last + self.interval);
                }
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = None;
                true
            }
        }
    }

    /// Returns `true` once when a scheduled trailing run is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.trailing {
            Some(deadline) if deadline <= now => {
                self.trailing = None;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) -> bool {
        self.trailing.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.trailing
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest<I>(deadlines: I) -> Option<Instant>
where
    I: IntoIterator<Item = Option<Instant>>,
{
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debounce_fires_after_quiet_period() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(250));
        debounce.call(t0);
        assert!(!debounce.poll(t0 + ms(249)));
        assert!(debounce.poll(t0 + ms(250)));
        // Fires only once per quiet period
        assert!(!debounce.poll(t0 + ms(500)));
    }

    #[test]
    fn test_debounce_restarts_on_each_call() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(1000));
        debounce.call(t0);
        debounce.call(t0 + ms(900));
        assert!(!debounce.poll(t0 + ms(1000)));
        assert_eq!(debounce.deadline(), Some(t0 + ms(1900)));
        assert!(debounce.poll(t0 + ms(1900)));
    }

    #[test]
    fn test_debounce_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(100));
        assert!(!debounce.cancel());
        debounce.call(t0);
        assert!(debounce.deadline().is_some());
        assert!(debounce.cancel());
        assert!(!debounce.poll(t0 + ms(200)));
    }

    #[test]
    fn test_throttle_leading_edge_runs_immediately() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        assert!(throttle.call(t0));
        assert_eq!(throttle.deadline(), None);
    }

    #[test]
    fn test_throttle_coalesces_into_trailing_run() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        assert!(throttle.call(t0));
        assert!(!throttle.call(t0 + ms(10)));
        assert!(!throttle.call(t0 + ms(60)));
        assert_eq!(throttle.deadline(), Some(t0 + ms(100)));
        assert!(!throttle.poll(t0 + ms(99)));
        assert!(throttle.poll(t0 + ms(100)));
        // The trailing run starts a new interval
        assert!(!throttle.call(t0 + ms(150)));
        assert!(throttle.poll(t0 + ms(200)));
    }

    #[test]
    fn test_throttle_runs_again_after_interval() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        assert!(throttle.call(t0));
        assert!(throttle.call(t0 + ms(100)));
        assert!(throttle.call(t0 + ms(250)));
    }

    #[test]
    fn test_earliest_skips_missing_deadlines() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, None]), None);
        assert_eq!(earliest([None, Some(t0 + ms(5)), Some(t0 + ms(2))]), Some(t0 + ms(2)));
    }
}
