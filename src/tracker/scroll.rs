//! Scroll depth tracking.

use tokio::time::{Duration, Instant};

use crate::utils::{earliest, Debounce, Throttle};

use super::events::{ScrollEvent, Viewport};
use super::observations::{ScrollBucket, ScrollObservation};

/// Scroll depth of a sample, in whole percent.
///
/// A page with nothing to scroll counts as fully viewed.
pub fn scroll_depth_percent(sample: &ScrollEvent) -> u32 {
    let scrollable = sample.document_height - f64::from(sample.viewport.height);
    if scrollable <= 0.0 {
        return 100;
    }
    let percent = (sample.scroll_top / scrollable * 100.0).clamp(0.0, 100.0);
    percent.round() as u32
}

/// Keeps the deepest scroll position seen and decides when to report it.
///
/// Samples are processed at most once per throttle interval (leading and
/// trailing edge). Reporting is debounced on scroll inactivity; `flush`
/// always reports.
#[derive(Debug)]
pub struct ScrollTracker {
    throttle: Throttle,
    debounce: Debounce,
    pending: Option<ScrollEvent>,
    max_depth: u32,
    viewport: Viewport,
}

impl ScrollTracker {
    pub fn new(throttle: Duration, debounce: Duration, viewport: Viewport) -> Self {
        ScrollTracker {
            throttle: Throttle::new(throttle),
            debounce: Debounce::new(debounce),
            pending: None,
            max_depth: 0,
            viewport,
        }
    }

    /// Records the depth visible before any scrolling, without scheduling a
    /// report. A page shorter than the viewport starts fully viewed.
    pub fn seed(&mut self, sample: ScrollEvent) {
        self.apply(sample);
    }

    pub fn on_scroll(&mut self, sample: ScrollEvent, now: Instant) {
        self.debounce.call(now);
        if self.throttle.call(now) {
            self.apply(sample);
        } else {
            self.pending = Some(sample);
        }
    }

    /// Runs due timers; returns an observation when the debounce fires.
    pub fn poll(&mut self, now: Instant) -> Option<ScrollObservation> {
        if self.throttle.poll(now) {
            if let Some(sample) = self.pending.take() {
                self.apply(sample);
            }
        }
        if self.debounce.poll(now) {
            return Some(self.observation());
        }
        None
    }

    /// Applies any throttled sample and reports the current maximum, even
    /// if the reader never scrolled.
    pub fn flush(&mut self) -> ScrollObservation {
        self.throttle.cancel();
        self.debounce.cancel();
        if let Some(sample) = self.pending.take() {
            self.apply(sample);
        }
        self.observation()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.throttle.deadline(), self.debounce.deadline()])
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn apply(&mut self, sample: ScrollEvent) {
        self.viewport = sample.viewport;
        let depth = scroll_depth_percent(&sample);
        if depth > self.max_depth {
            self.max_depth = depth;
        }
    }

    fn observation(&self) -> ScrollObservation {
        ScrollObservation {
            max_scroll_depth_percent: self.max_depth,
            scroll_bucket: ScrollBucket::from_percent(self.max_depth),
            viewport: self.viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn tracker() -> ScrollTracker {
        ScrollTracker::new(ms(100), ms(250), Viewport::new(1280, 800))
    }

    /// Document 1800px, viewport 800px: 1000px scrollable, so top == depth * 10.
    fn at_depth(depth: u32) -> ScrollEvent {
        ScrollEvent {
            scroll_top: f64::from(depth) * 10.0,
            document_height: 1800.0,
            viewport: Viewport::new(1280, 800),
        }
    }

    #[test]
    fn test_scroll_depth_percent() {
        assert_eq!(scroll_depth_percent(&at_depth(45)), 45);
        let overscroll = ScrollEvent {
            scroll_top: 5000.0,
            ..at_depth(0)
        };
        assert_eq!(scroll_depth_percent(&overscroll), 100);
        let negative = ScrollEvent {
            scroll_top: -20.0,
            ..at_depth(0)
        };
        assert_eq!(scroll_depth_percent(&negative), 0);
    }

    #[test]
    fn test_short_page_counts_as_fully_viewed() {
        let sample = ScrollEvent {
            scroll_top: 0.0,
            document_height: 600.0,
            viewport: Viewport::new(1280, 800),
        };
        assert_eq!(scroll_depth_percent(&sample), 100);
    }

    #[test]
    fn test_max_depth_never_regresses() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        for (i, depth) in [10, 45, 30, 80, 60].into_iter().enumerate() {
            // Spaced past the throttle so every sample is applied
            tracker.on_scroll(at_depth(depth), t0 + ms(200 * i as u64));
        }
        assert_eq!(tracker.max_depth(), 80);
    }

    #[test]
    fn test_throttled_samples_apply_on_trailing_edge() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.on_scroll(at_depth(10), t0);
        tracker.on_scroll(at_depth(30), t0 + ms(20));
        tracker.on_scroll(at_depth(50), t0 + ms(40));
        assert_eq!(tracker.max_depth(), 10);

        assert_eq!(tracker.poll(t0 + ms(100)), None);
        assert_eq!(tracker.max_depth(), 50);
    }

    #[test]
    fn test_report_is_debounced_on_inactivity() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.on_scroll(at_depth(20), t0);
        tracker.on_scroll(at_depth(60), t0 + ms(200));

        assert_eq!(tracker.poll(t0 + ms(300)), None);
        let obs = tracker.poll(t0 + ms(450)).expect("debounce fired");
        assert_eq!(obs.max_scroll_depth_percent, 60);
        assert_eq!(obs.scroll_bucket, ScrollBucket::ThirdQuarter);
        assert_eq!(obs.viewport, Viewport::new(1280, 800));
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_flush_includes_pending_sample() {
        let t0 = Instant::now();
        let mut tracker = tracker();
        tracker.on_scroll(at_depth(10), t0);
        tracker.on_scroll(at_depth(90), t0 + ms(10));
        let obs = tracker.flush();
        assert_eq!(obs.max_scroll_depth_percent, 90);
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_flush_reports_without_any_scroll() {
        let mut tracker = tracker();
        let obs = tracker.flush();
        assert_eq!(obs.max_scroll_depth_percent, 0);
        assert_eq!(obs.scroll_bucket, ScrollBucket::FirstQuarter);
        assert_eq!(obs.viewport, Viewport::new(1280, 800));
    }

    #[test]
    fn test_seeded_short_page_flushes_as_fully_viewed() {
        let mut tracker = tracker();
        tracker.seed(ScrollEvent {
            scroll_top: 0.0,
            document_height: 600.0,
            viewport: Viewport::new(1280, 800),
        });
        // Seeding schedules nothing
        assert_eq!(tracker.next_deadline(), None);
        assert_eq!(tracker.flush().max_scroll_depth_percent, 100);
    }
}
