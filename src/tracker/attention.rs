//! Section attention tracking.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

use super::events::Viewport;
use super::observations::AttentionObservation;

#[derive(Debug, Default)]
struct SectionState {
    visible: bool,
    dwell_deadline: Option<Instant>,
    time_visible_ms: u64,
    view_count: u32,
}

/// Accrues visible time per section.
///
/// When a section crosses the visibility threshold a dwell timer starts. If
/// it is still visible when the timer fires, one dwell period of visible time
/// is added, the view count goes up and the running totals are reported.
/// Leaving view before then cancels the timer and nothing is accrued.
#[derive(Debug)]
pub struct AttentionTracker {
    dwell: Duration,
    threshold: f64,
    sections: HashMap<String, SectionState>,
}

impl AttentionTracker {
    pub fn new(dwell: Duration, threshold: f64) -> Self {
        AttentionTracker {
            dwell,
            threshold,
            sections: HashMap::new(),
        }
    }

    /// Starts observing sections; ids already observed are skipped.
    ///
    /// Returns the ids that were newly added.
    pub fn observe<I>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = Vec::new();
        for id in ids {
            if !self.sections.contains_key(&id) {
                self.sections.insert(id.clone(), SectionState::default());
                added.push(id);
            }
        }
        added
    }

    pub fn is_observed(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    pub fn observed_count(&self) -> usize {
        self.sections.len()
    }

    /// Handles an intersection ratio change; unknown sections are ignored.
    pub fn on_intersection(&mut self, id: &str, ratio: f64, now: Instant) {
        let Some(section) = self.sections.get_mut(id) else {
            log::trace!("Intersection for unobserved section '{}'", id);
            return;
        };
        let visible = ratio >= self.threshold;
        if visible && !section.visible {
            section.dwell_deadline = Some(now + self.dwell);
        } else if !visible {
            section.dwell_deadline = None;
        }
        section.visible = visible;
    }

    /// Fires due dwell timers, returning the updated totals of each.
    pub fn poll(&mut self, now: Instant, viewport: Viewport) -> Vec<AttentionObservation> {
        let dwell_ms = self.dwell.as_millis() as u64;
        let mut fired = Vec::new();
        for (id, section) in self.sections.iter_mut() {
            match section.dwell_deadline {
                Some(deadline) if deadline <= now => {
                    section.dwell_deadline = None;
                    if !section.visible {
                        continue;
                    }
                    section.time_visible_ms += dwell_ms;
                    section.view_count += 1;
                    fired.push(AttentionObservation {
                        section_id: id.clone(),
                        time_visible_ms: section.time_visible_ms,
                        view_count: section.view_count,
                        viewport,
                    });
                }
                _ => {}
            }
        }
        fired.sort_by(|a, b| a.section_id.cmp(&b.section_id));
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sections
            .values()
            .filter_map(|s| s.dwell_deadline)
            .min()
    }

    /// Cancels every pending dwell timer.
    pub fn cancel_all(&mut self) {
        for section in self.sections.values_mut() {
            section.dwell_deadline = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn tracker_with(ids: &[&str]) -> AttentionTracker {
        let mut tracker = AttentionTracker::new(ms(500), 0.5);
        tracker.observe(ids.iter().map(|s| s.to_string()));
        tracker
    }

    #[test]
    fn test_observe_skips_known_sections() {
        let mut tracker = tracker_with(&["intro"]);
        let added = tracker.observe(vec!["intro".to_string(), "pricing".to_string()]);
        assert_eq!(added, vec!["pricing".to_string()]);
        assert_eq!(tracker.observed_count(), 2);
        assert!(tracker.is_observed("pricing"));
    }

    #[test]
    fn test_dwell_accrues_time_and_views() {
        let t0 = Instant::now();
        let vp = Viewport::new(1280, 800);
        let mut tracker = tracker_with(&["intro"]);

        tracker.on_intersection("intro", 0.6, t0);
        assert!(tracker.poll(t0 + ms(499), vp).is_empty());
        let fired = tracker.poll(t0 + ms(500), vp);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].time_visible_ms, 500);
        assert_eq!(fired[0].view_count, 1);

        // Leave and come back: totals keep accumulating
        tracker.on_intersection("intro", 0.1, t0 + ms(800));
        tracker.on_intersection("intro", 0.9, t0 + ms(900));
        let fired = tracker.poll(t0 + ms(1400), vp);
        assert_eq!(fired[0].time_visible_ms, 1000);
        assert_eq!(fired[0].view_count, 2);
        assert_eq!(fired[0].viewport, vp);
    }

    #[test]
    fn test_leaving_before_dwell_accrues_nothing() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&["intro"]);
        tracker.on_intersection("intro", 0.5, t0);
        tracker.on_intersection("intro", 0.2, t0 + ms(300));
        assert_eq!(tracker.next_deadline(), None);
        assert!(tracker.poll(t0 + ms(1000), Viewport::default()).is_empty());
    }

    #[test]
    fn test_repeated_visible_updates_do_not_restart_timer() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&["intro"]);
        tracker.on_intersection("intro", 0.6, t0);
        tracker.on_intersection("intro", 0.8, t0 + ms(300));
        assert_eq!(tracker.next_deadline(), Some(t0 + ms(500)));
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&["intro"]);
        tracker.on_intersection("missing", 1.0, t0);
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_cancel_all_clears_timers() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&["a", "b"]);
        tracker.on_intersection("a", 1.0, t0);
        tracker.on_intersection("b", 1.0, t0 + ms(10));
        assert_eq!(tracker.next_deadline(), Some(t0 + ms(500)));
        tracker.cancel_all();
        assert_eq!(tracker.next_deadline(), None);
    }
}
