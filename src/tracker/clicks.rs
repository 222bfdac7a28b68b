//! Click, dead-click and rage-click tracking.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

use crate::config::HEATMAP_ID_ATTR;
use crate::utils::Debounce;

use super::events::{ClickEvent, ElementInfo};
use super::observations::{ClickObservation, RageClickObservation};

const ARTICLE_SELECTOR: &str = "article";
const FALLBACK_CONTAINER_SELECTOR: &str = "body";

/// Returns `true` if nothing on the path would react to a click.
///
/// A click is live when the target has a script handler or an `onclick`
/// attribute, or when the target or any ancestor is a link, a button, a
/// `role="button"` element or carries `onclick`.
pub fn is_dead_click(path: &[ElementInfo]) -> bool {
    let Some(target) = path.first() else {
        return true;
    };
    if target.has_click_handler {
        return false;
    }
    !path.iter().any(is_interactive)
}

fn is_interactive(element: &ElementInfo) -> bool {
    matches!(element.tag.as_str(), "a" | "button")
        || element.attr("role") == Some("button")
        || element.attr("onclick").is_some()
}

/// Nearest `data-heatmap-id` on the path.
pub fn heatmap_id(path: &[ElementInfo]) -> Option<String> {
    path.iter()
        .find_map(|element| element.attr(HEATMAP_ID_ATTR))
        .map(str::to_string)
}

/// Finds the content container on the path: an `<article>` first, then an
/// element carrying `content_class`. Returns the selector that names it.
pub fn find_content_container<'a>(
    path: &'a [ElementInfo],
    content_class: &str,
) -> Option<(String, &'a ElementInfo)> {
    if let Some(article) = path.iter().find(|e| e.tag == ARTICLE_SELECTOR) {
        return Some((ARTICLE_SELECTOR.to_string(), article));
    }
    path.iter()
        .find(|e| e.has_class(content_class))
        .map(|e| (format!(".{content_class}"), e))
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        (value / total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Builds the observation for a click.
pub fn observe_click(click: &ClickEvent, content_class: &str) -> ClickObservation {
    let target = click.path.first();

    let (container_selector, content_x, content_y) =
        match find_content_container(&click.path, content_class) {
            Some((selector, container)) => match container.rect {
                Some(rect) => (
                    selector,
                    Some(percent_of(click.client_x - rect.left, rect.width)),
                    Some(click.client_y - rect.top),
                ),
                None => (selector, None, None),
            },
            None => (FALLBACK_CONTAINER_SELECTOR.to_string(), None, None),
        };

    ClickObservation {
        x_percent: percent_of(click.page_x, click.document_width),
        y_percent: percent_of(click.page_y, click.document_height),
        content_x,
        content_y,
        scroll_y: click.scroll_y,
        container_selector,
        element_tag: target.map(|t| t.tag.clone()).unwrap_or_default(),
        element_class: target.and_then(|t| t.class.clone()),
        element_id: target.and_then(|t| t.id.clone()),
        heatmap_id: heatmap_id(&click.path),
        is_dead_click: is_dead_click(&click.path),
        viewport: click.viewport,
    }
}

#[derive(Debug, Clone, Copy)]
struct RageWindow {
    count: u32,
    first_click: Instant,
}

/// Counts clicks per grid cell inside a short window.
///
/// Cells are `cell_percent` wide on both axes of the document. An entry
/// older than the window is reset by the next click in its cell; entries are
/// never removed otherwise.
#[derive(Debug)]
pub struct RageClickDetector {
    window: Duration,
    threshold: u32,
    cell_percent: f64,
    cells: HashMap<(i64, i64), RageWindow>,
}

impl RageClickDetector {
    pub fn new(window: Duration, threshold: u32, cell_percent: f64) -> Self {
        RageClickDetector {
            window,
            threshold,
            cell_percent,
            cells: HashMap::new(),
        }
    }

    fn cell(&self, x_percent: f64, y_percent: f64) -> (i64, i64) {
        (
            (x_percent / self.cell_percent).floor() as i64,
            (y_percent / self.cell_percent).floor() as i64,
        )
    }

    /// Records a click; returns `(click_count, elapsed)` once the cell reaches the threshold.
    pub fn record(&mut self, x_percent: f64, y_percent: f64, now: Instant) -> Option<(u32, Duration)> {
        let cell = self.cell(x_percent, y_percent);
        let window = self.window;
        let entry = self
            .cells
            .entry(cell)
            .and_modify(|w| {
                if now.saturating_duration_since(w.first_click) < window {
                    w.count += 1;
                } else {
                    *w = RageWindow {
                        count: 1,
                        first_click: now,
                    };
                }
            })
            .or_insert(RageWindow {
                count: 1,
                first_click: now,
            });

        (entry.count >= self.threshold)
            .then(|| (entry.count, now.saturating_duration_since(entry.first_click)))
    }
}

/// Buffers clicks and flushes them in batches after click inactivity.
#[derive(Debug)]
pub struct ClickTracker {
    content_class: String,
    buffer: Vec<ClickObservation>,
    debounce: Debounce,
    rage: RageClickDetector,
}

impl ClickTracker {
    pub fn new(content_class: &str, debounce: Duration, rage: RageClickDetector) -> Self {
        ClickTracker {
            content_class: content_class.to_string(),
            buffer: Vec::new(),
            debounce: Debounce::new(debounce),
            rage,
        }
    }

    /// Buffers the click and returns a rage click to send right away, if any.
    pub fn on_click(&mut self, click: &ClickEvent, now: Instant) -> Option<RageClickObservation> {
        let obs = observe_click(click, &self.content_class);
        let rage = self
            .rage
            .record(obs.x_percent, obs.y_percent, now)
            .map(|(click_count, elapsed)| RageClickObservation {
                x_percent: obs.x_percent,
                y_percent: obs.y_percent,
                click_count,
                time_window_ms: elapsed.as_millis() as u64,
                element_tag: obs.element_tag.clone(),
                element_class: obs.element_class.clone(),
                element_id: obs.element_id.clone(),
                heatmap_id: obs.heatmap_id.clone(),
                viewport: obs.viewport,
            });

        self.buffer.push(obs);
        self.debounce.call(now);
        rage
    }

    /// Returns the buffered batch when the debounce fires.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<ClickObservation>> {
        if self.debounce.poll(now) {
            self.take_batch()
        } else {
            None
        }
    }

    /// Returns whatever is buffered, cancelling the pending debounce.
    pub fn flush(&mut self) -> Option<Vec<ClickObservation>> {
        self.debounce.cancel();
        self.take_batch()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    // The buffer is swapped out before the batch is sent, so clicks arriving
    // while a request is in flight start a new batch.
    fn take_batch(&mut self) -> Option<Vec<ClickObservation>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::events::{Rect, Viewport};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn click_at(page_x: f64, page_y: f64, path: Vec<ElementInfo>) -> ClickEvent {
        ClickEvent {
            page_x,
            page_y,
            client_x: page_x,
            client_y: page_y - 500.0,
            scroll_y: 500.0,
            document_width: 1000.0,
            document_height: 4000.0,
            viewport: Viewport::new(1000, 800),
            path,
        }
    }

    fn plain_span_path() -> Vec<ElementInfo> {
        vec![
            ElementInfo::new("span"),
            ElementInfo::new("p"),
            ElementInfo::new("body"),
        ]
    }

    #[test]
    fn test_plain_span_is_dead_click() {
        assert!(is_dead_click(&plain_span_path()));
    }

    #[test]
    fn test_span_inside_link_is_live() {
        let path = vec![
            ElementInfo::new("span"),
            ElementInfo::new("a").with_attr("href", "/next"),
            ElementInfo::new("body"),
        ];
        assert!(!is_dead_click(&path));
    }

    #[test]
    fn test_handlers_and_roles_are_live() {
        let handler = vec![ElementInfo::new("div").with_click_handler()];
        assert!(!is_dead_click(&handler));

        let role = vec![
            ElementInfo::new("span"),
            ElementInfo::new("div").with_attr("role", "button"),
        ];
        assert!(!is_dead_click(&role));

        let onclick = vec![ElementInfo::new("img"), ElementInfo::new("div").with_attr("onclick", "go()")];
        assert!(!is_dead_click(&onclick));

        let button = vec![ElementInfo::new("svg"), ElementInfo::new("button")];
        assert!(!is_dead_click(&button));
    }

    #[test]
    fn test_handler_on_ancestor_does_not_make_click_live() {
        let path = vec![ElementInfo::new("span"), ElementInfo::new("div").with_click_handler()];
        assert!(is_dead_click(&path));
    }

    #[test]
    fn test_container_prefers_article() {
        let path = vec![
            ElementInfo::new("span"),
            ElementInfo::new("div").with_class("post-content"),
            ElementInfo::new("article"),
        ];
        let (selector, container) = find_content_container(&path, "post-content").unwrap();
        assert_eq!(selector, "article");
        assert_eq!(container.tag, "article");

        let without_article = &path[..2];
        let (selector, _) = find_content_container(without_article, "post-content").unwrap();
        assert_eq!(selector, ".post-content");

        assert!(find_content_container(&plain_span_path(), "post-content").is_none());
    }

    #[test]
    fn test_observe_click_positions() {
        let rect = Rect {
            left: 100.0,
            top: -300.0,
            width: 800.0,
            height: 3000.0,
        };
        let path = vec![
            ElementInfo::new("span").with_id("lead").with_class("intro"),
            ElementInfo::new("p").with_attr("data-heatmap-id", "para-1"),
            ElementInfo::new("article").with_rect(rect),
        ];
        let obs = observe_click(&click_at(500.0, 1000.0, path), "post-content");

        assert_eq!(obs.x_percent, 50.0);
        assert_eq!(obs.y_percent, 25.0);
        // client (500, 500) against a container starting at (100, -300)
        assert_eq!(obs.content_x, Some(50.0));
        assert_eq!(obs.content_y, Some(800.0));
        assert_eq!(obs.scroll_y, 500.0);
        assert_eq!(obs.container_selector, "article");
        assert_eq!(obs.element_tag, "span");
        assert_eq!(obs.element_id.as_deref(), Some("lead"));
        assert_eq!(obs.element_class.as_deref(), Some("intro"));
        assert_eq!(obs.heatmap_id.as_deref(), Some("para-1"));
        assert!(obs.is_dead_click);
    }

    #[test]
    fn test_observe_click_without_container() {
        let obs = observe_click(&click_at(10.0, 10.0, plain_span_path()), "post-content");
        assert_eq!(obs.container_selector, "body");
        assert_eq!(obs.content_x, None);
        assert_eq!(obs.content_y, None);
    }

    #[test]
    fn test_rage_click_threshold_and_reset() {
        let t0 = Instant::now();
        let mut detector = RageClickDetector::new(ms(500), 3, 5.0);

        assert_eq!(detector.record(51.0, 20.0, t0), None);
        assert_eq!(detector.record(52.0, 21.0, t0 + ms(100)), None);
        assert_eq!(detector.record(53.0, 22.0, t0 + ms(200)), Some((3, ms(200))));
        assert_eq!(detector.record(54.0, 23.0, t0 + ms(300)), Some((4, ms(300))));
        // 600ms after the first click: the window restarts
        assert_eq!(detector.record(51.0, 20.0, t0 + ms(600)), None);
        assert_eq!(detector.record(51.0, 20.0, t0 + ms(650)), None);
    }

    #[test]
    fn test_rage_click_cells_are_independent() {
        let t0 = Instant::now();
        let mut detector = RageClickDetector::new(ms(500), 3, 5.0);
        assert_eq!(detector.record(4.9, 4.9, t0), None);
        assert_eq!(detector.record(5.1, 4.9, t0), None);
        assert_eq!(detector.record(4.9, 5.1, t0), None);
        assert_eq!(detector.record(0.0, 0.0, t0 + ms(10)), None);
    }

    #[test]
    fn test_click_tracker_batches_after_inactivity() {
        let t0 = Instant::now();
        let mut tracker = ClickTracker::new(
            "post-content",
            ms(1000),
            RageClickDetector::new(ms(500), 3, 5.0),
        );
        tracker.on_click(&click_at(100.0, 100.0, plain_span_path()), t0);
        tracker.on_click(&click_at(900.0, 3000.0, plain_span_path()), t0 + ms(700));
        assert_eq!(tracker.buffered(), 2);

        assert_eq!(tracker.poll(t0 + ms(1000)), None);
        let batch = tracker.poll(t0 + ms(1700)).expect("batch after inactivity");
        assert_eq!(batch.len(), 2);
        assert_eq!(tracker.buffered(), 0);
        assert_eq!(tracker.flush(), None);
    }

    #[test]
    fn test_click_tracker_emits_rage_eagerly() {
        let t0 = Instant::now();
        let mut tracker = ClickTracker::new(
            "post-content",
            ms(1000),
            RageClickDetector::new(ms(500), 3, 5.0),
        );
        let path = vec![ElementInfo::new("img").with_attr("data-heatmap-id", "hero")];
        assert!(tracker.on_click(&click_at(300.0, 300.0, path.clone()), t0).is_none());
        assert!(tracker.on_click(&click_at(301.0, 301.0, path.clone()), t0 + ms(50)).is_none());
        let rage = tracker
            .on_click(&click_at(302.0, 302.0, path), t0 + ms(120))
            .expect("third click in the cell");
        assert_eq!(rage.click_count, 3);
        assert_eq!(rage.time_window_ms, 120);
        assert_eq!(rage.heatmap_id.as_deref(), Some("hero"));
        // Rage clicks are still buffered as ordinary clicks
        assert_eq!(tracker.flush().map(|b| b.len()), Some(3));
    }
}
