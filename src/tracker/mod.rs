//! Interaction tracking for public post pages.
//!
//! A `Tracker` is built once from a `TrackerConfig` and a `Transport`.
//! `Tracker::start` attaches it to one page view and returns a
//! `TrackerHandle`; the host reports what happens on the page through
//! `TrackerHandle::dispatch`, and `TrackerHandle::stop` flushes whatever is
//! still buffered and tears everything down.
//!
//! All tracking state lives in a single task that owns the sub-trackers and
//! handles events one at a time. Sending to the collector never blocks that
//! task: every emission runs on its own task and failures are only logged.

mod attention;
mod clicks;
mod cta;
mod discovery;
mod events;
mod observations;
mod payload;
mod route;
mod scroll;
mod session;
mod transport;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::error_handling::{ErrorType, InfoType, InitializationError, ProcessingStats};
use crate::utils::{earliest, Debounce};

pub use attention::AttentionTracker;
pub use clicks::{find_content_container, heatmap_id, is_dead_click, observe_click, ClickTracker, RageClickDetector};
pub use cta::CtaTracker;
pub use discovery::{discover_targets, Discovered};
pub use events::{
    ClickEvent, ElementInfo, ObservedTarget, PageEvent, Rect, ScrollEvent, TimedEvent, Viewport,
};
pub use observations::{
    AttentionObservation, ClickObservation, CtaObservation, RageClickObservation, ScrollBucket,
    ScrollObservation,
};
pub use payload::{
    AttentionPayload, ClickBatchPayload, ClickRecord, CtaPayload, Emission, PageContext,
    RageClickPayload, ScrollPayload,
};
pub use route::RouteMatcher;
pub use scroll::{scroll_depth_percent, ScrollTracker};
pub use session::{
    generate_session_id, get_or_create_session_id, session_key, FileSessionStore,
    MemorySessionStore, SessionStore,
};
pub use transport::{Emitter, HttpTransport, Transport};

/// The page view a tracker is attached to.
#[derive(Debug, Clone)]
pub struct PageInfo {
    /// Full URL (or path) of the page; route matching uses its path
    pub url: String,
    pub viewport: Viewport,
    /// Document height at mount; seeds the scroll depth visible without
    /// scrolling
    pub document_height: Option<f64>,
    /// Markup rendered at mount, scanned for sections and CTAs right away
    pub content_html: Option<String>,
}

/// Interaction tracker factory.
pub struct Tracker {
    config: TrackerConfig,
    route: RouteMatcher,
    transport: Arc<dyn Transport>,
}

impl Tracker {
    /// # Errors
    ///
    /// Returns `InitializationError::RoutePatternError` if the configured route
    /// pattern does not compile.
    pub fn new(config: TrackerConfig, transport: Arc<dyn Transport>) -> Result<Self, InitializationError> {
        let route = RouteMatcher::new(&config.route_pattern)?;
        Ok(Tracker {
            config,
            route,
            transport,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Attaches to a page view.
    ///
    /// A disabled tracker, or a page outside the public-post route, yields an
    /// inert handle that accepts events and emits nothing. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self, page: PageInfo, sessions: &dyn SessionStore) -> TrackerHandle {
        let stats = Arc::new(ProcessingStats::new());

        if !self.config.enabled {
            log::debug!("Tracking disabled for post {}", self.config.post_id);
            return TrackerHandle::inert(stats);
        }
        if !self.route.matches(&page.url) {
            log::debug!("Not a trackable post route: {}", page.url);
            return TrackerHandle::inert(stats);
        }

        let (session_id, session_error) = get_or_create_session_id(sessions, &self.config.post_id);
        if let Some(e) = session_error {
            log::warn!("Session store unavailable, using an unsaved session: {}", e);
            stats.increment_error(ErrorType::SessionStoreError);
        }

        let context = PageContext {
            post_id: self.config.post_id.clone(),
            session_id,
            page_url: page.url.clone(),
            user_agent: self.config.user_agent.clone(),
        };
        let emitter = Emitter::new(Arc::clone(&self.transport), Arc::clone(&stats));
        let (targets_tx, targets_rx) = watch::channel(Vec::new());
        let mut state = TrackerState::new(&self.config, context, page.viewport, emitter.clone(), Arc::clone(&stats), targets_tx);

        if let Some(document_height) = page.document_height {
            state.scroll.seed(ScrollEvent {
                scroll_top: 0.0,
                document_height,
                viewport: page.viewport,
            });
        }
        if let Some(html) = page.content_html.as_deref() {
            state.rescan(html);
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(state, events_rx, cancel.clone()));

        log::info!(
            "Tracking post {} at {}",
            self.config.post_id,
            page.url
        );

        TrackerHandle {
            active: Some(ActiveTracker {
                events: events_tx,
                cancel,
                task,
                emitter,
                targets: targets_rx,
            }),
            stats,
        }
    }
}

struct ActiveTracker {
    events: mpsc::UnboundedSender<(Instant, PageEvent)>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    emitter: Emitter,
    targets: watch::Receiver<Vec<ObservedTarget>>,
}

/// Handle to a started tracker.
///
/// Dropping the handle without calling `stop` still flushes buffered
/// observations, but does not wait for them to be sent.
pub struct TrackerHandle {
    active: Option<ActiveTracker>,
    stats: Arc<ProcessingStats>,
}

impl TrackerHandle {
    fn inert(stats: Arc<ProcessingStats>) -> Self {
        TrackerHandle {
            active: None,
            stats,
        }
    }

    /// `false` for a disabled tracker or a non-post route.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Delivers a page event, stamped with the current instant.
    ///
    /// Returns `false` if the event was dropped (inert or stopped tracker).
    pub fn dispatch(&self, event: PageEvent) -> bool {
        match &self.active {
            Some(active) => active.events.send((Instant::now(), event)).is_ok(),
            None => false,
        }
    }

    /// Elements the host should report intersection changes for.
    pub fn observed_targets(&self) -> Vec<ObservedTarget> {
        self.active
            .as_ref()
            .map(|active| active.targets.borrow().clone())
            .unwrap_or_default()
    }

    /// Receiver notified whenever the set of observed targets grows.
    pub fn watch_targets(&self) -> Option<watch::Receiver<Vec<ObservedTarget>>> {
        self.active.as_ref().map(|active| active.targets.clone())
    }

    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.stats)
    }

    /// Flushes buffered observations, stops tracking and waits for in-flight
    /// emissions to settle.
    pub async fn stop(mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel.cancel();
        if let Err(e) = active.task.await {
            log::error!("Tracker task ended abnormally: {}", e);
        }
        active.emitter.drain().await;
        log::debug!(
            "Tracker stopped: {} emission(s) sent, {} failed",
            self.stats.get_info_count(InfoType::EmitSucceeded),
            self.stats.total_errors()
        );
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

/// Everything one page view's tracking owns.
struct TrackerState {
    context: PageContext,
    viewport: Viewport,
    scroll: ScrollTracker,
    clicks: ClickTracker,
    attention: AttentionTracker,
    ctas: CtaTracker,
    rescan: Debounce,
    pending_html: Option<String>,
    emitter: Emitter,
    stats: Arc<ProcessingStats>,
    targets: watch::Sender<Vec<ObservedTarget>>,
}

impl TrackerState {
    fn new(
        config: &TrackerConfig,
        context: PageContext,
        viewport: Viewport,
        emitter: Emitter,
        stats: Arc<ProcessingStats>,
        targets: watch::Sender<Vec<ObservedTarget>>,
    ) -> Self {
        let t = &config.timings;
        TrackerState {
            context,
            viewport,
            scroll: ScrollTracker::new(t.scroll_throttle, t.scroll_debounce, viewport),
            clicks: ClickTracker::new(
                &config.content_class,
                t.click_debounce,
                RageClickDetector::new(t.rage_window, t.rage_threshold, t.rage_cell_percent),
            ),
            attention: AttentionTracker::new(t.attention_dwell, t.visibility_threshold),
            ctas: CtaTracker::new(t.visibility_threshold),
            rescan: Debounce::new(t.rescan_debounce),
            pending_html: None,
            emitter,
            stats,
            targets,
        }
    }

    fn handle(&mut self, event: PageEvent, at: Instant) {
        match event {
            PageEvent::Scroll(sample) => {
                self.viewport = sample.viewport;
                self.scroll.on_scroll(sample, at);
            }
            PageEvent::Click(click) => {
                self.viewport = click.viewport;
                if let Some(rage) = self.clicks.on_click(&click, at) {
                    log::debug!(
                        "Rage click: {} clicks in {}ms on <{}>",
                        rage.click_count,
                        rage.time_window_ms,
                        rage.element_tag
                    );
                    self.stats.increment_info(InfoType::RageClickDetected);
                    self.emitter.emit(self.context.rage_click(rage));
                }
                if is_dead_click(&click.path) {
                    self.stats.increment_info(InfoType::DeadClickRecorded);
                }
                if let Some(obs) = self.ctas.on_click(&click.path, self.viewport) {
                    self.emitter.emit(self.context.cta(obs));
                }
            }
            PageEvent::Intersection { target, ratio } => match target {
                ObservedTarget::Section(id) => self.attention.on_intersection(&id, ratio, at),
                ObservedTarget::Cta(id) => {
                    if let Some(obs) = self.ctas.on_intersection(&id, ratio, self.viewport) {
                        self.emitter.emit(self.context.cta(obs));
                    }
                }
            },
            PageEvent::ContentChanged { html } => {
                self.pending_html = Some(html);
                self.rescan.call(at);
            }
            PageEvent::Resize { viewport } => self.viewport = viewport,
            PageEvent::Unload => {
                log::debug!("Page unload, flushing");
                self.flush();
            }
        }
    }

    fn poll_timers(&mut self, now: Instant) {
        if let Some(obs) = self.scroll.poll(now) {
            self.emitter.emit(self.context.scroll(obs));
        }
        if let Some(batch) = self.clicks.poll(now) {
            self.emitter.emit(self.context.clicks(batch));
        }
        for obs in self.attention.poll(now, self.viewport) {
            self.emitter.emit(self.context.attention(obs));
        }
        if self.rescan.poll(now) {
            if let Some(html) = self.pending_html.take() {
                self.rescan(&html);
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.scroll.next_deadline(),
            self.clicks.next_deadline(),
            self.attention.next_deadline(),
            self.rescan.deadline(),
        ])
    }

    /// Discovers sections and CTAs, observing only ones not yet observed.
    fn rescan(&mut self, html: &str) {
        let found = discover_targets(html);
        let sections = self.attention.observe(found.sections);
        let ctas = self.ctas.observe(found.ctas);
        if sections.is_empty() && ctas.is_empty() {
            return;
        }
        log::debug!(
            "Observing {} new section(s), {} new CTA(s)",
            sections.len(),
            ctas.len()
        );
        self.targets.send_modify(|targets| {
            targets.extend(sections.into_iter().map(ObservedTarget::Section));
            targets.extend(ctas.into_iter().map(ObservedTarget::Cta));
        });
    }

    /// Reports scroll depth and sends any buffered clicks.
    fn flush(&mut self) {
        let scroll = self.scroll.flush();
        self.emitter.emit(self.context.scroll(scroll));
        if let Some(batch) = self.clicks.flush() {
            self.emitter.emit(self.context.clicks(batch));
        }
    }

    fn shutdown(&mut self) {
        if self.rescan.cancel() {
            log::debug!("Discarding pending content rescan");
        }
        self.pending_html = None;
        self.attention.cancel_all();
        self.flush();
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run_loop(
    mut state: TrackerState,
    mut events: mpsc::UnboundedReceiver<(Instant, PageEvent)>,
    cancel: CancellationToken,
) {
    loop {
        let deadline = state.next_deadline();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = events.recv() => match received {
                Some((at, event)) => {
                    state.poll_timers(at);
                    state.handle(event, at);
                }
                None => break,
            },
            _ = sleep_until_deadline(deadline) => state.poll_timers(Instant::now()),
        }
    }

    // Events dispatched before stop still count
    while let Ok((at, event)) = events.try_recv() {
        state.poll_timers(at);
        state.handle(event, at);
    }
    state.shutdown();
    log::debug!("Tracker loop for post {} finished", state.context.post_id);
}
