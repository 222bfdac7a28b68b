//! Configuration constants.
//!
//! This module defines the defaults used throughout the crate: collector
//! endpoints, rate-limiter windows, visibility thresholds and the reserved
//! markup names the content pipeline and the tracker agree on.

use std::time::Duration;

/// Default collector base URL (Supabase edge functions running locally).
pub const DEFAULT_COLLECTOR_BASE_URL: &str = "http://localhost:54321/functions/v1";

/// Canonical public-post route. The tracker stays inert on any other path.
pub const DEFAULT_ROUTE_PATTERN: &str = r"^/(?:p|post|posts)/[^/]+/?$";

/// Class carried by the rendered post body when it is not an `<article>`.
pub const DEFAULT_CONTENT_CLASS: &str = "post-content";

/// Per-request timeout for collector calls in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Viewport assumed by the `track` command until the stream reports one.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// User-Agent reported in payloads and on collector requests.
pub const DEFAULT_USER_AGENT: &str = concat!("blogish/", env!("CARGO_PKG_VERSION"));

// Scroll tracking
/// Scroll position updates are processed at most once per window (leading + trailing).
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(100);
/// Scroll depth is emitted after this much scroll inactivity.
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(250);

// Click tracking
/// Buffered clicks are flushed after this much click inactivity.
pub const CLICK_DEBOUNCE: Duration = Duration::from_millis(1000);
/// Rage-click window measured from the first click in a grid cell.
pub const RAGE_CLICK_WINDOW: Duration = Duration::from_millis(500);
/// Clicks needed inside the window before a rage click is reported.
pub const RAGE_CLICK_THRESHOLD: u32 = 3;
/// Rage-click grid cell size, in percent of the document on both axes.
pub const RAGE_CLICK_CELL_PERCENT: f64 = 5.0;

// Attention / CTA tracking
/// A section must stay visible this long before time is accrued.
pub const ATTENTION_DWELL: Duration = Duration::from_millis(500);
/// Minimum intersection ratio for a section or CTA to count as visible.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;
/// Content-change notifications are coalesced for this long before re-scanning.
pub const RESCAN_DEBOUNCE: Duration = Duration::from_millis(100);

// Collector endpoints (relative to the base URL)
pub const SCROLL_ENDPOINT: &str = "track-scroll";
pub const CLICKS_ENDPOINT: &str = "track-clicks";
pub const RAGE_CLICK_ENDPOINT: &str = "track-rage-click";
pub const ATTENTION_ENDPOINT: &str = "track-attention";
pub const CTA_ENDPOINT: &str = "track-cta";

// Reserved markup
/// Storage key prefix for the per-post visitor session.
pub const SESSION_KEY_PREFIX: &str = "heatmap_session_";
/// Attribute marking an explicitly tracked section.
pub const SECTION_ATTR: &str = "data-heatmap-section";
/// Attribute marking a call-to-action target.
pub const CTA_ATTR: &str = "data-heatmap-cta";
/// Attribute giving a click target a stable heatmap identifier.
pub const HEATMAP_ID_ATTR: &str = "data-heatmap-id";
/// Attribute value identifying a button directive `div`.
pub const BUTTON_DIRECTIVE_TYPE: &str = "button";
/// Class given to video placeholders in rewritten HTML.
pub const VIDEO_PLACEHOLDER_CLASS: &str = "video-js-placeholder";
/// Class given to button placeholders in rewritten HTML.
pub const BUTTON_PLACEHOLDER_CLASS: &str = "button-placeholder";
/// Post identifier used in placeholder ids when the caller supplies none.
pub const DEFAULT_POST_SCOPE: &str = "post";
