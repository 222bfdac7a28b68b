//! Video source handling: URL normalization, id and color extraction.

use std::sync::LazyLock;

use regex::Regex;
use url::{form_urlencoded, Url};

use crate::error_handling::{ProcessingStats, WarningType};
use crate::utils::compile_regex_unsafe;

/// Hosts whose iframes are hydrated as video players.
pub const VIDEO_HOSTS: &[&str] = &["cloudflarestream.com", "videodelivery.net"];

const PRIMARY_COLOR_PARAM: &str = "primaryColor";

// Id matchers, tried in this order
const PROVIDER_IFRAME_PATTERN: &str =
    r"customer-[A-Za-z0-9]+\.cloudflarestream\.com/([A-Za-z0-9_-]+)/iframe";
const PROVIDER_SHORT_PATTERN: &str = r"cloudflarestream\.com/([A-Za-z0-9_-]+)";
const DELIVERY_PATTERN: &str = r"videodelivery\.net/([A-Za-z0-9_-]+)";
const RAW_ID_PATTERN: &str = r"\b([a-f0-9]{32})\b";
const BARE_ID_PATTERN: &str = r"^[a-f0-9]{32}$";

const PRIMARY_COLOR_QUERY_PATTERN: &str = r"[?&](primaryColor=[^&#]*)";

static ID_MATCHERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        PROVIDER_IFRAME_PATTERN,
        PROVIDER_SHORT_PATTERN,
        DELIVERY_PATTERN,
        RAW_ID_PATTERN,
    ]
    .iter()
    .map(|pattern| compile_regex_unsafe(pattern, "video id extraction"))
    .collect()
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(BARE_ID_PATTERN, "bare video id"));

static PRIMARY_COLOR_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(PRIMARY_COLOR_QUERY_PATTERN, "primary color fallback")
});

/// Returns `true` if `src` points at a known video host or is a bare
/// provider id.
pub fn is_video_host(src: &str) -> bool {
    let lowered = src.to_ascii_lowercase();
    VIDEO_HOSTS.iter().any(|host| lowered.contains(host)) || BARE_ID.is_match(src.trim())
}

/// Normalizes a video source to an absolute `https` URL.
///
/// Protocol-relative (`//host/...`) and plain `http` URLs are upgraded,
/// scheme-less host paths get an `https://` prefix. Root-relative paths and
/// bare ids are returned trimmed but otherwise untouched.
pub fn normalize_video_url(src: &str) -> String {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{rest}")
    } else if let Some(rest) = src.strip_prefix("http://") {
        format!("https://{rest}")
    } else if src.starts_with("https://") || src.starts_with('/') || src.contains("://") {
        src.to_string()
    } else if looks_like_host_path(src) {
        format!("https://{src}")
    } else {
        src.to_string()
    }
}

fn looks_like_host_path(src: &str) -> bool {
    let host = src.split(['/', '?', '#']).next().unwrap_or("");
    host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
}

/// Extracts the provider video id from a source URL.
///
/// Matchers are tried in a fixed order: provider iframe URL, provider short
/// URL, delivery domain, then any bare 32-character hex id.
pub fn extract_video_id(src: &str) -> Option<String> {
    ID_MATCHERS.iter().find_map(|re| {
        re.captures(src)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|id| id != "iframe")
    })
}

/// Extracts the `primaryColor` query parameter, percent-decoded.
///
/// Uses regular URL parsing first. When the source does not parse (opaque or
/// malformed URLs), the parameter is recovered with a regex so the caller
/// still gets the same decoded value.
pub fn extract_primary_color(src: &str, stats: &ProcessingStats) -> Option<String> {
    match Url::parse(src) {
        Ok(parsed) => parsed
            .query_pairs()
            .find(|(key, _)| key == PRIMARY_COLOR_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty()),
        Err(e) => {
            if src.contains("://") {
                log::debug!("Unparseable video URL '{}' ({}), using regex fallback", src, e);
                stats.increment_warning(WarningType::MalformedVideoUrl);
            }
            primary_color_from_query(src)
        }
    }
}

/// Regex fallback for `extract_primary_color`.
pub(crate) fn primary_color_from_query(src: &str) -> Option<String> {
    let pair = PRIMARY_COLOR_QUERY.captures(src)?.get(1)?.as_str();
    form_urlencoded::parse(pair.as_bytes())
        .find(|(key, _)| key == PRIMARY_COLOR_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
