//! Post content rewriting.
//!
//! Turns a stored post body into markup that can be injected as-is, with
//! every embeddable block (video iframes, `<video>` tags, button directives)
//! swapped for an empty placeholder `div`. The placeholder's `id` is recorded
//! in a matching descriptor so the renderer can mount a live component at
//! that exact position.
//!
//! Malformed embeds are never fatal: they are counted as warnings, logged at
//! debug level and left in the output as inert markup.

mod button;
mod video;

use std::sync::LazyLock;

use ego_tree::NodeId;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;

use crate::config::{
    BUTTON_DIRECTIVE_TYPE, BUTTON_PLACEHOLDER_CLASS, DEFAULT_POST_SCOPE, VIDEO_PLACEHOLDER_CLASS,
};
use crate::error_handling::{InfoType, ProcessingStats, WarningType};
use crate::utils::parse_selector_unsafe;

pub use button::{ButtonAlign, ButtonAttrs, ButtonRadius, ButtonSize, ButtonVariant};
pub use video::{extract_primary_color, extract_video_id, is_video_host, normalize_video_url};

const VIDEO_SELECTOR_STR: &str = "iframe, video";
const VIDEO_SOURCE_SELECTOR_STR: &str = "source[src]";
const DIRECTIVE_TYPE_ATTR: &str = "data-type";

static VIDEO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(VIDEO_SELECTOR_STR, "video embeds"));
static VIDEO_SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(VIDEO_SOURCE_SELECTOR_STR, "video sources"));
static BUTTON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(
        &format!(r#"div[{DIRECTIVE_TYPE_ATTR}="{BUTTON_DIRECTIVE_TYPE}"]"#),
        "button directives",
    )
});

/// Element nodes swapped in for embeds, applied once both passes are done.
type Replacements = Vec<(NodeId, String)>;

/// A video to hydrate at a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEmbed {
    pub source_url: String,
    pub video_id: String,
    pub primary_color: Option<String>,
    pub placeholder_id: String,
    pub title: Option<String>,
}

/// A button to hydrate at a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonEmbed {
    pub attrs: ButtonAttrs,
    pub placeholder_id: String,
}

/// Either kind of embed, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbedDescriptor {
    Video(VideoEmbed),
    Button(ButtonEmbed),
}

impl EmbedDescriptor {
    pub fn placeholder_id(&self) -> &str {
        match self {
            EmbedDescriptor::Video(video) => &video.placeholder_id,
            EmbedDescriptor::Button(button) => &button.placeholder_id,
        }
    }
}

/// Result of rewriting a post body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedContent {
    pub rewritten_html: String,
    pub videos: Vec<VideoEmbed>,
    pub buttons: Vec<ButtonEmbed>,
}

impl ProcessedContent {
    /// All descriptors, videos first, each category in source order.
    pub fn embeds(&self) -> Vec<EmbedDescriptor> {
        self.videos
            .iter()
            .cloned()
            .map(EmbedDescriptor::Video)
            .chain(self.buttons.iter().cloned().map(EmbedDescriptor::Button))
            .collect()
    }
}

/// Options for `process_content`.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Scopes placeholder ids so several posts can share a page
    pub post_id: Option<String>,
    /// Color for videos whose URL carries no `primaryColor`
    pub fallback_color: Option<String>,
}

/// Rewrites a stored post body, extracting its embeds.
///
/// Empty or whitespace-only input is returned unchanged with no embeds.
/// Videos are collected in one source-order pass over iframes and `<video>`
/// tags, buttons in a second pass; ids are numbered in encounter order within
/// each category.
///
/// # Arguments
///
/// * `html` - The stored post body (an HTML fragment)
/// * `options` - Post scope and fallback video color
/// * `stats` - Statistics tracker; skipped embeds are recorded as warnings
pub fn process_content(html: &str, options: &ProcessOptions, stats: &ProcessingStats) -> ProcessedContent {
    if html.trim().is_empty() {
        return ProcessedContent {
            rewritten_html: html.to_string(),
            ..Default::default()
        };
    }

    let mut document = Html::parse_fragment(html);
    let scope = options
        .post_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_POST_SCOPE);

    let mut replacements = Replacements::new();
    let videos = collect_videos(&document, scope, options, stats, &mut replacements);
    let buttons = collect_buttons(&document, scope, stats, &mut replacements);
    for (id, markup) in replacements {
        replace_node(&mut document, id, &markup);
    }

    log::debug!(
        "Rewrote post '{}': {} video(s), {} button(s)",
        scope,
        videos.len(),
        buttons.len()
    );

    ProcessedContent {
        rewritten_html: fragment_html(&document),
        videos,
        buttons,
    }
}

fn collect_videos(
    document: &Html,
    scope: &str,
    options: &ProcessOptions,
    stats: &ProcessingStats,
    replacements: &mut Replacements,
) -> Vec<VideoEmbed> {
    let mut videos = Vec::new();
    let mut direct_index = 0usize;

    for element in document.select(&VIDEO_SELECTOR) {
        if inside_button_directive(&element) {
            continue;
        }
        let is_iframe = element.value().name() == "iframe";

        let (source_url, video_id) = if is_iframe {
            let Some(src) = element.value().attr("src").filter(|s| !s.trim().is_empty()) else {
                log::debug!("Skipping iframe without src");
                stats.increment_warning(WarningType::MissingIframeSrc);
                continue;
            };
            if !is_video_host(src) {
                continue;
            }
            let source_url = normalize_video_url(src);
            let Some(video_id) = extract_video_id(&source_url) else {
                log::debug!("No video id in iframe src '{}', leaving it inert", src);
                stats.increment_warning(WarningType::UnrecognizedVideoId);
                continue;
            };
            (source_url, video_id)
        } else {
            let index = direct_index;
            direct_index += 1;
            let Some(src) = video_tag_source(&element) else {
                log::debug!("Skipping <video> without a usable source");
                stats.increment_warning(WarningType::MissingVideoSource);
                continue;
            };
            let source_url = normalize_video_url(src);
            let video_id = extract_video_id(&source_url).unwrap_or_else(|| {
                stats.increment_info(InfoType::DirectVideoFallback);
                format!("direct-{index}")
            });
            (source_url, video_id)
        };

        let primary_color = extract_primary_color(&source_url, stats)
            .or_else(|| options.fallback_color.clone());
        let title = element
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let placeholder_id = format!("video-{}-{}-{}", scope, video_id, videos.len());

        replacements.push((
            element.id(),
            video_placeholder(&placeholder_id, &source_url, &video_id, primary_color.as_deref(), title.as_deref()),
        ));
        stats.increment_info(InfoType::VideoEmbedded);
        videos.push(VideoEmbed {
            source_url,
            video_id,
            primary_color,
            placeholder_id,
            title,
        });
    }

    videos
}

fn collect_buttons(
    document: &Html,
    scope: &str,
    stats: &ProcessingStats,
    replacements: &mut Replacements,
) -> Vec<ButtonEmbed> {
    let mut buttons = Vec::new();

    for element in document.select(&BUTTON_SELECTOR) {
        // A directive nested in an already-replaced directive has no place to mount
        if inside_button_directive(&element) {
            continue;
        }
        let placeholder_id = format!("button-{}-{}", scope, buttons.len());
        let attrs = ButtonAttrs::from_element(element.value());

        let mut markup = String::from("<div");
        push_attribute(&mut markup, "id", &placeholder_id);
        push_attribute(&mut markup, "class", BUTTON_PLACEHOLDER_CLASS);
        markup.push_str("></div>");

        replacements.push((element.id(), markup));
        stats.increment_info(InfoType::ButtonEmbedded);
        buttons.push(ButtonEmbed {
            attrs,
            placeholder_id,
        });
    }

    buttons
}

/// `src` of a `<video>` tag, or of its first `<source src>` child.
fn video_tag_source<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr("src")
        .or_else(|| {
            element
                .select(&VIDEO_SOURCE_SELECTOR)
                .next()
                .and_then(|source| source.value().attr("src"))
        })
        .filter(|src| !src.trim().is_empty())
}

fn inside_button_directive(element: &ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|ancestor| {
        ancestor.value().name() == "div"
            && ancestor.value().attr(DIRECTIVE_TYPE_ATTR) == Some(BUTTON_DIRECTIVE_TYPE)
    })
}

/// Inner HTML of the fragment root.
///
/// `Html::parse_fragment` parses with scripting enabled, so `<noscript>`
/// holds raw text; serializing with the same setting writes it back verbatim.
/// `ElementRef::inner_html` would escape it.
fn fragment_html(document: &Html) -> String {
    let root = document.root_element();
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope: TraversalScope::ChildrenOnly(None),
        create_missing_parent: false,
    };
    let mut buf = Vec::new();
    match serialize(&mut buf, &root, opts) {
        Ok(()) => String::from_utf8(buf)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        Err(e) => {
            log::warn!("Fragment serialization failed ({}), using inner_html", e);
            root.inner_html()
        }
    }
}

/// Puts the element parsed from `markup` where node `id` was, dropping the
/// original subtree.
fn replace_node(document: &mut Html, id: NodeId, markup: &str) {
    let Some(placeholder) = placeholder_node(markup) else {
        log::debug!("Placeholder markup '{}' has no element, keeping original", markup);
        return;
    };
    if let Some(mut node) = document.tree.get_mut(id) {
        node.insert_before(placeholder);
        node.detach();
    }
}

fn placeholder_node(markup: &str) -> Option<Node> {
    let fragment = Html::parse_fragment(markup);
    let node = fragment
        .root_element()
        .children()
        .find(|child| child.value().is_element())
        .map(|child| child.value().clone());
    node
}

/// Appends ` key="value"` with the value escaped for a double-quoted attribute.
fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn video_placeholder(
    placeholder_id: &str,
    source_url: &str,
    video_id: &str,
    primary_color: Option<&str>,
    title: Option<&str>,
) -> String {
    let mut markup = String::from("<div");
    push_attribute(&mut markup, "id", placeholder_id);
    push_attribute(&mut markup, "class", VIDEO_PLACEHOLDER_CLASS);
    push_attribute(&mut markup, "data-video-src", source_url);
    push_attribute(&mut markup, "data-video-id", video_id);
    if let Some(color) = primary_color {
        push_attribute(&mut markup, "data-primary-color", color);
    }
    if let Some(title) = title {
        push_attribute(&mut markup, "data-video-title", title);
    }
    markup.push_str("></div>");
    markup
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
