//! Page events delivered by the host.
//!
//! The tracker never touches a live DOM. The host page (or a replay file)
//! reports what happened as `PageEvent`s: scroll positions, clicks with the
//! element path from target to root, intersection changes for elements the
//! tracker asked to observe, content changes and unload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Viewport { width, height }
    }
}

/// Element bounding box relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// One element on a click path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Lower-case tag name
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Raw `class` attribute
    #[serde(default)]
    pub class: Option<String>,
    /// Remaining attributes of interest (`href`, `role`, `onclick`, `data-*`)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// A script-registered click handler is attached
    #[serde(default)]
    pub has_click_handler: bool,
    #[serde(default)]
    pub rect: Option<Rect>,
}

impl ElementInfo {
    pub fn new(tag: &str) -> Self {
        ElementInfo {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_click_handler(mut self) -> Self {
        self.has_click_handler = true;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class
            .as_deref()
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// A scroll position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport: Viewport,
}

/// A click, captured before any page handler runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Document coordinates
    pub page_x: f64,
    pub page_y: f64,
    /// Viewport coordinates
    pub client_x: f64,
    pub client_y: f64,
    pub scroll_y: f64,
    pub document_width: f64,
    pub document_height: f64,
    pub viewport: Viewport,
    /// Target first, then its ancestors up to the root
    pub path: Vec<ElementInfo>,
}

/// Element kinds the tracker asks the host to observe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ObservedTarget {
    Section(String),
    Cta(String),
}

/// Everything the tracker reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    Scroll(ScrollEvent),
    Click(ClickEvent),
    /// Intersection ratio change for an observed element
    Intersection {
        target: ObservedTarget,
        ratio: f64,
    },
    /// The rendered content changed; carries the new markup for re-discovery
    ContentChanged { html: String },
    Resize { viewport: Viewport },
    /// The page is going away
    Unload,
}

/// A replayed event, optionally preceded by a pause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: PageEvent,
}
