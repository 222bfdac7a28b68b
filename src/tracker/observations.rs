//! Observation records produced by the sub-trackers.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter};

use super::events::Viewport;

/// Quarter of the page the deepest scroll position falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, EnumIter)]
pub enum ScrollBucket {
    #[serde(rename = "0-25")]
    #[strum(serialize = "0-25")]
    FirstQuarter,
    #[serde(rename = "25-50")]
    #[strum(serialize = "25-50")]
    SecondQuarter,
    #[serde(rename = "50-75")]
    #[strum(serialize = "50-75")]
    ThirdQuarter,
    #[serde(rename = "75-100")]
    #[strum(serialize = "75-100")]
    LastQuarter,
}

impl ScrollBucket {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            0..=24 => ScrollBucket::FirstQuarter,
            25..=49 => ScrollBucket::SecondQuarter,
            50..=74 => ScrollBucket::ThirdQuarter,
            _ => ScrollBucket::LastQuarter,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollObservation {
    /// 0..=100
    pub max_scroll_depth_percent: u32,
    pub scroll_bucket: ScrollBucket,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickObservation {
    pub x_percent: f64,
    pub y_percent: f64,
    /// Percent of the content container's width
    pub content_x: Option<f64>,
    /// Pixels below the content container's top edge
    pub content_y: Option<f64>,
    pub scroll_y: f64,
    pub container_selector: String,
    pub element_tag: String,
    pub element_class: Option<String>,
    pub element_id: Option<String>,
    pub heatmap_id: Option<String>,
    pub is_dead_click: bool,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RageClickObservation {
    pub x_percent: f64,
    pub y_percent: f64,
    pub click_count: u32,
    pub time_window_ms: u64,
    pub element_tag: String,
    pub element_class: Option<String>,
    pub element_id: Option<String>,
    pub heatmap_id: Option<String>,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttentionObservation {
    pub section_id: String,
    pub time_visible_ms: u64,
    pub view_count: u32,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtaObservation {
    pub cta_id: String,
    pub was_seen: bool,
    pub was_clicked: bool,
    pub viewport: Viewport,
}
