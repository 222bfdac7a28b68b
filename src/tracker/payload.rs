//! Collector wire payloads.
//!
//! Each observation is combined with the page context (post, session, URL,
//! user agent) into the JSON body its ingestion endpoint expects.

use serde::Serialize;

use crate::config::{
    ATTENTION_ENDPOINT, CLICKS_ENDPOINT, CTA_ENDPOINT, RAGE_CLICK_ENDPOINT, SCROLL_ENDPOINT,
};

use super::observations::{
    AttentionObservation, ClickObservation, CtaObservation, RageClickObservation,
    ScrollObservation, ScrollBucket,
};

/// Identity of the page being tracked, attached to every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub post_id: String,
    pub session_id: String,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollPayload {
    pub post_id: String,
    pub session_id: String,
    pub max_scroll_depth_percent: u32,
    pub scroll_bucket: ScrollBucket,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickRecord {
    pub x_percent: f64,
    pub y_percent: f64,
    pub content_x: Option<f64>,
    pub content_y: Option<f64>,
    pub scroll_y: f64,
    pub content_container_selector: String,
    pub element_tag: String,
    pub element_class: Option<String>,
    pub element_id: Option<String>,
    pub heatmap_id: Option<String>,
    pub is_dead_click: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickBatchPayload {
    pub post_id: String,
    pub session_id: String,
    pub clicks: Vec<ClickRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RageClickPayload {
    pub post_id: String,
    pub session_id: String,
    pub x_percent: f64,
    pub y_percent: f64,
    pub click_count: u32,
    pub time_window_ms: u64,
    pub element_tag: String,
    pub element_class: Option<String>,
    pub element_id: Option<String>,
    pub heatmap_id: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionPayload {
    pub post_id: String,
    pub session_id: String,
    pub section_id: String,
    pub time_visible_ms: u64,
    pub view_count: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaPayload {
    pub post_id: String,
    pub session_id: String,
    pub cta_id: String,
    pub was_seen: bool,
    pub was_clicked: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_url: String,
    pub user_agent: String,
}

/// A payload ready to be sent, tagged by endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Scroll(ScrollPayload),
    Clicks(ClickBatchPayload),
    RageClick(RageClickPayload),
    Attention(AttentionPayload),
    Cta(CtaPayload),
}

impl Emission {
    /// Endpoint path relative to the collector base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Emission::Scroll(_) => SCROLL_ENDPOINT,
            Emission::Clicks(_) => CLICKS_ENDPOINT,
            Emission::RageClick(_) => RAGE_CLICK_ENDPOINT,
            Emission::Attention(_) => ATTENTION_ENDPOINT,
            Emission::Cta(_) => CTA_ENDPOINT,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Emission::Scroll(p) => serde_json::to_value(p),
            Emission::Clicks(p) => serde_json::to_value(p),
            Emission::RageClick(p) => serde_json::to_value(p),
            Emission::Attention(p) => serde_json::to_value(p),
            Emission::Cta(p) => serde_json::to_value(p),
        }
    }
}

impl PageContext {
    pub fn scroll(&self, obs: ScrollObservation) -> Emission {
        Emission::Scroll(ScrollPayload {
            post_id: self.post_id.clone(),
            session_id: self.session_id.clone(),
            max_scroll_depth_percent: obs.max_scroll_depth_percent,
            scroll_bucket: obs.scroll_bucket,
            viewport_width: obs.viewport.width,
            viewport_height: obs.viewport.height,
            page_url: self.page_url.clone(),
            user_agent: self.user_agent.clone(),
        })
    }

    pub fn clicks(&self, observations: Vec<ClickObservation>) -> Emission {
        let clicks = observations
            .into_iter()
            .map(|obs| ClickRecord {
                x_percent: obs.x_percent,
                y_percent: obs.y_percent,
                content_x: obs.content_x,
                content_y: obs.content_y,
                scroll_y: obs.scroll_y,
                content_container_selector: obs.container_selector,
                element_tag: obs.element_tag,
                element_class: obs.element_class,
                element_id: obs.element_id,
                heatmap_id: obs.heatmap_id,
                is_dead_click: obs.is_dead_click,
                viewport_width: obs.viewport.width,
                viewport_height: obs.viewport.height,
                page_url: self.page_url.clone(),
                user_agent: self.user_agent.clone(),
            })
            .collect();

        Emission::Clicks(ClickBatchPayload {
            post_id: self.post_id.clone(),
            session_id: self.session_id.clone(),
            clicks,
        })
    }

    pub fn rage_click(&self, obs: RageClickObservation) -> Emission {
        Emission::RageClick(RageClickPayload {
            post_id: self.post_id.clone(),
            session_id: self.session_id.clone(),
            x_percent: obs.x_percent,
            y_percent: obs.y_percent,
            click_count: obs.click_count,
            time_window_ms: obs.time_window_ms,
            element_tag: obs.element_tag,
            element_class: obs.element_class,
            element_id: obs.element_id,
            heatmap_id: obs.heatmap_id,
            viewport_width: obs.viewport.width,
            viewport_height: obs.viewport.height,
            page_url: self.page_url.clone(),
            user_agent: self.user_agent.clone(),
        })
    }

    pub fn attention(&self, obs: AttentionObservation) -> Emission {
        Emission::Attention(AttentionPayload {
            post_id: self.post_id.clone(),
            session_id: self.session_id.clone(),
            section_id: obs.section_id,
            time_visible_ms: obs.time_visible_ms,
            view_count: obs.view_count,
            viewport_width: obs.viewport.width,
            viewport_height: obs.viewport.height,
            page_url: self.page_url.clone(),
            user_agent: self.user_agent.clone(),
        })
    }

    pub fn cta(&self, obs: CtaObservation) -> Emission {
        Emission::Cta(CtaPayload {
            post_id: self.post_id.clone(),
            session_id: self.session_id.clone(),
            cta_id: obs.cta_id,
            was_seen: obs.was_seen,
            was_clicked: obs.was_clicked,
            viewport_width: obs.viewport.width,
            viewport_height: obs.viewport.height,
            page_url: self.page_url.clone(),
            user_agent: self.user_agent.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::events::Viewport;

    fn context() -> PageContext {
        PageContext {
            post_id: "p1".to_string(),
            session_id: "s1".to_string(),
            page_url: "https://blogish.app/p/hello".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_scroll_payload_fields() {
        let emission = context().scroll(ScrollObservation {
            max_scroll_depth_percent: 80,
            scroll_bucket: ScrollBucket::LastQuarter,
            viewport: Viewport::new(1280, 800),
        });
        assert_eq!(emission.endpoint(), "track-scroll");
        let json = emission.to_json().unwrap();
        assert_eq!(json["post_id"], "p1");
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["max_scroll_depth_percent"], 80);
        assert_eq!(json["scroll_bucket"], "75-100");
        assert_eq!(json["viewport_width"], 1280);
        assert_eq!(json["viewport_height"], 800);
        assert_eq!(json["page_url"], "https://blogish.app/p/hello");
        assert_eq!(json["user_agent"], "test-agent");
    }

    #[test]
    fn test_click_batch_payload_nests_records() {
        let obs = ClickObservation {
            x_percent: 50.0,
            y_percent: 10.0,
            content_x: Some(25.0),
            content_y: Some(120.0),
            scroll_y: 300.0,
            container_selector: "article".to_string(),
            element_tag: "span".to_string(),
            element_class: None,
            element_id: Some("lead".to_string()),
            heatmap_id: None,
            is_dead_click: true,
            viewport: Viewport::new(1000, 700),
        };
        let emission = context().clicks(vec![obs.clone(), obs]);
        assert_eq!(emission.endpoint(), "track-clicks");
        let json = emission.to_json().unwrap();
        assert_eq!(json["post_id"], "p1");
        let clicks = json["clicks"].as_array().unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0]["content_container_selector"], "article");
        assert_eq!(clicks[0]["is_dead_click"], true);
        assert_eq!(clicks[0]["element_class"], serde_json::Value::Null);
        assert_eq!(clicks[0]["user_agent"], "test-agent");
    }

    #[test]
    fn test_cta_and_attention_endpoints() {
        let ctx = context();
        let cta = ctx.cta(CtaObservation {
            cta_id: "signup".to_string(),
            was_seen: true,
            was_clicked: false,
            viewport: Viewport::new(1, 1),
        });
        assert_eq!(cta.endpoint(), "track-cta");
        assert_eq!(cta.to_json().unwrap()["was_clicked"], false);

        let attention = ctx.attention(AttentionObservation {
            section_id: "intro".to_string(),
            time_visible_ms: 1500,
            view_count: 3,
            viewport: Viewport::new(1, 1),
        });
        assert_eq!(attention.endpoint(), "track-attention");
        assert_eq!(attention.to_json().unwrap()["time_visible_ms"], 1500);
    }
}
