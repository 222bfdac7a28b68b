// Shared test helpers for tracker setup and page event construction.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};

use blogish::tracker::{ClickEvent, ScrollEvent};
use blogish::{
    EmitError, ElementInfo, MemorySessionStore, PageEvent, PageInfo, Tracker, TrackerConfig,
    TrackerHandle, Transport, Viewport,
};

/// Transport that records every payload instead of sending it.
///
/// With `failing` set, every post is recorded and then rejected with a 503.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(&'static str, serde_json::Value)>>,
    failing: bool,
}

#[allow(dead_code)] // Not every test file uses every helper
impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(RecordingTransport {
            failing: true,
            ..Default::default()
        })
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }

    pub fn bodies(&self, endpoint: &str) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn post(
        &self,
        endpoint: &'static str,
        body: serde_json::Value,
    ) -> BoxFuture<'static, Result<(), EmitError>> {
        self.sent.lock().unwrap().push((endpoint, body));
        let failing = self.failing;
        async move {
            if failing {
                Err(EmitError::Status {
                    endpoint: endpoint.to_string(),
                    status: 503,
                })
            } else {
                Ok(())
            }
        }
        .boxed()
    }
}

#[allow(dead_code)]
pub const POST_URL: &str = "https://blogish.app/p/hello-world";

#[allow(dead_code)]
pub fn test_config() -> TrackerConfig {
    TrackerConfig {
        post_id: "post-42".to_string(),
        ..Default::default()
    }
}

/// Starts a tracker on the standard post page.
#[allow(dead_code)]
pub fn start_tracker(
    transport: Arc<RecordingTransport>,
    content_html: Option<&str>,
) -> TrackerHandle {
    let tracker = Tracker::new(test_config(), transport).expect("default config is valid");
    tracker.start(
        PageInfo {
            url: POST_URL.to_string(),
            viewport: Viewport::new(1280, 800),
            document_height: Some(2800.0),
            content_html: content_html.map(str::to_string),
        },
        &MemorySessionStore::new(),
    )
}

/// Scroll sample on a 2800px document in a 1280x800 viewport (2000px scrollable).
#[allow(dead_code)]
pub fn scroll(scroll_top: f64) -> PageEvent {
    PageEvent::Scroll(ScrollEvent {
        scroll_top,
        document_height: 2800.0,
        viewport: Viewport::new(1280, 800),
    })
}

/// Click at document coordinates on a 1280x4000 document.
#[allow(dead_code)]
pub fn click(page_x: f64, page_y: f64, path: Vec<ElementInfo>) -> PageEvent {
    PageEvent::Click(ClickEvent {
        page_x,
        page_y,
        client_x: page_x,
        client_y: page_y,
        scroll_y: 0.0,
        document_width: 1280.0,
        document_height: 4000.0,
        viewport: Viewport::new(1280, 800),
        path,
    })
}
