//! Collector transport and fire-and-forget emission.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio_util::task::TaskTracker;

use crate::error_handling::{EmitError, ErrorType, InfoType, ProcessingStats};

use super::payload::Emission;

/// Sends one JSON body to a collector endpoint.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        endpoint: &'static str,
        body: serde_json::Value,
    ) -> BoxFuture<'static, Result<(), EmitError>>;
}

/// `Transport` over HTTP POST.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<reqwest::Client>,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Arc<reqwest::Client>, base_url: &str) -> Self {
        HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        endpoint: &'static str,
        body: serde_json::Value,
    ) -> BoxFuture<'static, Result<(), EmitError>> {
        let client = Arc::clone(&self.client);
        let url = self.endpoint_url(endpoint);
        async move {
            let response = client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|source| EmitError::Request {
                    endpoint: endpoint.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(EmitError::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                });
            }
            Ok(())
        }
        .boxed()
    }
}

/// Dispatches emissions without ever blocking the caller.
///
/// Each emission runs on its own task; failures are logged and counted, then
/// dropped. No retries.
#[derive(Clone)]
pub struct Emitter {
    transport: Arc<dyn Transport>,
    stats: Arc<ProcessingStats>,
    tasks: TaskTracker,
}

impl Emitter {
    pub fn new(transport: Arc<dyn Transport>, stats: Arc<ProcessingStats>) -> Self {
        Emitter {
            transport,
            stats,
            tasks: TaskTracker::new(),
        }
    }

    /// Starts sending `emission` and returns immediately.
    pub fn emit(&self, emission: Emission) {
        let endpoint = emission.endpoint();
        let body = match emission.to_json() {
            Ok(body) => body,
            Err(e) => {
                let e = EmitError::from(e);
                log::warn!("Dropping {} payload: {}", endpoint, e);
                self.stats.increment_error(ErrorType::from(&e));
                return;
            }
        };

        let request = self.transport.post(endpoint, body);
        let stats = Arc::clone(&self.stats);
        self.tasks.spawn(async move {
            match request.await {
                Ok(()) => {
                    log::trace!("Sent {} payload", endpoint);
                    stats.increment_info(InfoType::EmitSucceeded);
                }
                Err(e) => {
                    log::warn!("Analytics emission failed: {}", e);
                    stats.increment_error(ErrorType::from(&e));
                }
            }
        });
    }

    /// Waits for every emission started so far to settle.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}
