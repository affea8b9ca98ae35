//! Callback delivery.
//!
//! Delivery is fire-and-forget by platform design: the callback POST is
//! issued exactly once, its response body is consumed and discarded, and
//! failures are logged but never retried or surfaced to the original
//! caller (at-most-once semantics).

use std::time::Duration;
use tracing::{info, warn};

use skillbot_config::DeliveryConfig;
use skillbot_core::error::DeliveryError;

use crate::envelope::Envelope;

/// Delivers rendered envelopes, enforcing the platform's minimum delay.
pub struct DeliveryAdapter {
    client: reqwest::Client,
    min_delay: Duration,
}

impl DeliveryAdapter {
    /// Create an adapter.
    ///
    /// `allow_insecure` disables certificate validation on callback POSTs.
    /// The platform's callback hosts use self-signed certificates; the flag
    /// makes that trust decision explicit and auditable.
    pub fn new(min_delay: Duration, allow_insecure: bool, callback_timeout: Duration) -> Self {
        if allow_insecure {
            warn!("Certificate validation on callback POSTs is DISABLED by configuration");
        }

        let client = reqwest::Client::builder()
            .timeout(callback_timeout)
            .danger_accept_invalid_certs(allow_insecure)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, min_delay }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_delay_ms),
            config.allow_insecure_callback,
            Duration::from_secs(config.callback_timeout_secs),
        )
    }

    /// Deliver an envelope.
    ///
    /// Always waits the minimum delay first. With no callback address the
    /// envelope is simply returned for the synchronous response; with one,
    /// the envelope is additionally POSTed to the address.
    pub async fn deliver(&self, envelope: Envelope, callback_address: Option<&str>) -> Envelope {
        tokio::time::sleep(self.min_delay).await;

        if let Some(url) = callback_address {
            match self.post_callback(url, &envelope).await {
                Ok(()) => info!(url = %url, "Callback delivered"),
                Err(e) => warn!(error = %e, "Callback delivery failed, not retrying"),
            }
        }

        envelope
    }

    async fn post_callback(&self, url: &str, envelope: &Envelope) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| DeliveryError::CallbackFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        // The platform's callback response carries nothing we act on.
        let _ = response.bytes().await;

        if !status.is_success() {
            return Err(DeliveryError::CallbackRejected {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::render;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Spin up a local callback receiver; returns its URL, a POST counter,
    /// and the last received body.
    async fn callback_receiver() -> (String, Arc<AtomicUsize>, Arc<Mutex<Option<serde_json::Value>>>)
    {
        let hits = Arc::new(AtomicUsize::new(0));
        let body = Arc::new(Mutex::new(None));

        let hits_handler = hits.clone();
        let body_handler = body.clone();
        let app = Router::new().route(
            "/callback",
            post(move |Json(payload): Json<serde_json::Value>| {
                let hits = hits_handler.clone();
                let body = body_handler.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    *body.lock().unwrap() = Some(payload);
                    Json(serde_json::json!({"status": "ok"}))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/callback"), hits, body)
    }

    fn test_adapter(min_delay_ms: u64) -> DeliveryAdapter {
        DeliveryAdapter::new(
            Duration::from_millis(min_delay_ms),
            false,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn sync_delivery_returns_envelope_after_min_delay() {
        let adapter = test_adapter(50);
        let envelope = render("답변");

        let start = Instant::now();
        let delivered = adapter.deliver(envelope.clone(), None).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(delivered, envelope);
    }

    #[tokio::test]
    async fn callback_delivery_posts_exactly_once() {
        let (url, hits, body) = callback_receiver().await;
        let adapter = test_adapter(10);
        let envelope = render("콜백 답변");

        adapter.deliver(envelope.clone(), Some(&url)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let received = body.lock().unwrap().clone().unwrap();
        assert_eq!(
            received,
            serde_json::to_value(&envelope).unwrap()
        );
    }

    #[tokio::test]
    async fn no_callback_address_means_no_post() {
        let (_url, hits, _body) = callback_receiver().await;
        let adapter = test_adapter(10);

        adapter.deliver(render("동기 답변"), None).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn callback_failure_is_swallowed() {
        let adapter = test_adapter(1);
        // Nothing listens on this port; delivery still completes.
        let delivered = adapter
            .deliver(render("답변"), Some("http://127.0.0.1:9/callback"))
            .await;
        assert_eq!(delivered.template.outputs[0].simple_text.text, "답변");
    }
}
