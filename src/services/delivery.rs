use crate::adapters::push::{Http2Session, Http2Transport, OnResponse, PushAdapter, StreamResult};
use crate::domain::{Notification, PushResponse};
use crate::error::{ClassifyError, TransportError};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};

#[derive(Clone, Debug)]
struct Metrics {
    streams_total: Counter<u64>,
    connects_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("fcm-adapter");
        Self {
            streams_total: meter
                .u64_counter("fcm_responses_total")
                .with_description("Total number of finished FCM streams, by HTTP status")
                .build(),
            connects_total: meter
                .u64_counter("fcm_connects_total")
                .with_description("Total number of connection attempts to the FCM endpoint")
                .build(),
        }
    }
}

/// Drives single notifications through one push adapter.
///
/// The session is opened on first use and reused afterwards. Failed sends are
/// not retried.
#[derive(Debug)]
pub struct DeliveryService {
    adapter: Arc<dyn PushAdapter>,
    transport: Arc<dyn Http2Transport>,
    session: Mutex<Option<Arc<dyn Http2Session>>>,
    metrics: Metrics,
}

impl DeliveryService {
    pub fn new(adapter: Arc<dyn PushAdapter>, transport: Arc<dyn Http2Transport>) -> Self {
        Self { adapter, transport, session: Mutex::new(None), metrics: Metrics::new() }
    }

    /// Sends `notification` and hands the updated copy to `on_response`.
    ///
    /// Connection, token and serialization failures are reported to the
    /// callback as an unavailable stream. A response telling that the device
    /// token is no longer valid is logged at `warn`.
    ///
    /// # Errors
    /// Returns `ClassifyError` if the server reported an error reason the adapter does not know.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(adapter = ?self.adapter.name(), status = tracing::field::Empty),
        err
    )]
    pub async fn deliver(&self, notification: Notification, on_response: Option<OnResponse>) -> Result<(), ClassifyError> {
        let stream = self.send(&notification).await;

        let status_label = stream.status.map_or_else(|| "error".to_string(), |code| code.to_string());
        tracing::Span::current().record("status", status_label.as_str());
        self.metrics.streams_total.add(1, &[KeyValue::new("status", status_label)]);

        let on_response = on_response.map(|respond| -> OnResponse {
            Box::new(move |updated: Notification| {
                report_stale_token(&updated);
                respond(updated);
            })
        });
        self.adapter.handle_end_stream(&stream, notification, on_response)
    }

    /// Sends `notification` and returns its updated copy.
    ///
    /// # Errors
    /// Returns `ClassifyError` if the server reported an error reason the adapter does not know,
    /// or if the adapter never handed the notification back.
    pub async fn push(&self, notification: Notification) -> Result<Notification, ClassifyError> {
        let (tx, rx) = oneshot::channel();
        self.deliver(
            notification,
            Some(Box::new(move |updated: Notification| {
                let _ = tx.send(updated);
            })),
        )
        .await?;
        rx.await.map_err(|_| ClassifyError::NoResponse)
    }

    /// Drops the cached session and lets the adapter release its resources.
    pub async fn shutdown(&self) {
        self.session.lock().await.take();
        self.adapter.close();
        tracing::debug!(adapter = ?self.adapter.name(), "Delivery service shut down");
    }

    async fn send(&self, notification: &Notification) -> StreamResult {
        let session = match self.session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to push endpoint");
                return StreamResult::failed(e.to_string());
            }
        };

        let request = self
            .adapter
            .push_headers(notification)
            .and_then(|headers| Ok((headers, self.adapter.push_payload(notification)?)));
        match request {
            Ok((headers, body)) => session.send(&headers, body).await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build push request");
                StreamResult::failed(e.to_string())
            }
        }
    }

    async fn session(&self) -> Result<Arc<dyn Http2Session>, TransportError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(Arc::clone(session));
        }

        self.metrics.connects_total.add(1, &[]);
        let session: Arc<dyn Http2Session> = Arc::from(self.adapter.connect(self.transport.as_ref()).await?);
        self.adapter.schedule_ping();
        *guard = Some(Arc::clone(&session));
        Ok(session)
    }
}

fn report_stale_token(notification: &Notification) {
    if let PushResponse::Reason(reason) = &notification.response
        && reason.is_token_invalid()
    {
        tracing::warn!(
            registration_id = ?notification.registration_id(),
            reason = %reason,
            "FCM rejected the device token; it should be discarded"
        );
    }
}
