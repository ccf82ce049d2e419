//! Firebase Cloud Messaging (HTTP v1) backend.
//!
//! [`FcmConfig`] carries everything needed to talk to one FCM project and
//! implements [`PushAdapter`]: it opens connections through an injected
//! transport, builds authenticated `messages:send` requests and turns finished
//! streams into delivery outcomes.

use crate::adapters::push::{ConnectOption, Header, Http2Session, Http2Transport, OnResponse, PushAdapter, StreamResult};
use crate::domain::Notification;
use crate::error::{ClassifyError, ConfigError, RequestError, TransportError};
use async_trait::async_trait;
use bytes::Bytes;

mod config;
mod connect;
mod request;
mod response;

pub use config::{ConfigRegistry, ConfigSource, DEFAULT_HOST, DEFAULT_PORT, FcmConfig, FcmOptions};

impl FcmConfig {
    /// Classifies a finished stream without invoking any callback.
    ///
    /// # Errors
    /// Returns `ClassifyError::UnrecognizedReason` if the server reports an unknown error reason.
    pub fn classify(&self, stream: &StreamResult, notification: Notification) -> Result<Notification, ClassifyError> {
        response::classify(self, stream, notification)
    }
}

#[async_trait]
impl PushAdapter for FcmConfig {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Self::validate(self)
    }

    fn connect_options(&self) -> Vec<ConnectOption> {
        connect::connect_options(self)
    }

    async fn connect(&self, transport: &dyn Http2Transport) -> Result<Box<dyn Http2Session>, TransportError> {
        connect::connect(self, transport).await
    }

    fn push_headers(&self, _notification: &Notification) -> Result<Vec<Header>, RequestError> {
        request::headers(self)
    }

    fn push_payload(&self, notification: &Notification) -> Result<Bytes, RequestError> {
        request::payload(notification)
    }

    fn handle_end_stream(
        &self,
        stream: &StreamResult,
        notification: Notification,
        on_response: Option<OnResponse>,
    ) -> Result<(), ClassifyError> {
        response::handle_end_stream(self, stream, notification, on_response)
    }
}
