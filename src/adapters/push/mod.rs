use crate::domain::Notification;
use crate::error::{ClassifyError, ConfigError, RequestError, TransportError};
use async_trait::async_trait;
use bytes::Bytes;

pub mod fcm;
pub mod token;

pub use token::{AccessToken, EnvTokenProvider, FnTokenProvider, StaticTokenProvider, TokenProvider};

/// A single HTTP/2 header. Pseudo-headers (`:method`, `:path`) are included.
pub type Header = (&'static str, String);

/// Invoked at most once with the updated copy of a notification.
pub type OnResponse = Box<dyn FnOnce(Notification) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Https => "https",
        }
    }
}

/// Socket options handed to the transport when a connection is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOption {
    /// Deliver inbound data one read at a time.
    ActiveOnce,
    /// No packet framing on top of the byte stream.
    RawPacket,
    ReuseAddr,
    /// ALPN protocols to advertise during the TLS handshake.
    Alpn(Vec<String>),
    Binary,
    /// Explicit port; omitted when the scheme default applies.
    Port(u16),
}

/// Outcome of one request/response exchange on an HTTP/2 connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamResult {
    pub error: Option<String>,
    pub status: Option<u16>,
    pub body: Bytes,
}

impl StreamResult {
    #[must_use]
    pub fn completed(status: u16, body: impl Into<Bytes>) -> Self {
        Self { error: None, status: Some(status), body: body.into() }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), status: None, body: Bytes::new() }
    }
}

#[async_trait]
pub trait Http2Transport: Send + Sync + std::fmt::Debug {
    /// Opens a session to `host`.
    ///
    /// # Errors
    /// Returns `TransportError::Connect` if the connection cannot be established.
    async fn connect(
        &self,
        host: &str,
        scheme: Scheme,
        options: &[ConnectOption],
    ) -> Result<Box<dyn Http2Session>, TransportError>;
}

#[async_trait]
pub trait Http2Session: Send + Sync + std::fmt::Debug {
    /// Sends one request and waits for the end of its stream.
    /// Transport failures are reported through `StreamResult::error`.
    async fn send(&self, headers: &[Header], body: Bytes) -> StreamResult;
}

/// Protocol knowledge a dispatcher needs to drive one push backend.
#[async_trait]
pub trait PushAdapter: Send + Sync + std::fmt::Debug {
    /// Routing name of this endpoint, if registered under one.
    fn name(&self) -> Option<&str>;

    /// # Errors
    /// Returns `ConfigError::Invalid` if mandatory fields are missing.
    fn validate(&self) -> Result<(), ConfigError>;

    fn connect_options(&self) -> Vec<ConnectOption>;

    /// # Errors
    /// Returns the transport error unchanged; no retry is attempted.
    async fn connect(&self, transport: &dyn Http2Transport) -> Result<Box<dyn Http2Session>, TransportError>;

    /// # Errors
    /// Returns an error if a bearer token cannot be obtained.
    fn push_headers(&self, notification: &Notification) -> Result<Vec<Header>, RequestError>;

    /// # Errors
    /// Returns an error if the notification cannot be serialized.
    fn push_payload(&self, notification: &Notification) -> Result<Bytes, RequestError>;

    /// Classifies a finished stream and hands the updated notification to `on_response`.
    ///
    /// # Errors
    /// Returns `ClassifyError` when the server reports a reason outside the known set.
    fn handle_end_stream(
        &self,
        stream: &StreamResult,
        notification: Notification,
        on_response: Option<OnResponse>,
    ) -> Result<(), ClassifyError>;

    fn schedule_ping(&self) {}

    fn close(&self) {}
}
