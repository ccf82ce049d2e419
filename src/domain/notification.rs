use crate::domain::error_reason::ErrorReason;
use crate::error::RequestError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Terminal delivery state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Success,
    Unavailable,
    MalformedJson,
    Unauthorized,
    InternalServerError,
}

impl DeliveryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Unavailable => "unavailable",
            Self::MalformedJson => "malformed_json",
            Self::Unauthorized => "unauthorized",
            Self::InternalServerError => "internal_server_error",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the server (or the transport) said about a notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PushResponse {
    #[default]
    Pending,
    Success,
    /// No HTTP response was received.
    Unavailable,
    Reason(ErrorReason),
    /// The response body could not be interpreted.
    Diagnostic(String),
}

impl fmt::Display for PushResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Success => f.write_str("success"),
            Self::Unavailable => f.write_str("unavailable"),
            Self::Reason(reason) => write!(f, "{reason}"),
            Self::Diagnostic(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Device registration token.
    Token(String),
    Topic(String),
    Condition(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One push message addressed to FCM, together with its delivery outcome.
///
/// Outcome fields are never updated in place: the `with_*` methods consume the
/// value and return the updated copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub target: Target,
    pub content: Option<NotificationContent>,
    pub data: BTreeMap<String, String>,
    pub android: Option<Value>,
    pub apns: Option<Value>,
    pub webpush: Option<Value>,
    pub validate_only: bool,
    pub status: DeliveryStatus,
    pub response: PushResponse,
    /// Server-assigned message name, e.g. `projects/p1/messages/0:123`.
    pub name: Option<String>,
}

#[derive(Serialize)]
struct WirePayload<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    validate_only: bool,
    message: WireMessage<'a>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    #[serde(flatten)]
    target: &'a Target,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<&'a NotificationContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apns: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webpush: Option<&'a Value>,
}

impl Notification {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            content: None,
            data: BTreeMap::new(),
            android: None,
            apns: None,
            webpush: None,
            validate_only: false,
            status: DeliveryStatus::Pending,
            response: PushResponse::Pending,
            name: None,
        }
    }

    #[must_use]
    pub fn to_token(token: impl Into<String>) -> Self {
        Self::new(Target::Token(token.into()))
    }

    #[must_use]
    pub fn to_topic(topic: impl Into<String>) -> Self {
        Self::new(Target::Topic(topic.into()))
    }

    #[must_use]
    pub fn to_condition(condition: impl Into<String>) -> Self {
        Self::new(Target::Condition(condition.into()))
    }

    #[must_use]
    pub fn with_content(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        let content = self.content.get_or_insert_with(NotificationContent::default);
        content.title = Some(title.into());
        content.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_android(mut self, config: Value) -> Self {
        self.android = Some(config);
        self
    }

    #[must_use]
    pub fn with_apns(mut self, config: Value) -> Self {
        self.apns = Some(config);
        self
    }

    #[must_use]
    pub fn with_webpush(mut self, config: Value) -> Self {
        self.webpush = Some(config);
        self
    }

    #[must_use]
    pub const fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: PushResponse) -> Self {
        self.response = response;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The device token this notification is addressed to, if any.
    #[must_use]
    pub fn registration_id(&self) -> Option<&str> {
        match &self.target {
            Target::Token(token) => Some(token.as_str()),
            Target::Topic(_) | Target::Condition(_) => None,
        }
    }

    /// Serializes the notification into the FCM v1 `messages:send` body.
    ///
    /// # Errors
    /// Returns an error if one of the platform overrides fails to serialize.
    pub fn to_wire_payload(&self) -> Result<Vec<u8>, RequestError> {
        let payload = WirePayload {
            validate_only: self.validate_only,
            message: WireMessage {
                target: &self.target,
                notification: self.content.as_ref(),
                data: (!self.data.is_empty()).then_some(&self.data),
                android: self.android.as_ref(),
                apns: self.apns.as_ref(),
                webpush: self.webpush.as_ref(),
            },
        };
        Ok(serde_json::to_vec(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_payload_for_token_target() {
        let notification = Notification::to_token("device-abc").with_content("Hello", "World").with_data("k", "v");

        let payload: Value = serde_json::from_slice(&notification.to_wire_payload().unwrap()).unwrap();

        assert_eq!(
            payload,
            json!({
                "message": {
                    "token": "device-abc",
                    "notification": { "title": "Hello", "body": "World" },
                    "data": { "k": "v" }
                }
            })
        );
    }

    #[test]
    fn test_wire_payload_validate_only_and_overrides() {
        let notification = Notification::to_topic("news")
            .with_validate_only(true)
            .with_android(json!({ "priority": "high" }));

        let payload: Value = serde_json::from_slice(&notification.to_wire_payload().unwrap()).unwrap();

        assert_eq!(payload["validate_only"], json!(true));
        assert_eq!(payload["message"]["topic"], json!("news"));
        assert_eq!(payload["message"]["android"]["priority"], json!("high"));
        assert!(payload["message"].get("data").is_none());
    }

    #[test]
    fn test_outcome_fields_are_not_serialized() {
        let notification = Notification::to_condition("'a' in topics")
            .with_status(DeliveryStatus::Success)
            .with_response(PushResponse::Success)
            .with_name("projects/p1/messages/1");

        let payload: Value = serde_json::from_slice(&notification.to_wire_payload().unwrap()).unwrap();

        assert_eq!(payload, json!({ "message": { "condition": "'a' in topics" } }));
    }

    #[test]
    fn test_registration_id_only_for_tokens() {
        assert_eq!(Notification::to_token("t1").registration_id(), Some("t1"));
        assert_eq!(Notification::to_topic("news").registration_id(), None);
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let original = Notification::to_token("t1");
        let updated = original.clone().with_status(DeliveryStatus::Unauthorized);

        assert_eq!(original.status, DeliveryStatus::Pending);
        assert_eq!(updated.status, DeliveryStatus::Unauthorized);
    }
}
