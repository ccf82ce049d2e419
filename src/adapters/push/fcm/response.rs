use super::FcmConfig;
use crate::adapters::push::{OnResponse, StreamResult};
use crate::domain::{DeliveryStatus, ErrorReason, Notification, PushResponse};
use crate::error::ClassifyError;
use serde_json::Value;

pub(super) fn handle_end_stream(
    config: &FcmConfig,
    stream: &StreamResult,
    notification: Notification,
    on_response: Option<OnResponse>,
) -> Result<(), ClassifyError> {
    if stream.error.is_some() && on_response.is_none() {
        return Ok(());
    }

    let updated = classify(config, stream, notification)?;
    if let Some(on_response) = on_response {
        on_response(updated);
    }
    Ok(())
}

/// Maps a finished stream onto the notification's terminal state.
///
/// Pure: the same stream and notification always yield the same result.
pub(super) fn classify(
    config: &FcmConfig,
    stream: &StreamResult,
    notification: Notification,
) -> Result<Notification, ClassifyError> {
    let status = match (&stream.error, stream.status) {
        (None, Some(status)) => status,
        (error, _) => {
            tracing::debug!(error = ?error, "Stream ended without a response");
            return Ok(notification.with_status(DeliveryStatus::Unavailable).with_response(PushResponse::Unavailable));
        }
    };

    match status {
        200 => parse_success(&stream.body, notification.with_status(DeliveryStatus::Success)),
        400 => {
            log_error(config, status, "Malformed JSON");
            Ok(notification.with_status(DeliveryStatus::MalformedJson))
        }
        401 => {
            log_error(config, status, "Unauthorized");
            Ok(notification.with_status(DeliveryStatus::Unauthorized))
        }
        500 => {
            log_error(config, status, "Internal server error");
            Ok(notification.with_status(DeliveryStatus::InternalServerError))
        }
        code => {
            let response = parse_error(&stream.body).inspect_err(|e| {
                tracing::error!(code, error = %e, "FCM returned an unrecognized error reason");
            })?;
            log_error(config, code, &response.to_string());
            Ok(notification.with_response(response))
        }
    }
}

fn parse_success(body: &[u8], notification: Notification) -> Result<Notification, ClassifyError> {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => return Ok(notification.with_response(decode_failure(&e, body))),
    };

    if let Some(name) = value.get("name") {
        let notification = notification.with_response(PushResponse::Success);
        return Ok(match name.as_str() {
            Some(name) => notification.with_name(name),
            None => notification,
        });
    }

    match value.get("error").and_then(reason_of) {
        Some(reason) => {
            let reason = ErrorReason::parse(reason).inspect_err(|e| {
                tracing::error!(error = %e, "FCM success response carried an unrecognized error reason");
            })?;
            Ok(notification.with_response(PushResponse::Reason(reason)))
        }
        None => Ok(notification.with_response(unexpected_body(body))),
    }
}

/// Normalizes the error reason carried by a non-success response body.
///
/// A body that is not valid JSON yields a diagnostic instead of an error.
fn parse_error(body: &[u8]) -> Result<PushResponse, ClassifyError> {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => return Ok(decode_failure(&e, body)),
    };

    let reason = value.get("reason").and_then(Value::as_str).or_else(|| value.get("error").and_then(reason_of));
    match reason {
        Some(reason) => ErrorReason::parse(reason).map(PushResponse::Reason),
        None => Ok(unexpected_body(body)),
    }
}

/// Reads the reason out of either a legacy `"error": "InvalidRegistration"`
/// or a v1 envelope. In the v1 envelope the `FcmError` detail's `errorCode`
/// (`UNREGISTERED`) wins over the rpc `status` (`NOT_FOUND`).
fn reason_of(error: &Value) -> Option<&str> {
    match error {
        Value::String(reason) => Some(reason.as_str()),
        Value::Object(fields) => fcm_error_code(fields.get("details"))
            .or_else(|| fields.get("reason").and_then(Value::as_str))
            .or_else(|| fields.get("status").and_then(Value::as_str)),
        _ => None,
    }
}

fn fcm_error_code(details: Option<&Value>) -> Option<&str> {
    details?
        .as_array()?
        .iter()
        .filter(|detail| detail.get("@type").and_then(Value::as_str).is_some_and(|kind| kind.ends_with("FcmError")))
        .find_map(|detail| detail.get("errorCode").and_then(Value::as_str))
}

fn decode_failure(error: &serde_json::Error, body: &[u8]) -> PushResponse {
    let body = String::from_utf8_lossy(body);
    tracing::error!(error = %error, body = %body, "Failed to decode FCM response body");
    PushResponse::Diagnostic(format!("Failed to decode response body: {error}, body: {body}"))
}

fn unexpected_body(body: &[u8]) -> PushResponse {
    let body = String::from_utf8_lossy(body);
    tracing::error!(body = %body, "FCM response body has no name or error reason");
    PushResponse::Diagnostic(format!("Unexpected response body: {body}"))
}

fn log_error(config: &FcmConfig, code: u16, reason: &str) {
    if config.debug_log {
        tracing::error!(code, reason, project_id = ?config.project_id, "FCM request failed");
    }
}
