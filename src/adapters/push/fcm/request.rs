use super::FcmConfig;
use crate::adapters::push::Header;
use crate::domain::Notification;
use crate::error::{RequestError, TokenError};
use bytes::Bytes;

/// Fetches a fresh bearer token and returns the request headers in wire order.
pub(super) fn headers(config: &FcmConfig) -> Result<Vec<Header>, RequestError> {
    let project_id = config.project_id.as_deref().ok_or(RequestError::Incomplete("project_id"))?;
    let provider = config.token_provider.as_ref().ok_or(TokenError::NotConfigured)?;
    let token = provider.fetch()?;

    Ok(vec![
        (":method", "POST".to_string()),
        (":path", format!("/v1/projects/{project_id}/messages:send")),
        ("authorization", format!("Bearer {}", token.token)),
        ("content-type", "application/json".to_string()),
        ("accept", "application/json".to_string()),
    ])
}

pub(super) fn payload(notification: &Notification) -> Result<Bytes, RequestError> {
    notification.to_wire_payload().map(Bytes::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::push::fcm::FcmOptions;
    use crate::adapters::push::{AccessToken, FnTokenProvider};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_headers_fetch_a_fresh_token_each_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let provider_counter = Arc::clone(&counter);
        let provider = FnTokenProvider::new(move || {
            let n = provider_counter.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("tok-{n}")))
        });
        let config = FcmConfig::new(FcmOptions::new("proj-9", Arc::new(provider))).unwrap();

        let first = headers(&config).unwrap();
        let second = headers(&config).unwrap();

        assert_eq!(first[2], ("authorization", "Bearer tok-0".to_string()));
        assert_eq!(second[2], ("authorization", "Bearer tok-1".to_string()));
        assert_eq!(first[1], (":path", "/v1/projects/proj-9/messages:send".to_string()));
    }

    #[test]
    fn test_headers_without_provider_fail() {
        let config = FcmConfig {
            name: None,
            host: "localhost".to_string(),
            port: 443,
            project_id: Some("p1".to_string()),
            token_provider: None,
            debug_log: false,
        };

        assert!(matches!(headers(&config), Err(RequestError::Token(TokenError::NotConfigured))));
    }

    #[test]
    fn test_token_errors_propagate() {
        let provider = FnTokenProvider::new(|| Err(TokenError::Provider("metadata server down".to_string())));
        let config = FcmConfig::new(FcmOptions::new("p1", Arc::new(provider))).unwrap();

        let err = headers(&config).unwrap_err();
        assert_eq!(err.to_string(), "Token provider failed: metadata server down");
    }
}
