use crate::adapters::push::{ConnectOption, Header, Http2Session, Http2Transport, Scheme, StreamResult};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// HTTP/2 transport backed by `reqwest`.
///
/// Only `Alpn` and `Port` influence this transport; the remaining socket
/// options are handled by the underlying connector. The TCP/TLS connection is
/// opened lazily on the first stream.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    request_timeout: Duration,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl Http2Transport for ReqwestTransport {
    async fn connect(
        &self,
        host: &str,
        scheme: Scheme,
        options: &[ConnectOption],
    ) -> Result<Box<dyn Http2Session>, TransportError> {
        let port = options.iter().find_map(|option| match option {
            ConnectOption::Port(port) => Some(*port),
            _ => None,
        });
        let h2_only = options
            .iter()
            .any(|option| matches!(option, ConnectOption::Alpn(protocols) if protocols.iter().any(|p| p == "h2")));

        let mut builder = reqwest::Client::builder().timeout(self.request_timeout);
        if h2_only {
            builder = builder.http2_prior_knowledge();
        }
        let client = builder.build().map_err(|e| TransportError::Connect(e.to_string()))?;

        let authority = port.map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
        let base_url = format!("{}://{authority}", scheme.as_str());
        tracing::debug!(base_url = %base_url, h2_only, "HTTP/2 session prepared");

        Ok(Box::new(ReqwestSession { client, base_url }))
    }
}

#[derive(Debug)]
struct ReqwestSession {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestSession {
    fn build_request(&self, headers: &[Header], body: Bytes) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut method = Method::POST;
        let mut path: &str = "/";
        let mut header_map = HeaderMap::new();

        for (name, value) in headers {
            match *name {
                ":method" => {
                    method = Method::from_bytes(value.as_bytes())
                        .map_err(|e| TransportError::Stream(format!("invalid method {value}: {e}")))?;
                }
                ":path" => path = value.as_str(),
                pseudo if pseudo.starts_with(':') => {}
                name => {
                    let header_name = HeaderName::from_bytes(name.as_bytes())
                        .map_err(|e| TransportError::Stream(format!("invalid header name {name}: {e}")))?;
                    let header_value = HeaderValue::from_str(value)
                        .map_err(|e| TransportError::Stream(format!("invalid value for header {name}: {e}")))?;
                    header_map.append(header_name, header_value);
                }
            }
        }

        Ok(self.client.request(method, format!("{}{path}", self.base_url)).headers(header_map).body(body))
    }
}

#[async_trait]
impl Http2Session for ReqwestSession {
    async fn send(&self, headers: &[Header], body: Bytes) -> StreamResult {
        let request = match self.build_request(headers, body) {
            Ok(request) => request,
            Err(e) => return StreamResult::failed(e.to_string()),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return StreamResult::failed(e.to_string()),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => StreamResult::completed(status, body),
            Err(e) => StreamResult::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_builds_request_from_pseudo_headers() {
        let transport = ReqwestTransport::default();
        let options = [ConnectOption::Alpn(vec!["h2".to_string()]), ConnectOption::Port(5228)];
        let session = ReqwestSession {
            client: reqwest::Client::new(),
            base_url: "https://fcm.example.test:5228".to_string(),
        };
        // connect() never touches the network, so it must succeed offline.
        assert!(transport.connect("fcm.example.test", Scheme::Https, &options).await.is_ok());

        let headers = vec![
            (":method", "POST".to_string()),
            (":path", "/v1/projects/p1/messages:send".to_string()),
            ("authorization", "Bearer abc".to_string()),
        ];
        let request = session.build_request(&headers, Bytes::from_static(b"{}")).unwrap().build().unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://fcm.example.test:5228/v1/projects/p1/messages:send");
        assert_eq!(request.headers()["authorization"], "Bearer abc");
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        let session = ReqwestSession { client: reqwest::Client::new(), base_url: "https://localhost".to_string() };
        let headers = vec![("authorization", "Bearer \n".to_string())];

        assert!(matches!(session.build_request(&headers, Bytes::new()), Err(TransportError::Stream(_))));
    }
}
