use async_trait::async_trait;
use bytes::Bytes;
use fcm_adapter::adapters::push::fcm::{FcmConfig, FcmOptions};
use fcm_adapter::adapters::push::{
    ConnectOption, Header, Http2Session, Http2Transport, Scheme, StaticTokenProvider, StreamResult,
};
use fcm_adapter::error::TransportError;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("fcm_adapter=debug".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

#[allow(dead_code)]
pub fn test_config() -> FcmConfig {
    FcmConfig::new(FcmOptions::new("test-project", Arc::new(StaticTokenProvider::new("test-token"))).debug_log(true))
        .unwrap()
}

/// Log sink for asserting on what was (or was not) emitted.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl CapturedLogs {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A request as seen by the fake transport.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SentRequest {
    pub headers: Vec<Header>,
    pub body: Bytes,
}

#[derive(Debug, Default)]
struct Recorded {
    connects: Vec<(String, Scheme, Vec<ConnectOption>)>,
    requests: Vec<SentRequest>,
    responses: VecDeque<StreamResult>,
}

/// Transport double that records every connect and request and replays
/// scripted stream results in order.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct FakeTransport {
    state: Arc<Mutex<Recorded>>,
    refuse_connect: bool,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self { refuse_connect: true, ..Self::default() }
    }

    pub fn respond_with(&self, result: StreamResult) {
        self.state.lock().unwrap().responses.push_back(result);
    }

    pub fn connects(&self) -> Vec<(String, Scheme, Vec<ConnectOption>)> {
        self.state.lock().unwrap().connects.clone()
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl Http2Transport for FakeTransport {
    async fn connect(
        &self,
        host: &str,
        scheme: Scheme,
        options: &[ConnectOption],
    ) -> Result<Box<dyn Http2Session>, TransportError> {
        self.state.lock().unwrap().connects.push((host.to_string(), scheme, options.to_vec()));
        if self.refuse_connect {
            return Err(TransportError::Connect("connection refused".to_string()));
        }
        Ok(Box::new(FakeSession { state: Arc::clone(&self.state) }))
    }
}

#[derive(Debug)]
struct FakeSession {
    state: Arc<Mutex<Recorded>>,
}

#[async_trait]
impl Http2Session for FakeSession {
    async fn send(&self, headers: &[Header], body: Bytes) -> StreamResult {
        let mut state = self.state.lock().unwrap();
        state.requests.push(SentRequest { headers: headers.to_vec(), body });
        state.responses.pop_front().unwrap_or_else(|| StreamResult::failed("no scripted response"))
    }
}
