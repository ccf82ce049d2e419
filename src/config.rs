use crate::adapters::push::fcm::{DEFAULT_HOST, DEFAULT_PORT, FcmOptions};
use crate::adapters::push::{EnvTokenProvider, TokenProvider};
use crate::domain::Notification;
use clap::{Args, Parser, ValueEnum};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Send a notification through Firebase Cloud Messaging", long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub fcm: FcmArgs,

    #[command(flatten)]
    pub message: MessageArgs,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct FcmArgs {
    /// Routing name of this endpoint
    #[arg(long = "fcm-name", env = "FCM_NAME")]
    pub name: Option<String>,

    /// FCM endpoint host
    #[arg(long = "fcm-host", env = "FCM_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// FCM endpoint port
    #[arg(long = "fcm-port", env = "FCM_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Firebase project the messages are sent from
    #[arg(long, env = "FCM_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Environment variable holding the OAuth access token (read on every request)
    #[arg(long, env = "FCM_TOKEN_ENV", default_value = "FCM_ACCESS_TOKEN")]
    pub token_env: String,

    /// Log every failed response with its status code and reason
    #[arg(long, env = "FCM_DEBUG_LOG", default_value_t = false)]
    pub debug_log: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "FCM_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl FcmArgs {
    #[must_use]
    pub fn to_options(&self) -> FcmOptions {
        let token_provider: Arc<dyn TokenProvider> = Arc::new(EnvTokenProvider::new(self.token_env.clone()));
        FcmOptions {
            name: self.name.clone(),
            host: Some(self.host.clone()),
            port: Some(self.port),
            project_id: self.project_id.clone(),
            token_provider: Some(token_provider),
            debug_log: self.debug_log,
        }
    }
}

#[derive(Clone, Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Device registration token
    #[arg(long)]
    pub device_token: Option<String>,

    /// Topic name
    #[arg(long)]
    pub topic: Option<String>,

    /// Topic condition expression, e.g. "'a' in topics && 'b' in topics"
    #[arg(long)]
    pub condition: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct MessageArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Notification title
    #[arg(long)]
    pub title: Option<String>,

    /// Notification body
    #[arg(long)]
    pub body: Option<String>,

    /// Data entries as key=value, repeatable
    #[arg(long = "data", value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,

    /// Android-specific override as a JSON object
    #[arg(long, value_parser = parse_json)]
    pub android: Option<Value>,

    /// APNs-specific override as a JSON object
    #[arg(long, value_parser = parse_json)]
    pub apns: Option<Value>,

    /// Webpush-specific override as a JSON object
    #[arg(long, value_parser = parse_json)]
    pub webpush: Option<Value>,

    /// Ask FCM to validate the message without delivering it
    #[arg(long, default_value_t = false)]
    pub validate_only: bool,
}

impl MessageArgs {
    /// Builds the notification described on the command line.
    ///
    /// # Errors
    /// Returns an error if no target was given.
    pub fn to_notification(&self) -> anyhow::Result<Notification> {
        let target = &self.target;
        let mut notification = if let Some(token) = &target.device_token {
            Notification::to_token(token)
        } else if let Some(topic) = &target.topic {
            Notification::to_topic(topic)
        } else if let Some(condition) = &target.condition {
            Notification::to_condition(condition)
        } else {
            anyhow::bail!("one of --device-token, --topic or --condition is required");
        };

        if self.title.is_some() || self.body.is_some() {
            let content = notification.content.get_or_insert_with(Default::default);
            content.title.clone_from(&self.title);
            content.body.clone_from(&self.body);
        }
        for (key, value) in &self.data {
            notification = notification.with_data(key, value);
        }
        if let Some(android) = &self.android {
            notification = notification.with_android(android.clone());
        }
        if let Some(apns) = &self.apns {
            notification = notification.with_apns(apns.clone());
        }
        if let Some(webpush) = &self.webpush {
            notification = notification.with_webpush(webpush.clone());
        }
        Ok(notification.with_validate_only(self.validate_only))
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_json(s: &str) -> Result<Value, String> {
    match serde_json::from_str(s) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(format!("expected a JSON object, got {s:?}")),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "FCM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "FCM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// OTLP collector endpoint (traces and metrics are only exported when set)
    #[arg(long, env = "FCM_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
