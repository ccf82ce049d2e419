use crate::adapters::push::fcm::FcmConfig;
use thiserror::Error;

/// Fatal at startup: the adapter must not be put into service.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("No configuration registered under name {0:?}")]
    UnknownName(String),
    #[error("Invalid FCM config: {reason}")]
    Invalid { config: Box<FcmConfig>, reason: &'static str },
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("No token provider configured")]
    NotConfigured,
    #[error("Environment variable {0} is not set")]
    MissingVar(String),
    #[error("Token provider returned an empty token")]
    Empty,
    #[error("Token provider failed: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Stream failed: {0}")]
    Stream(String),
}

/// Failure to build a request for a notification.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Config is missing {0}")]
    Incomplete(&'static str),
    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Raised when a response cannot be mapped onto a known outcome.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The server reported something the adapter does not understand yet;
    /// the known reason set has to be extended.
    #[error("Unrecognized FCM error reason {reason:?} (normalized to {symbol:?})")]
    UnrecognizedReason { reason: String, symbol: String },
    #[error("Adapter finished the stream without reporting the notification")]
    NoResponse,
}
