use crate::adapters::push::TokenProvider;
use crate::error::ConfigError;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "fcm.googleapis.com";
pub const DEFAULT_PORT: u16 = 443;

/// Connection and authentication settings for one FCM endpoint.
///
/// Built once at startup and shared read-only afterwards. Fields are public so a
/// partially filled value can exist before [`FcmConfig::validate`] is called.
#[derive(Clone, Debug)]
pub struct FcmConfig {
    pub name: Option<String>,
    pub host: String,
    pub port: u16,
    pub project_id: Option<String>,
    pub token_provider: Option<Arc<dyn TokenProvider>>,
    /// Log every non-success response with its code and reason.
    pub debug_log: bool,
}

/// Unvalidated option mapping from which an [`FcmConfig`] is built.
#[derive(Clone, Debug, Default)]
pub struct FcmOptions {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub project_id: Option<String>,
    pub token_provider: Option<Arc<dyn TokenProvider>>,
    pub debug_log: bool,
}

impl FcmOptions {
    #[must_use]
    pub fn new(project_id: impl Into<String>, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self { project_id: Some(project_id.into()), token_provider: Some(token_provider), ..Self::default() }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub const fn debug_log(mut self, enabled: bool) -> Self {
        self.debug_log = enabled;
        self
    }
}

/// Name-keyed lookup of externally stored endpoint options.
pub trait ConfigSource {
    fn lookup(&self, name: &str) -> Option<FcmOptions>;
}

/// In-memory [`ConfigSource`] that may be filled concurrently.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    entries: DashMap<String, FcmOptions>,
}

impl ConfigRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, options: FcmOptions) {
        self.entries.insert(name.into(), options);
    }
}

impl ConfigSource for ConfigRegistry {
    fn lookup(&self, name: &str) -> Option<FcmOptions> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }
}

impl ConfigSource for HashMap<String, FcmOptions> {
    fn lookup(&self, name: &str) -> Option<FcmOptions> {
        self.get(name).cloned()
    }
}

impl FcmConfig {
    /// Builds a config from an option mapping, filling in the default host and port.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingRequiredField` if `project_id` or `token_provider` is absent.
    pub fn new(options: FcmOptions) -> Result<Self, ConfigError> {
        let project_id = options.project_id.ok_or(ConfigError::MissingRequiredField("project_id"))?;
        let token_provider = options.token_provider.ok_or(ConfigError::MissingRequiredField("token_provider"))?;

        Ok(Self {
            name: options.name,
            host: options.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: options.port.unwrap_or(DEFAULT_PORT),
            project_id: Some(project_id),
            token_provider: Some(token_provider),
            debug_log: options.debug_log,
        })
    }

    /// Looks up the options registered under `name` and builds a config from them.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownName` if nothing is registered under `name`,
    /// or any error from [`FcmConfig::new`].
    pub fn from_source(name: &str, source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let Some(options) = source.lookup(name) else {
            return Err(ConfigError::UnknownName(name.to_string()));
        };
        Self::new(FcmOptions { name: Some(name.to_string()), ..options })
    }

    /// Checks that the config can be put into service.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` carrying this config if `project_id` is
    /// missing or empty, or if no token provider is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reason = match (&self.project_id, &self.token_provider) {
            (None, _) => "project_id is missing",
            (Some(project_id), _) if project_id.is_empty() => "project_id must be a non-empty string",
            (Some(_), None) => "token_provider is missing",
            (Some(_), Some(_)) => return Ok(()),
        };
        Err(ConfigError::Invalid { config: Box::new(self.clone()), reason })
    }
}
