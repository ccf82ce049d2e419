use crate::error::TokenError;
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
}

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken").field("token", &"<redacted>").finish()
    }
}

/// Source of OAuth bearer tokens for the messaging endpoint.
///
/// Called once per request and expected to block until a token is available.
/// Caching and refresh are up to the implementation.
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// # Errors
    /// Returns an error if no token can be produced.
    fn fetch(&self) -> Result<AccessToken, TokenError>;
}

/// Always returns the same token. Mostly useful for tests and short-lived tools.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

impl TokenProvider for StaticTokenProvider {
    fn fetch(&self) -> Result<AccessToken, TokenError> {
        Ok(AccessToken::new(self.token.clone()))
    }
}

/// Reads the token from an environment variable on every call, so an
/// externally rotated token is picked up without a restart.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn fetch(&self) -> Result<AccessToken, TokenError> {
        let token = std::env::var(&self.var).map_err(|_| TokenError::MissingVar(self.var.clone()))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(AccessToken::new(token))
    }
}

/// Wraps a closure. Any fixed arguments are captured by the closure itself.
pub struct FnTokenProvider<F> {
    fetch: F,
}

impl<F> FnTokenProvider<F>
where
    F: Fn() -> Result<AccessToken, TokenError> + Send + Sync,
{
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> fmt::Debug for FnTokenProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTokenProvider").finish_non_exhaustive()
    }
}

impl<F> TokenProvider for FnTokenProvider<F>
where
    F: Fn() -> Result<AccessToken, TokenError> + Send + Sync,
{
    fn fetch(&self) -> Result<AccessToken, TokenError> {
        (self.fetch)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.fetch().unwrap().token, "abc");
    }

    #[test]
    fn test_debug_output_hides_token() {
        let provider = StaticTokenProvider::new("secret-token");
        assert!(!format!("{provider:?}").contains("secret-token"));
        assert!(!format!("{:?}", AccessToken::new("secret-token")).contains("secret-token"));
    }

    #[test]
    fn test_env_provider_missing_var() {
        let provider = EnvTokenProvider::new("FCM_ADAPTER_TEST_DEFINITELY_UNSET");
        assert!(matches!(provider.fetch(), Err(TokenError::MissingVar(var)) if var == "FCM_ADAPTER_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_fn_provider_is_called_every_time() {
        let calls = AtomicUsize::new(0);
        let provider = FnTokenProvider::new(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(format!("token-{n}")))
        });

        assert_eq!(provider.fetch().unwrap().token, "token-0");
        assert_eq!(provider.fetch().unwrap().token, "token-1");
    }
}
