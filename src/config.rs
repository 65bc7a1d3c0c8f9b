//! Configuration for the MailCat client.
//!
//! Use [`MailCatConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use mailcat::MailCatConfig;
//! use std::time::Duration;
//!
//! let config = MailCatConfig::builder()
//!     .request_timeout(Duration::from_secs(10))
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.base_url(), "https://api.mailcat.ai");
//! ```

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use std::time::Duration;
use url::Url;

/// Public MailCat endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mailcat.ai";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "MAILCAT_API_URL";

/// Environment variable overriding the per-request timeout, in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "MAILCAT_TIMEOUT_SECS";

/// Configuration for talking to the MailCat API.
///
/// Create using [`MailCatConfig::builder()`].
#[derive(Debug, Clone)]
pub struct MailCatConfig {
    /// Validated base URL, without a trailing slash.
    base_url: String,
    /// Timeout applied to every individual HTTP request.
    pub request_timeout: Duration,
    /// Optional SOCKS5 proxy for all requests.
    pub proxy: Option<Socks5Proxy>,
    /// `User-Agent` header sent with each request.
    pub user_agent: String,
    /// Polling configuration for wait operations.
    pub polling: PollingConfig,
}

impl MailCatConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> MailCatConfigBuilder {
        MailCatConfigBuilder::default()
    }

    /// Creates a builder pre-filled from the environment.
    ///
    /// See [`MailCatConfigBuilder::from_env`].
    #[must_use]
    pub fn from_env() -> MailCatConfigBuilder {
        MailCatConfigBuilder::from_env()
    }

    /// Returns the API base URL (never ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins an API path such as `/inbox` onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for MailCatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            proxy: None,
            user_agent: default_user_agent(),
            polling: PollingConfig::default(),
        }
    }
}

fn default_user_agent() -> String {
    format!("mailcat-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Polling configuration for wait operations.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval between inbox polls when waiting for email.
    pub interval: Duration,
    /// Maximum time to wait for a matching email.
    pub max_wait: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Validates the base URL and strips trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|source| Error::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidConfig {
            message: format!("base URL must be http or https, got '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

/// Builder for [`MailCatConfig`].
#[derive(Debug, Default)]
pub struct MailCatConfigBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    proxy: Option<Socks5Proxy>,
    user_agent: Option<String>,
    polling: Option<PollingConfig>,
    env_timeout_error: Option<String>,
}

impl MailCatConfigBuilder {
    /// Starts a builder pre-filled from `MAILCAT_API_URL` and `MAILCAT_TIMEOUT_SECS`.
    ///
    /// Unset variables are ignored. A timeout that is not a whole number of seconds
    /// is reported by [`build()`](Self::build).
    #[must_use]
    pub fn from_env() -> Self {
        let mut builder = Self::default();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            builder.base_url = Some(url);
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => builder.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => {
                    builder.env_timeout_error =
                        Some(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got '{raw}'"));
                }
            }
        }

        builder
    }

    /// Sets the API base URL. Default: `https://api.mailcat.ai`.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout. Default: 30 seconds.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Routes all requests through a SOCKS5 proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets polling configuration.
    #[must_use]
    pub fn polling(mut self, polling: PollingConfig) -> Self {
        self.polling = Some(polling);
        self
    }

    /// Sets the polling interval for wait operations. Default: 10 seconds.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .interval = interval;
        self
    }

    /// Sets the maximum wait time for wait operations. Default: 5 minutes.
    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.polling
            .get_or_insert_with(PollingConfig::default)
            .max_wait = max_wait;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed, the request timeout is zero,
    /// or `MAILCAT_TIMEOUT_SECS` was not a number.
    pub fn build(self) -> Result<MailCatConfig> {
        if let Some(message) = self.env_timeout_error {
            return Err(Error::InvalidConfig { message });
        }

        let base_url = normalize_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let request_timeout = self.request_timeout.unwrap_or(Duration::from_secs(30));
        if request_timeout.is_zero() {
            return Err(Error::InvalidConfig {
                message: "request timeout must be greater than zero".into(),
            });
        }

        Ok(MailCatConfig {
            base_url,
            request_timeout,
            proxy: self.proxy,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            polling: self.polling.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch process environment hold this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for (key, value) in vars {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        let result = f();
        for (key, _) in vars {
            std::env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_from_env_overrides() {
        let config = with_env(
            &[
                (ENV_BASE_URL, Some("http://localhost:9000/")),
                (ENV_TIMEOUT_SECS, Some(" 12 ")),
            ],
            || MailCatConfig::from_env().build(),
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://localhost:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_from_env_unset_uses_defaults() {
        let config = with_env(&[(ENV_BASE_URL, None), (ENV_TIMEOUT_SECS, None)], || {
            MailCatConfigBuilder::from_env().build()
        })
        .unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_env_bad_timeout_fails_build() {
        let result = with_env(
            &[(ENV_BASE_URL, None), (ENV_TIMEOUT_SECS, Some("soon"))],
            || MailCatConfig::from_env().build(),
        );

        match result {
            Err(Error::InvalidConfig { message }) => {
                assert!(message.contains(ENV_TIMEOUT_SECS));
                assert!(message.contains("soon"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_from_env_then_explicit_setter_wins() {
        let config = with_env(
            &[(ENV_BASE_URL, Some("http://env.local")), (ENV_TIMEOUT_SECS, None)],
            || {
                MailCatConfig::from_env()
                    .base_url("http://explicit.local")
                    .build()
            },
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://explicit.local");
    }

    #[test]
    fn test_builder_defaults() {
        let config = MailCatConfig::builder().build().unwrap();

        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.polling.interval, Duration::from_secs(10));
        assert_eq!(config.polling.max_wait, Duration::from_secs(300));
        assert!(config.proxy.is_none());
        assert!(config.user_agent.starts_with("mailcat-rs/"));
    }

    #[test]
    fn test_builder_full() {
        let config = MailCatConfig::builder()
            .base_url("http://localhost:8080")
            .request_timeout(Duration::from_secs(5))
            .proxy(Socks5Proxy::new("proxy.local", 1080))
            .user_agent("agent/1.0")
            .poll_interval(Duration::from_secs(2))
            .max_wait(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.proxy.is_some());
        assert_eq!(config.user_agent, "agent/1.0");
        assert_eq!(config.polling.interval, Duration::from_secs(2));
        assert_eq!(config.polling.max_wait, Duration::from_secs(60));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = MailCatConfig::builder()
            .base_url("https://api.mailcat.ai/")
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "https://api.mailcat.ai");
        assert_eq!(config.endpoint("/inbox"), "https://api.mailcat.ai/inbox");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = MailCatConfig::builder().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidBaseUrl { .. })));

        let result = MailCatConfig::builder().base_url("ftp://files.example.com").build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = MailCatConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
