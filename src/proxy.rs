//! SOCKS5 proxy configuration for API requests.
//!
//! The proxy is translated into a [`reqwest::Proxy`] when the client is built, so every
//! request to the MailCat API (mailbox creation included) is routed through it.
//! Hostnames are resolved on the proxy side (`socks5h`).
//!
//! # Example
//!
//! ```
//! use mailcat::Socks5Proxy;
//!
//! // Without authentication
//! let proxy = Socks5Proxy::new("proxy.example.com", 1080);
//!
//! // With authentication
//! let proxy = Socks5Proxy::with_auth("proxy.example.com", 1080, "username", "password");
//! ```

use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// SOCKS5 proxy configuration.
#[derive(Debug, Clone)]
pub struct Socks5Proxy {
    /// Proxy server hostname or IP address.
    pub host: String,
    /// Proxy server port.
    pub port: u16,
    /// Optional authentication credentials.
    pub auth: Option<ProxyAuth>,
}

/// Authentication credentials for SOCKS5 proxy.
#[derive(Debug, Clone)]
pub struct ProxyAuth {
    /// Username for proxy authentication.
    pub username: String,
    /// Password for proxy authentication (redacted in `Debug`).
    pub password: SecretString,
}

impl Socks5Proxy {
    /// Creates a new SOCKS5 proxy configuration without authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: None,
        }
    }

    /// Creates a new SOCKS5 proxy configuration with authentication.
    #[must_use]
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            auth: Some(ProxyAuth {
                username: username.into(),
                password: SecretString::from(password.into()),
            }),
        }
    }

    /// Returns `true` if this proxy requires authentication.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// Returns the proxy URL including credentials, percent-encoded.
    ///
    /// Never log the result; use the `Display` impl instead.
    fn url_with_credentials(&self) -> Result<Url> {
        let raw = format!("socks5h://{}:{}", self.host, self.port);
        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidBaseUrl {
            url: self.to_string(),
            source,
        })?;

        if let Some(auth) = &self.auth {
            let rejected = || Error::InvalidConfig {
                message: format!("proxy {self} cannot carry credentials"),
            };
            url.set_username(&auth.username).map_err(|()| rejected())?;
            url.set_password(Some(auth.password.expose_secret()))
                .map_err(|()| rejected())?;
        }

        Ok(url)
    }

    /// Converts this configuration into a proxy applied to all reqwest traffic.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let url = self.url_with_credentials()?;
        reqwest::Proxy::all(url.as_str()).map_err(|source| Error::ClientBuild { source })
    }
}

impl std::fmt::Display for Socks5Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.auth {
            Some(auth) => write!(
                f,
                "socks5h://{}:***@{}:{}",
                auth.username, self.host, self.port
            ),
            None => write!(f, "socks5h://{}:{}", self.host, self.port),
        }
    }
}
