//! Internal HTTP plumbing.
//!
//! This module wraps reqwest calls with envelope decoding and status-code mapping.

use crate::config::MailCatConfig;
use crate::error::{Error, Result};
use crate::types::Envelope;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument};

/// Builds the pooled HTTP client shared by all calls of one `MailCatClient`.
pub(crate) fn build_http_client(config: &MailCatConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str());

    if let Some(proxy) = &config.proxy {
        debug!(proxy = %proxy, "Routing API traffic through proxy");
        builder = builder.proxy(proxy.to_reqwest()?);
    }

    builder.build().map_err(|source| Error::ClientBuild { source })
}

/// A successful envelope.
#[derive(Debug)]
pub(crate) struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// The envelope's `data` member (`null` when absent).
    pub data: Value,
}

/// Sends one request and returns the envelope's `data` member.
///
/// Status handling, in order:
/// - 429 becomes [`Error::RateLimited`], 401 becomes [`Error::Authentication`],
///   whether or not the body is JSON
/// - a body that is not an envelope becomes [`Error::Decode`]
/// - an unsuccessful envelope becomes [`Error::Api`]
#[instrument(
    name = "transport::send",
    skip(http, config, token),
    fields(authenticated = token.is_some())
)]
pub(crate) async fn send(
    http: &reqwest::Client,
    config: &MailCatConfig,
    method: Method,
    path: &str,
    token: Option<&str>,
) -> Result<Reply> {
    let endpoint = format!("{method} {path}");
    let timeout = config.request_timeout;
    let started = Instant::now();

    let mut request = http.request(method, config.endpoint(path));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|source| Error::from_transport(&endpoint, timeout, source))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|source| Error::from_transport(&endpoint, timeout, source))?;

    debug!(
        status = status.as_u16(),
        body_len = body.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Received response"
    );

    let parsed: std::result::Result<Envelope, serde_json::Error> = serde_json::from_slice(&body);

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            return Err(Error::RateLimited {
                message: message_or(parsed.as_ref().ok(), "Rate limit exceeded"),
            });
        }
        StatusCode::UNAUTHORIZED => {
            return Err(Error::Authentication {
                message: message_or(parsed.as_ref().ok(), "Authentication failed"),
            });
        }
        _ => {}
    }

    let envelope = parsed.map_err(|source| Error::Decode {
        endpoint,
        status: status.as_u16(),
        source,
    })?;

    if !envelope.succeeded(status.is_success()) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope.message_or("Unknown error"),
        });
    }

    Ok(Reply {
        status: status.as_u16(),
        data: envelope.data,
    })
}

fn message_or(envelope: Option<&Envelope>, fallback: &str) -> String {
    envelope.map_or_else(|| fallback.to_string(), |e| e.message_or(fallback))
}
