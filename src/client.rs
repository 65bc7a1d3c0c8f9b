//! MailCat API client with inbox polling.
//!
//! The [`MailCatClient`] is the main entry point for this crate. It provides
//! async methods to:
//!
//! - Create a disposable mailbox
//! - List, read and delete messages
//! - Wait for a message (optionally filtered by subject) and read its verification code
//!
//! # Example
//!
//! ```no_run
//! use mailcat::{MailCatClient, MailCatConfig, WaitOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> mailcat::Result<()> {
//! let mut client = MailCatClient::new(MailCatConfig::default())?;
//! let mailbox = client.create_mailbox().await?;
//! println!("Sign up with {}", mailbox.email());
//!
//! let options = WaitOptions::new().timeout(Duration::from_secs(120));
//! if let Some(code) = client.wait_for_code(&options).await? {
//!     println!("Got code: {code}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::MailCatConfig;
use crate::error::{Error, Result};
use crate::extract::{Extractor, SubjectFilter};
use crate::transport;
use crate::types::{Email, EmailData, EmailSummary, Mailbox, MailboxData, SummaryData};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Per-call overrides for the wait operations.
///
/// Unset fields fall back to the client's [`PollingConfig`](crate::PollingConfig).
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    subject: Option<SubjectFilter>,
}

impl WaitOptions {
    /// Options that use the client's polling defaults and accept any subject.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops waiting once this much time has elapsed.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sleeps this long between inbox polls.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Only considers messages whose subject contains `needle`, ignoring case.
    #[must_use]
    pub fn subject_contains(mut self, needle: impl AsRef<str>) -> Self {
        self.subject = Some(SubjectFilter::new(needle));
        self
    }
}

/// Async client for the MailCat disposable email API.
///
/// # Lifecycle
///
/// 1. Create a client with [`new`](Self::new)
/// 2. Obtain a mailbox with [`create_mailbox`](Self::create_mailbox)
///    (or resume one with [`with_mailbox`](Self::with_mailbox))
/// 3. Use [`get_inbox`](Self::get_inbox), [`get_email`](Self::get_email) or the
///    `wait_for_*` methods
///
/// Every authenticated call fails with [`Error::NoMailbox`] until step 2 succeeds.
pub struct MailCatClient {
    http: reqwest::Client,
    config: MailCatConfig,
    mailbox: Option<Mailbox>,
}

impl MailCatClient {
    /// Creates a client. No request is made until a method is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientBuild`] if the HTTP client cannot be constructed
    /// (for example an unusable proxy).
    pub fn new(config: MailCatConfig) -> Result<Self> {
        let http = transport::build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            mailbox: None,
        })
    }

    /// Creates a client and a fresh mailbox in one step.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new) and [`create_mailbox`](Self::create_mailbox).
    pub async fn with_new_mailbox(config: MailCatConfig) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.create_mailbox().await?;
        Ok(client)
    }

    /// Uses previously obtained mailbox credentials instead of creating new ones.
    #[must_use]
    pub fn with_mailbox(mut self, mailbox: Mailbox) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Creates a new disposable mailbox and makes it the default for later calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service rejects it, or the
    /// returned address is malformed.
    #[instrument(name = "MailCatClient::create_mailbox", skip(self))]
    pub async fn create_mailbox(&mut self) -> Result<Mailbox> {
        let data: MailboxData = self
            .call(Method::POST, "/mailboxes", None)
            .await?;

        let mailbox = Mailbox::new(data.email, data.token)?;
        debug!(email = %mailbox.email(), "Mailbox created");

        self.mailbox = Some(mailbox.clone());
        Ok(mailbox)
    }

    /// Lists the messages currently in the inbox, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMailbox`] before a mailbox exists, otherwise any
    /// transport or API error.
    #[instrument(name = "MailCatClient::get_inbox", skip(self))]
    pub async fn get_inbox(&self) -> Result<Vec<EmailSummary>> {
        let token = self.require_token()?;
        let data: Option<Vec<SummaryData>> = self.call(Method::GET, "/inbox", Some(token)).await?;
        let summaries: Vec<EmailSummary> = data
            .unwrap_or_default()
            .into_iter()
            .map(EmailSummary::from)
            .collect();

        debug!(count = summaries.len(), "Fetched inbox");
        Ok(summaries)
    }

    /// Fetches a full message with its server-extracted code and links.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMailbox`] before a mailbox exists, [`Error::Api`] when the
    /// reply carries no message object, otherwise any transport or API error.
    #[instrument(name = "MailCatClient::get_email", skip(self))]
    pub async fn get_email(&self, id: &str) -> Result<Email> {
        let token = self.require_token()?;
        let path = format!("/emails/{id}");
        let (status, data): (u16, Option<EmailData>) =
            self.call_with_status(Method::GET, &path, Some(token)).await?;

        let Some(data) = data.filter(|d| d.email.is_some()) else {
            return Err(Error::Api {
                status,
                message: "Failed to read email".into(),
            });
        };
        let email = data.into_email(id);

        debug!(
            has_code = email.code.is_some(),
            links = email.links.len(),
            "Fetched email"
        );
        Ok(email)
    }

    /// Deletes a message. Returns `true` once the service confirms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMailbox`] before a mailbox exists, otherwise any
    /// transport or API error.
    #[instrument(name = "MailCatClient::delete_email", skip(self))]
    pub async fn delete_email(&self, id: &str) -> Result<bool> {
        let token = self.require_token()?;
        let path = format!("/emails/{id}");
        transport::send(&self.http, &self.config, Method::DELETE, &path, Some(token)).await?;
        Ok(true)
    }

    /// Waits for a message to arrive and returns it.
    ///
    /// Polls the inbox until a message whose subject passes the optional filter
    /// appears, then fetches it. Returns `Ok(None)` once the timeout has elapsed.
    /// Transient failures (see [`Error::is_retryable`]) count as empty polls.
    ///
    /// # Errors
    ///
    /// Returns non-retryable errors such as [`Error::NoMailbox`] or
    /// [`Error::Authentication`].
    #[instrument(name = "MailCatClient::wait_for_email", skip(self))]
    pub async fn wait_for_email(&self, options: &WaitOptions) -> Result<Option<Email>> {
        self.poll_until(options, |email| Some(email.clone())).await
    }

    /// Waits for a message and returns its server-extracted verification code.
    ///
    /// Returns `Ok(None)` on timeout, or if the first matching message has no code.
    ///
    /// # Errors
    ///
    /// Same as [`wait_for_email`](Self::wait_for_email).
    #[instrument(name = "MailCatClient::wait_for_code", skip(self))]
    pub async fn wait_for_code(&self, options: &WaitOptions) -> Result<Option<String>> {
        Ok(self.wait_for_email(options).await?.and_then(|email| email.code))
    }

    /// Waits for a message from which `extractor` pulls a value.
    ///
    /// Unlike [`wait_for_email`](Self::wait_for_email), messages the extractor finds
    /// nothing in are skipped, and each is fetched only once.
    ///
    /// # Errors
    ///
    /// Same as [`wait_for_email`](Self::wait_for_email).
    #[instrument(
        name = "MailCatClient::wait_for_match",
        skip(self, extractor),
        fields(extractor = %extractor.description())
    )]
    pub async fn wait_for_match(
        &self,
        extractor: &dyn Extractor,
        options: &WaitOptions,
    ) -> Result<Option<String>> {
        self.poll_until(options, |email| extractor.extract(email).map(Cow::into_owned))
            .await
    }

    /// Returns the current mailbox, if one has been created.
    #[must_use]
    pub fn mailbox(&self) -> Option<&Mailbox> {
        self.mailbox.as_ref()
    }

    /// Returns the current mailbox address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.mailbox.as_ref().map(Mailbox::email)
    }

    /// Returns the current mailbox token.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.mailbox.as_ref().map(Mailbox::token)
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &MailCatConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private methods
    // ─────────────────────────────────────────────────────────────────────────

    fn require_token(&self) -> Result<&str> {
        self.token().ok_or(Error::NoMailbox)
    }

    /// Sends a request and decodes the envelope's `data` member into `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<T> {
        Ok(self.call_with_status(method, path, token).await?.1)
    }

    /// Like [`call`](Self::call), also returning the HTTP status.
    async fn call_with_status<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<(u16, T)> {
        let endpoint = format!("{method} {path}");
        let reply = transport::send(&self.http, &self.config, method, path, token).await?;
        let status = reply.status;
        let data = serde_json::from_value(reply.data).map_err(|source| Error::Decode {
            endpoint,
            status,
            source,
        })?;
        Ok((status, data))
    }

    /// The bounded poll loop shared by the `wait_for_*` methods.
    ///
    /// `accept` sees each fetched message in inbox order; the first `Some` wins.
    /// Messages it rejected are not fetched again.
    async fn poll_until<T>(
        &self,
        options: &WaitOptions,
        mut accept: impl FnMut(&Email) -> Option<T>,
    ) -> Result<Option<T>> {
        let timeout = options.timeout.unwrap_or(self.config.polling.max_wait);
        let interval = options.poll_interval.unwrap_or(self.config.polling.interval);
        let started = Instant::now();
        let mut rejected: HashSet<String> = HashSet::new();
        let mut polls: u32 = 0;

        loop {
            if started.elapsed() >= timeout {
                debug!(polls, timeout_secs = timeout.as_secs(), "Wait timed out");
                return Ok(None);
            }

            polls += 1;
            match self
                .check_inbox(options.subject.as_ref(), &mut rejected, &mut accept)
                .await
            {
                Ok(Some(found)) => {
                    debug!(polls, "Wait satisfied");
                    return Ok(Some(found));
                }
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    warn!(
                        error = %e,
                        category = %e.category(),
                        poll = polls,
                        "Inbox poll failed, retrying after interval"
                    );
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// One poll: list the inbox and offer each candidate message to `accept`.
    async fn check_inbox<T>(
        &self,
        subject: Option<&SubjectFilter>,
        rejected: &mut HashSet<String>,
        accept: &mut impl FnMut(&Email) -> Option<T>,
    ) -> Result<Option<T>> {
        let summaries = self.get_inbox().await?;

        let candidates: Vec<&EmailSummary> = summaries
            .iter()
            .filter(|summary| subject.map_or(true, |filter| filter.matches(&summary.subject)))
            .filter(|summary| !rejected.contains(&summary.id))
            .collect();

        for summary in candidates {
            let email = self.get_email(&summary.id).await?;
            if let Some(found) = accept(&email) {
                return Ok(Some(found));
            }
            rejected.insert(summary.id.clone());
        }

        Ok(None)
    }
}

impl std::fmt::Debug for MailCatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCatClient")
            .field("base_url", &self.config.base_url())
            .field("email", &self.email())
            .finish_non_exhaustive()
    }
}
