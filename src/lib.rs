//! # mailcat
//!
//! Async client for the MailCat disposable email API, plus adapters that expose it to
//! agent frameworks.
//!
//! This crate provides a high-level, async API for:
//! - Creating a disposable mailbox
//! - Listing, reading and deleting the messages it receives
//! - Waiting for a message and reading the verification code the service extracted
//! - Exposing all of that as string commands to agent hosts ([`adapters`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailcat::{MailCatClient, MailCatConfig, WaitOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> mailcat::Result<()> {
//! let mut client = MailCatClient::new(MailCatConfig::default())?;
//!
//! // Get a fresh address
//! let mailbox = client.create_mailbox().await?;
//! println!("Sign up with {}", mailbox.email());
//!
//! // Wait up to two minutes for the verification mail
//! let options = WaitOptions::new()
//!     .timeout(Duration::from_secs(120))
//!     .subject_contains("verify");
//!
//! match client.wait_for_code(&options).await? {
//!     Some(code) => println!("Got code: {code}"),
//!     None => println!("No code arrived"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Local Extraction
//!
//! The service extracts codes and links itself. When its guess is not what you need,
//! run your own [`extract::Extractor`] over incoming mail:
//!
//! ```no_run
//! use mailcat::extract::{LinkExtractor, RegexExtractor};
//! use mailcat::{MailCatClient, MailCatConfig, WaitOptions};
//!
//! # async fn example() -> mailcat::Result<()> {
//! # let mut client = MailCatClient::new(MailCatConfig::default())?;
//! # client.create_mailbox().await?;
//! let activation = LinkExtractor::new("example.com");
//! let link = client.wait_for_match(&activation, &WaitOptions::new()).await?;
//!
//! let invite = RegexExtractor::new(r"invite code: ([A-Z0-9]{8})").unwrap();
//! let code = client.wait_for_match(&invite, &WaitOptions::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use [`Error::is_retryable`]
//! to determine if an operation can be retried:
//!
//! ```
//! use mailcat::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! The `wait_for_*` methods apply this rule themselves: retryable failures count as an
//! empty poll, anything else ends the wait.
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All major operations emit spans with
//! structured fields.
//!
//! ### Span Naming Convention
//!
//! - `MailCatClient::create_mailbox` - Mailbox creation
//! - `MailCatClient::get_inbox` / `get_email` / `delete_email` - Single API calls
//! - `MailCatClient::wait_for_email` / `wait_for_code` / `wait_for_match` - Polling
//! - `transport::send` - One HTTP round trip
//! - `MailCatCommands::execute`, `MailCatTool::run` - Adapter entry points
//!
//! ### Standard Fields
//!
//! - `email` - Mailbox address
//! - `id` - Message id
//! - `status` - HTTP status code
//! - `poll` / `polls` - Poll counter inside a wait
//! - `extractor` - Extractor description
//!
//! Tokens never appear in spans or `Debug` output.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod proxy;
pub mod types;

// Internal modules
mod client;
mod transport;

// Re-exports for ergonomic API
pub use client::{MailCatClient, WaitOptions};
pub use config::{MailCatConfig, MailCatConfigBuilder, PollingConfig};
pub use error::{Error, ErrorCategory, Result};
pub use proxy::{ProxyAuth, Socks5Proxy};
pub use types::{Email, EmailSummary, Mailbox};
