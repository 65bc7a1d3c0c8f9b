//! Example: Using tracing for observability.
//!
//! This example demonstrates how to enable structured logging using
//! the `tracing` ecosystem. Every API call and every poll of a wait
//! emits tracing spans and events.
//!
//! # Usage
//!
//! ```bash
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=mailcat=debug
//!
//! cargo run --example with_tracing
//! ```

use mailcat::extract::OtpExtractor;
use mailcat::{MailCatClient, MailCatConfig, WaitOptions};
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> mailcat::Result<()> {
    // Use RUST_LOG to control log levels
    // Example: RUST_LOG=mailcat=debug,info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailcat=info")),
        )
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = MailCatConfig::from_env()
        .poll_interval(Duration::from_secs(5))
        .max_wait(Duration::from_secs(30))
        .build()?;

    tracing::debug!("Configuration built successfully");

    let mut client = MailCatClient::new(config)?;

    // Emits MailCatClient::create_mailbox and transport::send spans
    let mailbox = client.create_mailbox().await?;
    tracing::info!(email = %mailbox.email(), "Mailbox created, waiting for a code");

    // Each poll logs at debug level; failed polls log a warning and continue
    match client
        .wait_for_match(&OtpExtractor::six_digit(), &WaitOptions::new())
        .await?
    {
        Some(code) => {
            tracing::info!(otp = %code, "Found OTP code");
            println!("\nFound OTP: {}", code);
        }
        None => {
            tracing::warn!("No OTP code arrived");
            println!("\nNo OTP found");
        }
    }

    tracing::info!("Example completed successfully");

    Ok(())
}
