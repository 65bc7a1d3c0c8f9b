//! Basic example: Create a mailbox and wait for a verification code.
//!
//! This example demonstrates the most common use case - getting a fresh
//! address, using it to sign up somewhere, and waiting for the code the
//! service extracts from the confirmation email.
//!
//! # Usage
//!
//! ```bash
//! # Optional: override the API endpoint
//! export MAILCAT_API_URL="https://api.mailcat.ai"
//! cargo run --example basic_code
//! ```

use mailcat::{MailCatClient, MailCatConfig, WaitOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> mailcat::Result<()> {
    // Picks up MAILCAT_API_URL and MAILCAT_TIMEOUT_SECS when set
    let config = MailCatConfig::from_env().build()?;
    let mut client = MailCatClient::new(config)?;

    let mailbox = client.create_mailbox().await?;
    println!("Mailbox ready: {}", mailbox.email());
    println!("(Sign up somewhere with this address, or press Ctrl+C to cancel)");

    let options = WaitOptions::new()
        .timeout(Duration::from_secs(120))
        .subject_contains("verif");

    match client.wait_for_code(&options).await? {
        Some(code) => println!("Got verification code: {}", code),
        None => println!("No code arrived within two minutes"),
    }

    Ok(())
}
