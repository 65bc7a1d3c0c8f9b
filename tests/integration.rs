//! Integration tests for mailcat against the live service.
//!
//! These tests create real mailboxes and are disabled by default.
//! To run them:
//!
//! ```bash
//! # Optional: point at a staging deployment
//! export MAILCAT_API_URL="https://api.mailcat.ai"
//!
//! # Optional: proxy configuration
//! export MAILCAT_TEST_PROXY_HOST="proxy.example.com"
//! export MAILCAT_TEST_PROXY_PORT="1080"
//!
//! # Run with the integration-tests feature
//! cargo test --features integration-tests -- --ignored
//! ```

use mailcat::adapters::tool::{MailCatTool, ToolInput};
use mailcat::extract::OtpExtractor;
use mailcat::{Error, Mailbox, MailCatClient, MailCatConfig, Socks5Proxy, WaitOptions};
use std::env;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Test Configuration Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn get_test_proxy() -> Option<Socks5Proxy> {
    let host = env::var("MAILCAT_TEST_PROXY_HOST").ok()?;
    let port: u16 = env::var("MAILCAT_TEST_PROXY_PORT").ok()?.parse().ok()?;

    let proxy = match (
        env::var("MAILCAT_TEST_PROXY_USER").ok(),
        env::var("MAILCAT_TEST_PROXY_PASS").ok(),
    ) {
        (Some(user), Some(pass)) => Socks5Proxy::with_auth(&host, port, user, pass),
        _ => Socks5Proxy::new(host, port),
    };

    Some(proxy)
}

fn get_test_config() -> MailCatConfig {
    dotenvy::dotenv().ok();

    let mut builder = MailCatConfig::from_env()
        .poll_interval(Duration::from_secs(2))
        .max_wait(Duration::from_secs(6));

    if let Some(proxy) = get_test_proxy() {
        builder = builder.proxy(proxy);
    }

    builder.build().expect("Test config from environment variables")
}

// ─────────────────────────────────────────────────────────────────────────────
// Mailbox Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_create_mailbox_and_empty_inbox() {
    let mut client = MailCatClient::new(get_test_config()).expect("client");

    let mailbox = client.create_mailbox().await.expect("Failed to create mailbox");
    assert!(mailbox.email().contains('@'));
    assert!(!mailbox.token().is_empty());

    let inbox = client.get_inbox().await.expect("Failed to list inbox");
    assert!(inbox.is_empty());
}

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_resume_mailbox_from_credentials() {
    let mut first = MailCatClient::new(get_test_config()).expect("client");
    let mailbox = first.create_mailbox().await.expect("Failed to create mailbox");

    let second = MailCatClient::new(get_test_config())
        .expect("client")
        .with_mailbox(mailbox.clone());

    assert_eq!(second.email(), Some(mailbox.email()));
    second.get_inbox().await.expect("Resumed mailbox should list inbox");
}

// ─────────────────────────────────────────────────────────────────────────────
// Wait Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_wait_for_code_times_out_on_fresh_mailbox() {
    let mut client = MailCatClient::new(get_test_config()).expect("client");
    client.create_mailbox().await.expect("Failed to create mailbox");

    let code = client
        .wait_for_code(&WaitOptions::new())
        .await
        .expect("Timeout is not an error");

    assert_eq!(code, None);
}

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_wait_for_match_times_out_on_fresh_mailbox() {
    let mut client = MailCatClient::new(get_test_config()).expect("client");
    client.create_mailbox().await.expect("Failed to create mailbox");

    let result = client
        .wait_for_match(&OtpExtractor::six_digit(), &WaitOptions::new())
        .await
        .expect("Timeout is not an error");

    assert_eq!(result, None);
}

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_tool_create_then_inbox() {
    let mut tool = MailCatTool::new(get_test_config()).expect("tool");

    let created = tool.run(ToolInput::action("create")).await;
    assert!(created.starts_with("Mailbox created!"), "{created}");

    let inbox = tool.run(ToolInput::action("inbox")).await;
    assert!(inbox.starts_with("Inbox empty."), "{inbox}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Handling Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "requires live MailCat API"]
async fn test_invalid_token() {
    let client = MailCatClient::new(get_test_config())
        .expect("client")
        .with_mailbox(Mailbox::new("nobody@mailcat.ai", "not-a-real-token").unwrap());

    let err = client.get_inbox().await.unwrap_err();

    println!("Inbox error: {err}");
    println!("Category: {}", err.category());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalid_base_url() {
    let result = MailCatConfig::builder().base_url("not a url").build();
    assert!(matches!(result, Err(Error::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn test_unreachable_service_is_retryable() {
    // Nothing listens on the discard port
    let config = MailCatConfig::builder()
        .base_url("http://127.0.0.1:9")
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let client = MailCatClient::new(config)
        .unwrap()
        .with_mailbox(Mailbox::new("a@x.com", "t1").unwrap());

    let err = client.get_inbox().await.unwrap_err();
    assert!(err.is_retryable());
}
