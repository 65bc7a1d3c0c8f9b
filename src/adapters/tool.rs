//! Single-tool adapter for function-calling agent frameworks.
//!
//! The framework sees one tool, `mailcat`, described by [`MailCatTool::parameters_schema`].
//! The model picks an `action` (`create`, `inbox`, `read`, `wait`) and the tool answers
//! in plain text.

use super::{display_body, or_placeholder, summary_fields, ADAPTER_POLL_INTERVAL, DEFAULT_WAIT_SECS};
use crate::client::{MailCatClient, WaitOptions};
use crate::config::MailCatConfig;
use crate::error::Result;
use crate::types::Email;
use serde::Deserialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, instrument};

/// Tool name registered with the framework.
pub const TOOL_NAME: &str = "mailcat";

/// Tool description shown to the model.
pub const TOOL_DESCRIPTION: &str = "Email tool for receiving emails and extracting verification codes.

Actions:
- create: Create a new mailbox. Returns the email address.
- inbox: Check inbox for emails. Returns list of email summaries.
- read: Read an email by ID. Returns email content and extracted code.
- wait: Wait for an email to arrive. Returns first email received.

Use this when you need to receive verification emails or sign up for services.";

/// Characters of body text included in `read` output.
const BODY_LIMIT: usize = 500;

const NO_MAILBOX: &str = "Error: No mailbox created. Call 'create' first.";

/// Arguments the model passes to the tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolInput {
    /// One of `create`, `inbox`, `read`, `wait`.
    pub action: String,
    /// Message id, required for `read`.
    #[serde(default)]
    pub email_id: Option<String>,
    /// Seconds to wait for `wait`. Default: 60.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ToolInput {
    /// Input for an action without arguments.
    #[must_use]
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            email_id: None,
            timeout: None,
        }
    }
}

/// The `mailcat` tool.
#[derive(Debug)]
pub struct MailCatTool {
    client: MailCatClient,
    poll_interval: Duration,
}

impl MailCatTool {
    /// Creates the tool with a fresh client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: MailCatConfig) -> Result<Self> {
        Ok(Self::from_client(MailCatClient::new(config)?))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: MailCatClient) -> Self {
        Self {
            client,
            poll_interval: ADAPTER_POLL_INTERVAL,
        }
    }

    /// Overrides the interval between polls for `wait`.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The tool name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    /// The tool description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// JSON schema of [`ToolInput`] for function calling.
    #[must_use]
    pub fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["create", "inbox", "read", "wait"],
                    "description": "Action to perform: 'create', 'inbox', 'read', or 'wait'"
                },
                "email_id": {
                    "type": "string",
                    "description": "Email ID for 'read' action"
                },
                "timeout": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_WAIT_SECS,
                    "description": "Timeout in seconds for 'wait' action"
                }
            },
            "required": ["action"]
        })
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &MailCatClient {
        &self.client
    }

    /// Runs the tool with raw JSON arguments from the framework.
    pub async fn run_json(&mut self, params: serde_json::Value) -> String {
        match serde_json::from_value::<ToolInput>(params) {
            Ok(input) => self.run(input).await,
            Err(e) => format!("Error: invalid input: {e}"),
        }
    }

    /// Runs the tool. Never fails: problems come back as `Error:` text.
    #[instrument(name = "MailCatTool::run", skip(self), fields(action = %input.action))]
    pub async fn run(&mut self, input: ToolInput) -> String {
        debug!("Running tool action");

        match input.action.trim() {
            "create" => self.create_mailbox().await,
            "inbox" => self.check_inbox().await,
            "read" => match input.email_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => self.read_email(id).await,
                _ => "Error: email_id required for 'read' action".to_string(),
            },
            "wait" => {
                self.wait_for_email(input.timeout.unwrap_or(DEFAULT_WAIT_SECS))
                    .await
            }
            other => format!("Unknown action: {other}. Use: create, inbox, read, or wait"),
        }
    }

    async fn create_mailbox(&mut self) -> String {
        match self.client.create_mailbox().await {
            Ok(mailbox) => format!(
                "Mailbox created!\nEmail: {}\nUse this email for signups. \
                 Call 'inbox' or 'wait' to check for emails.",
                mailbox.email()
            ),
            Err(e) => format!("Error creating mailbox: {e}"),
        }
    }

    async fn check_inbox(&self) -> String {
        let Some(address) = self.client.email() else {
            return NO_MAILBOX.to_string();
        };

        match self.client.get_inbox().await {
            Ok(summaries) if summaries.is_empty() => format!("Inbox empty. Email: {address}"),
            Ok(summaries) => {
                let mut out = format!("Found {} email(s):\n", summaries.len());
                for summary in &summaries {
                    let (id, sender, subject) = summary_fields(summary);
                    let _ = write!(out, "- ID: {id}\n  From: {sender}\n  Subject: {subject}\n");
                }
                out
            }
            Err(e) => format!("Error checking inbox: {e}"),
        }
    }

    async fn read_email(&self, email_id: &str) -> String {
        if self.client.mailbox().is_none() {
            return NO_MAILBOX.to_string();
        }

        match self.client.get_email(email_id).await {
            Ok(email) => render_email(&email),
            Err(e) => format!("Error reading email: {e}"),
        }
    }

    async fn wait_for_email(&self, timeout_secs: u64) -> String {
        let Some(address) = self.client.email() else {
            return NO_MAILBOX.to_string();
        };

        let options = WaitOptions::new()
            .timeout(Duration::from_secs(timeout_secs))
            .poll_interval(self.poll_interval);

        match self.client.wait_for_email(&options).await {
            Ok(Some(email)) => render_email(&email),
            Ok(None) => format!("No email received within {timeout_secs} seconds. Email: {address}"),
            Err(e) => format!("Error waiting for email: {e}"),
        }
    }
}

fn render_email(email: &Email) -> String {
    let mut out = String::from("Email content:\n");
    let _ = writeln!(out, "From: {}", or_placeholder(&email.sender, "Unknown"));
    let _ = writeln!(out, "Subject: {}", or_placeholder(&email.subject, "No subject"));
    let _ = writeln!(out, "Body: {}", display_body(email, BODY_LIMIT));

    if let Some(code) = &email.code {
        let _ = writeln!(out, "\nVERIFICATION CODE: {code}");
    }

    if !email.links.is_empty() {
        out.push_str("\nLinks found:\n");
        for link in &email.links {
            let _ = writeln!(out, "  - {link}");
        }
    }

    out
}
