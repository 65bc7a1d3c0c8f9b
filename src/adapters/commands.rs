//! Command-table adapter for plugin-style agent hosts.
//!
//! The host reads [`COMMANDS`] to learn what it may call, then invokes
//! [`MailCatCommands::execute`] with a command name and string arguments. Results
//! are prefixed (`SUCCESS:`, `FOUND`, `TIMEOUT:`, `ERROR:`) so an agent can branch on
//! them without parsing.
//!
//! ```no_run
//! use mailcat::adapters::commands::MailCatCommands;
//! use mailcat::MailCatConfig;
//! use std::collections::HashMap;
//!
//! # async fn example() -> mailcat::Result<()> {
//! let mut plugin = MailCatCommands::new(MailCatConfig::default())?;
//! println!("{}", plugin.execute("mailcat_create", &HashMap::new()).await);
//!
//! let args = HashMap::from([("timeout".to_string(), "120".to_string())]);
//! println!("{}", plugin.execute("mailcat_wait", &args).await);
//! # Ok(())
//! # }
//! ```

use super::{display_body, summary_fields, ADAPTER_POLL_INTERVAL, DEFAULT_WAIT_SECS};
use crate::client::{MailCatClient, WaitOptions};
use crate::config::MailCatConfig;
use crate::error::Result;
use crate::types::Email;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{debug, instrument};

/// Characters of body text included in `mailcat_read` output.
const BODY_LIMIT: usize = 1000;

const NO_MAILBOX: &str = "ERROR: No mailbox created. Use mailcat_create first.";

/// Declaration of one command: its name, what it does, and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Name the host invokes.
    pub name: &'static str,
    /// Description shown to the agent.
    pub description: &'static str,
    /// `(argument, hint)` pairs. Hints follow the `<type: meaning>` convention.
    pub args: &'static [(&'static str, &'static str)],
}

/// Every command this adapter understands.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "mailcat_create",
        description: "Create a new email mailbox for receiving emails",
        args: &[],
    },
    CommandSpec {
        name: "mailcat_inbox",
        description: "Check inbox for new emails",
        args: &[],
    },
    CommandSpec {
        name: "mailcat_read",
        description: "Read an email and extract verification code",
        args: &[("email_id", "<string: ID of the email to read>")],
    },
    CommandSpec {
        name: "mailcat_wait",
        description: "Wait for an email to arrive",
        args: &[("timeout", "<int: seconds to wait, default 60>")],
    },
];

/// Plugin exposing the mailbox operations as named commands.
#[derive(Debug)]
pub struct MailCatCommands {
    client: MailCatClient,
    poll_interval: Duration,
}

impl MailCatCommands {
    /// Creates the plugin with a fresh client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: MailCatConfig) -> Result<Self> {
        Ok(Self::from_client(MailCatClient::new(config)?))
    }

    /// Wraps an existing client (possibly one that already has a mailbox).
    #[must_use]
    pub fn from_client(client: MailCatClient) -> Self {
        Self {
            client,
            poll_interval: ADAPTER_POLL_INTERVAL,
        }
    }

    /// Overrides the interval between polls in `mailcat_wait`.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The command table to register with the host.
    #[must_use]
    pub fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &MailCatClient {
        &self.client
    }

    /// Runs a command by name. Never fails: problems come back as `ERROR:` text.
    #[instrument(name = "MailCatCommands::execute", skip(self, args))]
    pub async fn execute(&mut self, name: &str, args: &HashMap<String, String>) -> String {
        debug!(arg_count = args.len(), "Dispatching command");

        match name {
            "mailcat_create" => self.create_mailbox().await,
            "mailcat_inbox" => self.check_inbox().await,
            "mailcat_read" => match args.get("email_id").map(|id| id.trim()) {
                Some(id) if !id.is_empty() => self.read_email(id).await,
                _ => "ERROR: email_id is required for mailcat_read.".to_string(),
            },
            "mailcat_wait" => match parse_timeout(args.get("timeout")) {
                Ok(secs) => self.wait_for_email(secs).await,
                Err(message) => message,
            },
            other => {
                let known: Vec<&str> = COMMANDS.iter().map(|c| c.name).collect();
                format!("ERROR: Unknown command '{other}'. Available: {}", known.join(", "))
            }
        }
    }

    /// `mailcat_create`: creates a mailbox and reports its address.
    pub async fn create_mailbox(&mut self) -> String {
        match self.client.create_mailbox().await {
            Ok(mailbox) => format!(
                "SUCCESS: Mailbox created!\nEmail: {}\nUse this email address for signups. \
                 The mailbox expires in 1 hour.",
                mailbox.email()
            ),
            Err(e) => format!("ERROR: {e}"),
        }
    }

    /// `mailcat_inbox`: lists the inbox.
    pub async fn check_inbox(&self) -> String {
        let Some(address) = self.client.email() else {
            return NO_MAILBOX.to_string();
        };

        match self.client.get_inbox().await {
            Ok(summaries) if summaries.is_empty() => {
                format!("INBOX EMPTY: No emails yet. Mailbox: {address}")
            }
            Ok(summaries) => {
                let mut out = format!("FOUND {} EMAIL(S):\n", summaries.len());
                for (i, summary) in summaries.iter().enumerate() {
                    let (id, sender, subject) = summary_fields(summary);
                    let _ = write!(
                        out,
                        "\n{}. ID: {id}\n   From: {sender}\n   Subject: {subject}\n",
                        i + 1
                    );
                }
                out.push_str("\nUse mailcat_read with the ID to read an email.");
                out
            }
            Err(e) => format!("ERROR: {e}"),
        }
    }

    /// `mailcat_read`: shows one message with its code and links.
    pub async fn read_email(&self, email_id: &str) -> String {
        if self.client.mailbox().is_none() {
            return NO_MAILBOX.to_string();
        }

        match self.client.get_email(email_id).await {
            Ok(email) => render_email(&email),
            Err(e) => format!("ERROR: {e}"),
        }
    }

    /// `mailcat_wait`: blocks until a message arrives or `timeout_secs` pass.
    pub async fn wait_for_email(&self, timeout_secs: u64) -> String {
        let Some(address) = self.client.email() else {
            return NO_MAILBOX.to_string();
        };

        let options = WaitOptions::new()
            .timeout(Duration::from_secs(timeout_secs))
            .poll_interval(self.poll_interval);

        match self.client.wait_for_email(&options).await {
            Ok(Some(email)) => render_email(&email),
            Ok(None) => format!(
                "TIMEOUT: No email received within {timeout_secs} seconds. Mailbox: {address}"
            ),
            Err(e) => format!("ERROR: {e}"),
        }
    }
}

fn parse_timeout(raw: Option<&String>) -> std::result::Result<u64, String> {
    match raw.map(|s| s.trim()) {
        None | Some("") => Ok(DEFAULT_WAIT_SECS),
        Some(value) => value.parse::<u64>().map_err(|_| {
            format!("ERROR: timeout must be a whole number of seconds, got '{value}'.")
        }),
    }
}

fn render_email(email: &Email) -> String {
    let mut out = String::from("EMAIL CONTENT:\n");
    let _ = writeln!(out, "From: {}", super::or_placeholder(&email.sender, "Unknown"));
    let _ = writeln!(
        out,
        "Subject: {}",
        super::or_placeholder(&email.subject, "No subject")
    );
    let _ = writeln!(out, "Body:\n{}", display_body(email, BODY_LIMIT));

    if let Some(code) = &email.code {
        let _ = writeln!(out, "\n*** VERIFICATION CODE FOUND: {code} ***");
    }

    if !email.links.is_empty() {
        out.push_str("\nACTION LINKS:\n");
        for link in &email.links {
            let _ = writeln!(out, "  - {link}");
        }
    }

    out
}
