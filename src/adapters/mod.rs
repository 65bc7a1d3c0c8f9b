//! String-in/string-out front ends for agent hosts.
//!
//! Agent frameworks hand tools plain strings and expect plain strings back; they do not
//! understand [`Result`](crate::Result). Both adapters here wrap one [`MailCatClient`],
//! forward to it, and turn every outcome, errors included, into text an LLM can act on.
//!
//! - [`commands::MailCatCommands`]: a table of named commands (`mailcat_create`,
//!   `mailcat_inbox`, `mailcat_read`, `mailcat_wait`) with string arguments.
//! - [`tool::MailCatTool`]: a single `mailcat` tool taking an `action` argument and a
//!   JSON schema for function calling.
//!
//! [`MailCatClient`]: crate::MailCatClient

pub mod commands;
pub mod tool;

use crate::types::{Email, EmailSummary};
use std::time::Duration;

/// Seconds an adapter `wait` blocks when the caller gives no timeout.
pub const DEFAULT_WAIT_SECS: u64 = 60;

/// Interval between inbox polls during an adapter `wait`.
pub const ADAPTER_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Returns at most `max_chars` characters of `text`, cut on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

pub(crate) fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Shorthand for the fields both adapters print about a listed message.
pub(crate) fn summary_fields(summary: &EmailSummary) -> (&str, &str, &str) {
    (
        summary.id.as_str(),
        or_placeholder(&summary.sender, "Unknown"),
        or_placeholder(&summary.subject, "No subject"),
    )
}

/// Message body for display: plain text, else the HTML source, truncated.
pub(crate) fn display_body(email: &Email, max_chars: usize) -> &str {
    let body = if email.body_text.is_empty() {
        email.body_html.as_str()
    } else {
        email.body_text.as_str()
    };
    truncate_chars(or_placeholder(body, "No content"), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_display_body_prefers_text() {
        let mut email = Email {
            id: "1".into(),
            sender: String::new(),
            to: String::new(),
            subject: String::new(),
            body_text: "plain".into(),
            body_html: "<p>html</p>".into(),
            received_at: String::new(),
            code: None,
            links: vec![],
        };
        assert_eq!(display_body(&email, 100), "plain");

        email.body_text.clear();
        assert_eq!(display_body(&email, 100), "<p>html</p>");

        email.body_html.clear();
        assert_eq!(display_body(&email, 100), "No content");
    }
}
