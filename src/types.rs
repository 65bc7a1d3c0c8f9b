//! Data model for the MailCat API and the JSON shapes it travels in.
//!
//! Every endpoint answers with a `{success, data, error}` envelope. The `data` member is decoded into one of
//! the private wire structs below and then converted to the public types, applying the
//! service's defaults (missing strings become empty, missing links become an empty list).

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Credentials for a disposable inbox.
///
/// The token is kept in a [`SecretString`] and never printed by `Debug`.
#[derive(Clone)]
pub struct Mailbox {
    email: String,
    token: SecretString,
}

impl Mailbox {
    /// Builds a mailbox from credentials obtained earlier, validating the address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEmailFormat`] if `email` is not a valid address.
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if !email_address::EmailAddress::is_valid(&email) {
            return Err(Error::InvalidEmailFormat { email });
        }
        Ok(Self {
            email,
            token: SecretString::from(token.into()),
        })
    }

    /// The disposable email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The bearer token authorizing inbox access.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Lightweight inbox listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSummary {
    /// Message identifier, used with `get_email` / `delete_email`.
    pub id: String,
    /// `From` address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Arrival time as sent by the server.
    pub received_at: String,
}

impl EmailSummary {
    /// Parses [`received_at`](Self::received_at) as RFC 3339.
    #[must_use]
    pub fn received_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.received_at)
    }
}

/// Full message, including the verification code and links the server extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    /// Message identifier.
    pub id: String,
    /// `From` address.
    pub sender: String,
    /// `To` address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body_text: String,
    /// HTML body.
    pub body_html: String,
    /// Arrival time as sent by the server.
    pub received_at: String,
    /// Verification code found by the server, if any.
    pub code: Option<String>,
    /// Hyperlinks found by the server.
    pub links: Vec<String>,
}

impl Email {
    /// Parses [`received_at`](Self::received_at) as RFC 3339.
    #[must_use]
    pub fn received_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.received_at)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

/// The `{success, data, error}` wrapper around every response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
    /// Some deployments report failures FastAPI-style.
    #[serde(default)]
    pub detail: Option<Value>,
}

impl Envelope {
    /// An explicit `success` flag wins; without one the HTTP status decides.
    pub fn succeeded(&self, status_ok: bool) -> bool {
        self.success.unwrap_or(status_ok)
    }

    /// The server's failure message, falling back to `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        if let Some(error) = self.error.as_deref().filter(|e| !e.is_empty()) {
            return error.to_string();
        }
        match &self.detail {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Accepts `null` wherever a string is expected.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts numeric ids as well as string ids.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MailboxData {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryData {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, rename = "from", deserialize_with = "null_as_empty")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub received_at: String,
}

impl From<SummaryData> for EmailSummary {
    fn from(wire: SummaryData) -> Self {
        Self {
            id: wire.id,
            sender: wire.sender,
            subject: wire.subject,
            received_at: wire.received_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, rename = "from", deserialize_with = "null_as_empty")]
    pub sender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub to: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub html: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub received_at: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmailData {
    #[serde(default)]
    pub email: Option<MessageData>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub links: Option<Vec<String>>,
}

impl EmailData {
    /// Converts to the public type; `requested_id` fills in a missing message id.
    pub fn into_email(self, requested_id: &str) -> Email {
        let message = self.email.unwrap_or_default();
        let id = if message.id.is_empty() {
            requested_id.to_string()
        } else {
            message.id
        };

        Email {
            id,
            sender: message.sender,
            to: message.to,
            subject: message.subject,
            body_text: message.text,
            body_html: message.html,
            received_at: message.received_at,
            code: self.code.filter(|c| !c.is_empty()),
            links: self.links.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success_falls_back_to_status() {
        let envelope: Envelope = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(envelope.succeeded(true));
        assert!(!envelope.succeeded(false));
        assert_eq!(envelope.message_or("Unknown error"), "Unknown error");

        let envelope: Envelope =
            serde_json::from_value(json!({"success": false, "data": null})).unwrap();
        assert!(!envelope.succeeded(true));
    }

    #[test]
    fn test_envelope_message_prefers_error_then_detail() {
        let envelope: Envelope =
            serde_json::from_value(json!({"success": false, "error": "Mailbox expired"})).unwrap();
        assert_eq!(envelope.message_or("Unknown error"), "Mailbox expired");

        let envelope: Envelope =
            serde_json::from_value(json!({"success": false, "detail": "Not Found"})).unwrap();
        assert_eq!(envelope.message_or("Unknown error"), "Not Found");
    }

    #[test]
    fn test_summary_defaults_and_numeric_id() {
        let wire: SummaryData =
            serde_json::from_value(json!({"id": 5, "subject": null})).unwrap();
        let summary = EmailSummary::from(wire);

        assert_eq!(summary.id, "5");
        assert_eq!(summary.sender, "");
        assert_eq!(summary.subject, "");
        assert_eq!(summary.received_at, "");
    }

    #[test]
    fn test_email_falls_back_to_requested_id() {
        let data: EmailData = serde_json::from_value(json!({
            "email": {"from": "noreply@service.com", "subject": "Verify", "text": "Code 123456"},
            "code": "123456"
        }))
        .unwrap();
        let email = data.into_email("abc");

        assert_eq!(email.id, "abc");
        assert_eq!(email.sender, "noreply@service.com");
        assert_eq!(email.body_text, "Code 123456");
        assert_eq!(email.code.as_deref(), Some("123456"));
        assert!(email.links.is_empty());
    }

    #[test]
    fn test_empty_code_is_none() {
        let data: EmailData = serde_json::from_value(json!({"email": {}, "code": ""})).unwrap();
        assert_eq!(data.into_email("1").code, None);
    }

    #[test]
    fn test_received_at_parsing() {
        let summary = EmailSummary {
            id: "1".into(),
            sender: String::new(),
            subject: String::new(),
            received_at: "2025-01-15T10:30:00Z".into(),
        };
        assert!(summary.received_at_utc().is_some());

        let summary = EmailSummary {
            received_at: "yesterday".into(),
            ..summary
        };
        assert!(summary.received_at_utc().is_none());
    }

    #[test]
    fn test_mailbox_validates_and_redacts() {
        assert!(Mailbox::new("not-an-address", "t").is_err());

        let mailbox = Mailbox::new("swift-coral-42@mailcat.ai", "tok-secret").unwrap();
        assert_eq!(mailbox.token(), "tok-secret");
        assert!(!format!("{mailbox:?}").contains("tok-secret"));
    }
}
