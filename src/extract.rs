//! Subject filtering and local extraction of values from fetched emails.
//!
//! The service already extracts a verification code and the links of every message.
//! The [`Extractor`] trait lets callers pull something else out of an [`Email`]
//! (a differently shaped code, one specific link) without relying on the server's
//! heuristics. Pass an extractor to
//! [`MailCatClient::wait_for_match`](crate::MailCatClient::wait_for_match).
//!
//! # Example
//!
//! ```
//! use mailcat::extract::{Extractor, OtpExtractor, RegexExtractor};
//! use mailcat::Email;
//!
//! let email = Email {
//!     id: "1".into(),
//!     sender: "noreply@example.com".into(),
//!     to: "swift-coral-42@mailcat.ai".into(),
//!     subject: "Your login code".into(),
//!     body_text: "Your code is 123456. Ref: token=abc123".into(),
//!     body_html: String::new(),
//!     received_at: String::new(),
//!     code: None,
//!     links: vec![],
//! };
//!
//! assert_eq!(OtpExtractor::six_digit().extract(&email).as_deref(), Some("123456"));
//!
//! let custom = RegexExtractor::new(r"token=([a-f0-9]+)").unwrap();
//! assert_eq!(custom.extract(&email).as_deref(), Some("abc123"));
//! ```

use crate::types::Email;
use regex::Regex;
use std::borrow::Cow;

/// Trait for pulling a value out of a fetched email.
///
/// # Example
///
/// ```
/// use mailcat::extract::Extractor;
/// use mailcat::Email;
/// use std::borrow::Cow;
///
/// struct SenderDomain;
///
/// impl Extractor for SenderDomain {
///     fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
///         email.sender.split_once('@').map(|(_, domain)| Cow::Borrowed(domain))
///     }
///
///     fn description(&self) -> &str {
///         "sender domain"
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// Returns the extracted value, borrowing from the email where possible.
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>>;

    /// Human-readable description, used in logs.
    fn description(&self) -> &str;
}

/// Case-insensitive substring filter on subject lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFilter {
    needle: String,
}

impl SubjectFilter {
    /// Creates a filter matching subjects that contain `needle`, ignoring case.
    #[must_use]
    pub fn new(needle: impl AsRef<str>) -> Self {
        Self {
            needle: needle.as_ref().to_lowercase(),
        }
    }

    /// Returns `true` if `subject` contains the filter text. An empty filter matches all.
    #[must_use]
    pub fn matches(&self, subject: &str) -> bool {
        subject.to_lowercase().contains(&self.needle)
    }

    /// The lowercased filter text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.needle
    }
}

/// Returns the verification code the server extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerCode;

impl Extractor for ServerCode {
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
        email.code.as_deref().map(Cow::Borrowed)
    }

    fn description(&self) -> &str {
        "server-extracted code"
    }
}

/// Regex extractor returning the first capture group.
///
/// Searches the plain-text body first, then the HTML body.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    regex: Regex,
    description: String,
}

impl RegexExtractor {
    /// Creates a regex extractor. The pattern needs at least one capture group.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_description(pattern, format!("regex pattern: {pattern}"))
    }

    /// Creates a regex extractor with a custom description.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn with_description(
        pattern: &str,
        description: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            description: description.into(),
        })
    }

    fn find_in<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Cow::Borrowed(m.as_str()))
    }
}

impl Extractor for RegexExtractor {
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
        self.find_in(&email.body_text)
            .or_else(|| self.find_in(&email.body_html))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Extractor for N-digit one-time codes in the message body.
#[derive(Debug, Clone)]
pub struct OtpExtractor {
    inner: RegexExtractor,
}

impl OtpExtractor {
    /// Matches exactly 6 consecutive digits.
    #[must_use]
    pub fn six_digit() -> Self {
        Self::n_digit(6)
    }

    /// Matches exactly `digits` consecutive digits between word boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `digits` is 0.
    #[must_use]
    pub fn n_digit(digits: usize) -> Self {
        assert!(digits > 0, "digits must be > 0");
        let pattern = format!(r"\b(\d{{{digits}}})\b");
        Self {
            inner: RegexExtractor::with_description(&pattern, format!("{digits}-digit code"))
                .expect("valid regex"),
        }
    }
}

impl Extractor for OtpExtractor {
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
        self.inner.extract(email)
    }

    fn description(&self) -> &str {
        self.inner.description()
    }
}

/// Returns the first server-extracted link that contains a domain.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    domain: String,
    description: String,
}

impl LinkExtractor {
    /// Creates an extractor for links pointing at `domain` (case-insensitive).
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into().to_lowercase();
        Self {
            description: format!("link to {domain}"),
            domain,
        }
    }
}

impl Extractor for LinkExtractor {
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
        email
            .links
            .iter()
            .find(|link| {
                url::Url::parse(link)
                    .ok()
                    .and_then(|url| url.host_str().map(str::to_lowercase))
                    .is_some_and(|host| {
                        host == self.domain || host.ends_with(&format!(".{}", self.domain))
                    })
            })
            .map(|link| Cow::Borrowed(link.as_str()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Extractor backed by a closure.
///
/// # Example
///
/// ```
/// use mailcat::extract::ClosureExtractor;
/// use std::borrow::Cow;
///
/// let extractor = ClosureExtractor::new(
///     |email| {
///         email.body_text
///             .lines()
///             .find(|line| line.starts_with("Code:"))
///             .map(|line| Cow::Owned(line.trim_start_matches("Code:").trim().to_string()))
///     },
///     "code line extractor",
/// );
/// ```
pub struct ClosureExtractor<F>
where
    F: for<'a> Fn(&'a Email) -> Option<Cow<'a, str>> + Send + Sync,
{
    extract_fn: F,
    description: String,
}

impl<F> ClosureExtractor<F>
where
    F: for<'a> Fn(&'a Email) -> Option<Cow<'a, str>> + Send + Sync,
{
    /// Creates a new closure-based extractor.
    #[must_use]
    pub fn new(extract_fn: F, description: impl Into<String>) -> Self {
        Self {
            extract_fn,
            description: description.into(),
        }
    }
}

impl<F> Extractor for ClosureExtractor<F>
where
    F: for<'a> Fn(&'a Email) -> Option<Cow<'a, str>> + Send + Sync,
{
    fn extract<'a>(&self, email: &'a Email) -> Option<Cow<'a, str>> {
        (self.extract_fn)(email)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<F> std::fmt::Debug for ClosureExtractor<F>
where
    F: for<'a> Fn(&'a Email) -> Option<Cow<'a, str>> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureExtractor")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(text: &str, html: &str) -> Email {
        Email {
            id: "1".into(),
            sender: "noreply@service.com".into(),
            to: "a@x.com".into(),
            subject: "Verify your account".into(),
            body_text: text.into(),
            body_html: html.into(),
            received_at: String::new(),
            code: Some("999000".into()),
            links: vec![
                "https://tracking.other.com/open".into(),
                "https://app.Example.com/verify?token=abc".into(),
            ],
        }
    }

    #[test]
    fn test_subject_filter_case_insensitive() {
        let filter = SubjectFilter::new("VERIFY");
        assert!(filter.matches("Please verify your email"));
        assert!(!filter.matches("Welcome aboard"));
        assert!(SubjectFilter::new("").matches("anything"));
    }

    #[test]
    fn test_server_code() {
        assert_eq!(ServerCode.extract(&email("", "")).as_deref(), Some("999000"));
    }

    #[test]
    fn test_regex_falls_back_to_html() {
        let extractor = RegexExtractor::new(r"ref=(\w+)").unwrap();
        let msg = email("no reference here", r#"<a href="/x?ref=A1B2">x</a>"#);
        assert_eq!(extractor.extract(&msg).as_deref(), Some("A1B2"));
    }

    #[test]
    fn test_otp_digit_boundaries() {
        let otp = OtpExtractor::six_digit();
        assert_eq!(otp.extract(&email("Your code is 123456.", "")).as_deref(), Some("123456"));
        assert_eq!(otp.extract(&email("Code: 12345", "")), None);
        assert_eq!(otp.extract(&email("Code: 1234567", "")), None);

        let pin = OtpExtractor::n_digit(4);
        assert_eq!(pin.extract(&email("PIN: 1234", "")).as_deref(), Some("1234"));
    }

    #[test]
    fn test_link_extractor_matches_host() {
        let msg = email("", "");
        assert_eq!(
            LinkExtractor::new("example.com").extract(&msg).as_deref(),
            Some("https://app.Example.com/verify?token=abc")
        );
        assert_eq!(LinkExtractor::new("nowhere.org").extract(&msg), None);
        // Substring of another host must not match
        assert_eq!(LinkExtractor::new("her.com").extract(&msg), None);
    }

    #[test]
    fn test_closure_extractor() {
        let extractor = ClosureExtractor::new(
            |email| {
                email
                    .body_text
                    .lines()
                    .find(|line| line.contains("SECRET"))
                    .map(|line| Cow::Owned(line.replace("SECRET:", "").trim().to_string()))
            },
            "secret extractor",
        );

        let msg = email("Header\nSECRET: my-value\nFooter", "");
        assert_eq!(extractor.extract(&msg).as_deref(), Some("my-value"));
    }

    #[test]
    fn test_regex_returns_borrowed() {
        let extractor = RegexExtractor::new(r"code:\s*(\d+)").unwrap();
        let msg = email("Your code: 12345", "");
        assert!(matches!(extractor.extract(&msg), Some(Cow::Borrowed(_))));
    }
}
