//! Local input checks run before any request is issued.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shown when an email address fails the syntactic check.
pub const INVALID_EMAIL_MESSAGE: &str = "Email invalid. Please try again.";

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Za-z0-9_.\-]+@[A-Za-z0-9_\-]+\.[A-Za-z]{2,4}$").ok());

/// Conservative email check: word, dot or hyphen characters, `@`, one domain
/// label, and a two to four letter suffix.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

/// Whether every value is non-empty after trimming.
#[must_use]
pub fn all_present(values: &[&str]) -> bool {
    values.iter().all(|value| !value.trim().is_empty())
}
