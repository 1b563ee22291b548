//! Form validation. Functions return the message to show, or `None` when
//! the value is acceptable.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_POST_LENGTH: usize = 280;

pub const USERNAME_FORMAT_ERROR: &str = "Only letters, numbers, _ or -";
pub const USERNAME_TAKEN_ERROR: &str = "Username already taken";
pub const EMAIL_REQUIRED_ERROR: &str = "Email is required";
pub const EMAIL_FORMAT_ERROR: &str = "Email format is invalid";
pub const POST_TOO_LONG_ERROR: &str = "Post must be 280 characters or less";

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("username pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]+(\.[A-Za-z0-9]+)*@[A-Za-z0-9]+(\.[A-Za-z0-9]+)+$")
        .expect("email pattern is valid")
});

/// Blank usernames get no message; registration is still blocked on them.
pub fn validate_username(username: &str) -> Option<&'static str> {
    let username = username.trim();
    if username.is_empty() || USERNAME_RE.is_match(username) {
        None
    } else {
        Some(USERNAME_FORMAT_ERROR)
    }
}

pub fn validate_email(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        Some(EMAIL_REQUIRED_ERROR)
    } else if !EMAIL_RE.is_match(email) {
        Some(EMAIL_FORMAT_ERROR)
    } else {
        None
    }
}

pub fn validate_post_content(content: &str) -> Option<&'static str> {
    (content.chars().count() > MAX_POST_LENGTH).then_some(POST_TOO_LONG_ERROR)
}
