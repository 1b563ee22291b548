//! Display helpers shared by the feed, profile and enrichment code.

use chrono::{DateTime, Utc};

/// Avatar service used for every remote user
const AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150?u=";

/// Compact age of a post: `now`, `5m`, `3h`, `2d`.
///
/// Minutes are truncated; timestamps in the future count as `now`.
pub fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes().max(0);
    match minutes {
        0 => "now".to_string(),
        1..=59 => format!("{}m", minutes),
        60..=1439 => format!("{}h", minutes / 60),
        _ => format!("{}d", minutes / 1440),
    }
}

/// Profile bio assembled from the remote user's address, school and employer.
///
/// Returns `None` when every part is blank.
pub fn build_bio(city: &str, country: &str, university: &str, company: &str) -> Option<String> {
    let location = join_non_blank(&[city, country], ", ");
    let first_line = join_non_blank(&[&location, university], " - ");
    let bio = join_non_blank(&[&first_line, company], "\n");
    (!bio.is_empty()).then_some(bio)
}

pub fn avatar_url(username: &str) -> String {
    format!("{}{}", AVATAR_BASE_URL, username)
}

/// Author name shown while the author row has not been fetched yet
pub fn placeholder_name(user_id: i64) -> String {
    format!("User {}", user_id)
}

pub fn placeholder_handle(user_id: i64) -> String {
    format!("@user{}", user_id)
}

fn join_non_blank(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
