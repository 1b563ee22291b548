//! Remote → cache synchronization.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

mod authors;
mod posts;

pub use authors::{to_user, AuthorEnricher, EnrichmentSummary, FetchedAuthors};
pub use posts::{to_posts, PostSynchronizer, SYNTHETIC_POST_SPACING_SECS};

static LAST_LOCAL_ID: AtomicI64 = AtomicI64::new(0);

/// Id for a row created on this device: the current time in milliseconds,
/// bumped past the previous id when two rows land in the same millisecond.
pub fn next_local_id(now: DateTime<Utc>) -> i64 {
    let candidate = now.timestamp_millis();
    let previous = LAST_LOCAL_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    candidate.max(previous + 1)
}

/// Distinct author ids of `posts`, in first-seen order
pub fn distinct_author_ids(posts: &[socialhub_types::Post]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    posts
        .iter()
        .map(|post| post.user_id)
        .filter(|user_id| seen.insert(*user_id))
        .collect()
}
