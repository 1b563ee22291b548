use thiserror::Error;

use crate::api::ApiError;
use socialhub_store::StoreError;

/// Errors surfaced by the client pipelines
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("session storage error: {0:#}")]
    Session(#[from] anyhow::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Text shown to the user; `fallback` when the server sent no detail
    pub fn user_message(&self, fallback: &str) -> String {
        let blank_detail = match self {
            Error::Api(err) => err.detail().is_some_and(|detail| detail.trim().is_empty()),
            _ => false,
        };
        if blank_detail {
            fallback.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Run a synchronous store call on the blocking pool
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> socialhub_store::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
