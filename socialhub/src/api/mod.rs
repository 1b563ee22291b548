pub mod client;
pub mod error;

pub use client::{ApiClient, RemoteApi};
pub use error::{ApiError, ApiResult};
