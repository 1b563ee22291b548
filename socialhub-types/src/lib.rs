pub mod models;
pub mod remote;

pub use models::*;
pub use remote::*;
