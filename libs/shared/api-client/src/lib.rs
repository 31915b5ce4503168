pub mod client;
pub mod error;

pub use client::{api_path, ApiClient};
pub use error::ApiError;
