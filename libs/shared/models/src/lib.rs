pub mod auth;
pub mod error;

pub use auth::{JwtClaims, Session, TokenSource, User};
pub use error::AppError;
