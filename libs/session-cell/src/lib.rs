pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;

pub use error::SessionError;
pub use models::*;
pub use middleware::require_session;
pub use router::session_routes;
pub use services::{RefreshOutcome, SessionManager};
