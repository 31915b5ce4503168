pub mod session;

pub use session::{RefreshOutcome, SessionManager};
