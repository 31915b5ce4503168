pub mod context;
pub mod preferences;
pub mod router;

pub use context::AppContext;
pub use preferences::Preferences;
pub use router::create_router;
