pub mod jwt;
pub mod persist;
pub mod scheduler;
pub mod test_utils;

pub use persist::StateFile;
pub use scheduler::ScheduledTask;
