pub mod availability;
pub mod clock;
pub mod doctor;
pub mod slots;

pub use availability::AvailabilityService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use doctor::DoctorService;
pub use slots::compute_day_schedule;
