pub mod availability;
pub mod booking;
pub mod overlap;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::{BookingLocks, BookingService};
