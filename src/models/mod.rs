pub mod availability;
pub mod booking;
pub mod court;
pub mod slot;
pub mod tenant;

pub use availability::{AvailabilityRule, Breaks, RuleSchedule, RuleScope};
pub use booking::{
    Booking, BookingFilters, BookingPatch, BookingSet, BookingStatus, CreateBooking, NewBooking,
    Page, PaymentMethod, PaymentStatus,
};
pub use court::{Court, CourtStatus, CourtType};
pub use slot::{Slot, TimeOfDay};
pub use tenant::{Client, Tenant};
