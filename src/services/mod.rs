pub mod availability;
pub mod booking;
pub mod conflict;
pub mod grouping;
pub mod jobs;
pub mod slots;
