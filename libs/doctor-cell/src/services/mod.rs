pub mod availability;
pub mod scheduling;

pub use availability::{AvailabilityDirectory, AvailabilityService, InMemoryAvailabilityDirectory};
pub use scheduling::{SlotAllocator, SlotPolicy};
