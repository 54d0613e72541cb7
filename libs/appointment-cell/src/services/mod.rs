pub mod booking;
pub mod lifecycle;
pub mod locks;
pub mod store;

pub use booking::BookingService;
pub use lifecycle::BookingLifecycleService;
pub use locks::SlotLockRegistry;
pub use store::{BookingStore, InMemoryBookingStore};
