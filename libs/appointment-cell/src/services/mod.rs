pub mod booking;
pub mod filter;
pub mod lifecycle;
pub mod manager;
pub mod pricing;
pub mod print;

pub use booking::{BookingFlow, BookingStep, AVAILABLE_HOURS};
pub use filter::{split_today_and_upcoming, TurnoFilter};
pub use lifecycle::TurnoLifecycleService;
pub use manager::TurnoManager;
pub use pricing::PricingService;
