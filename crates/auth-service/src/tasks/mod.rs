//! Background tasks.

pub mod store_health;

pub use store_health::start_store_health_checker;
