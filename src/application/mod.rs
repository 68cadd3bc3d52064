pub mod config;
pub mod poll_scheduler;
pub mod telemetry_sync;

pub use config::*;
pub use poll_scheduler::*;
pub use telemetry_sync::*;
