pub mod device;
pub mod errors;
pub mod logging;
pub mod telemetry;
