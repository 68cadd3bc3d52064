//! Hashrate telemetry aggregate: the windowed series, history fragments,
//! the import service and the persisted layout.

pub mod entities;
pub mod fragment;
pub mod persistence;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use fragment::*;
pub use persistence::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
