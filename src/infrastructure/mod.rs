pub mod http;
pub mod services;
pub mod storage;

pub use http::*;
pub use services::*;
pub use storage::*;
