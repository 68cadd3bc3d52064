use super::value_objects::Timestamp;
use crate::domain::device::SystemInfo;
use crate::domain::errors::{InfrastructureError, StorageError};

/// Durable string key-value storage (browser localStorage or an in-memory map)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str);
}

/// Device endpoint returning system info plus the history recorded since `start`
#[allow(async_fn_in_trait)]
pub trait HistorySource {
    async fn fetch_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError>;
}

impl<T: HistorySource> HistorySource for &T {
    async fn fetch_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError> {
        (**self).fetch_info(start).await
    }
}

impl<T: HistorySource> HistorySource for std::rc::Rc<T> {
    async fn fetch_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError> {
        (**self).fetch_info(start).await
    }
}
