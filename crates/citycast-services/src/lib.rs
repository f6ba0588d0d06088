//! Local persistence for citycast: key/value backends and the city list.

pub mod city_list;
pub mod kv_backend;
pub mod kv_store;

pub use city_list::{AddOutcome, City, CityList, STORAGE_KEY};
pub use kv_backend::{KvBackend, KvBackendError, KvBackendResult, MemoryKvStore};
pub use kv_store::SqliteKvStore;
