#![forbid(unsafe_code)]

pub mod keys;
pub mod kv;
pub mod repository;
pub mod sqlite;

pub use kv::KvRepository;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
