//! finanz-core
//!
//! Business logic and services for MiFinanzApp.
//! Depends on finanz-domain. No UI; storage is reached only through [`storage::KeyValueStore`].

pub mod category_service;
pub mod conversion;
pub mod currency_service;
pub mod entry_service;
pub mod error;
pub mod estimate_service;
pub mod rate_service;
pub mod repository;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use category_service::*;
pub use currency_service::*;
pub use entry_service::*;
pub use error::CoreError;
pub use estimate_service::*;
pub use rate_service::*;
pub use repository::*;
pub use storage::{KeyValueStore, MemoryStore};
pub use summary_service::*;
