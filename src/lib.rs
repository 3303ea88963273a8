pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{ApiError, StoreError, ValidationError};
pub use models::*;
pub use store::{Backend, MemoryStore, PostgresStore, ReviewStore};
