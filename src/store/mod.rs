pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{Review, ReviewDraft};

/// Which backend is serving reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Relational,
    InMemory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Relational => f.write_str("relational"),
            Backend::InMemory => f.write_str("in-memory"),
        }
    }
}

/// Trait for review persistence backends
#[async_trait]
pub trait ReviewStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// List every review in the backend's natural order
    async fn list_all(&self) -> Result<Vec<Review>, StoreError>;

    /// List reviews with exactly this rating. `None` yields no reviews.
    async fn list_by_rating(&self, rating: Option<i64>) -> Result<Vec<Review>, StoreError>;

    /// Load a review by ID
    async fn get(&self, id: i64) -> Result<Review, StoreError>;

    /// Store a new review under a freshly assigned ID
    async fn insert(&self, draft: ReviewDraft) -> Result<Review, StoreError>;

    /// Overwrite every field of an existing review
    async fn update(&self, id: i64, draft: ReviewDraft) -> Result<Review, StoreError>;

    /// Delete a review. Deleting an absent ID is not an error.
    async fn remove(&self, id: i64) -> Result<(), StoreError>;
}

/// Pick the backend for the lifetime of the process.
///
/// Tries PostgreSQL once when a URL is configured and falls back to a seeded
/// in-memory store on any failure. There is no reconnect.
pub async fn connect(config: &DatabaseConfig) -> Arc<dyn ReviewStore> {
    let Some(url) = config.url.as_deref() else {
        info!("No database URL configured, using in-memory store");
        return Arc::new(MemoryStore::seeded());
    };

    match PostgresStore::connect(url, config).await {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!("{err:#}; using in-memory store instead");
            Arc::new(MemoryStore::seeded())
        }
    }
}
