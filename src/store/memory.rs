use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Backend, ReviewStore};
use crate::error::StoreError;
use crate::models::{Rating, Review, ReviewDraft};

/// Process-lifetime review storage used when no database is reachable.
///
/// Records and the ID counter sit behind one lock so every read-modify-write
/// is atomic. IDs come from a running counter and are never reused.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

struct MemoryState {
    reviews: Vec<Review>,
    next_id: i64,
}

impl MemoryStore {
    /// Empty store whose first review gets ID 1
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                reviews: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Store holding one sample review (ID 1); new reviews start at ID 2
    pub fn seeded() -> Self {
        let sample = Review {
            id: 1,
            title: "Sample Book".to_string(),
            author: "Sample Author".to_string(),
            rating: Rating::BEST,
            review_text: "Great book!".to_string(),
        };

        info!("Initialized in-memory store with sample review");

        Self {
            state: Mutex::new(MemoryState {
                reviews: vec![sample],
                next_id: 2,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::InMemory
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.reviews.clone())
    }

    async fn list_by_rating(&self, rating: Option<i64>) -> Result<Vec<Review>, StoreError> {
        let Some(rating) = rating else {
            return Ok(Vec::new());
        };

        let state = self.state.lock().await;
        Ok(state
            .reviews
            .iter()
            .filter(|r| i64::from(r.rating) == rating)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Review, StoreError> {
        let state = self.state.lock().await;
        state
            .reviews
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert(&self, draft: ReviewDraft) -> Result<Review, StoreError> {
        let mut state = self.state.lock().await;

        let id = state.next_id;
        state.next_id += 1;

        let review = Review::from_draft(id, draft);
        state.reviews.push(review.clone());

        debug!(id, "Inserted review into memory");

        Ok(review)
    }

    async fn update(&self, id: i64, draft: ReviewDraft) -> Result<Review, StoreError> {
        let mut state = self.state.lock().await;

        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        review.overwrite(draft);

        debug!(id, "Updated review in memory");

        Ok(review.clone())
    }

    async fn remove(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        let before = state.reviews.len();
        state.reviews.retain(|r| r.id != id);

        debug!(id, removed = before - state.reviews.len(), "Removed review from memory");

        Ok(())
    }
}
