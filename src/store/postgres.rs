use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use super::{Backend, ReviewStore};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{Rating, Review, ReviewDraft};

const SCHEMA: &str = include_str!("../../schema.sql");

/// PostgreSQL-backed review store for production persistence
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to PostgreSQL and optionally create the `reviews` table
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("Connected to PostgreSQL");

        let store = Self::from_pool(pool);
        if config.ensure_schema {
            store.ensure_schema().await?;
        }

        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `reviews` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .context("Failed to create reviews table")?;

        debug!("Reviews table ready");

        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PostgresStore {
    fn backend(&self) -> Backend {
        Backend::Relational
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, rating, review_text
            FROM reviews
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn list_by_rating(&self, rating: Option<i64>) -> Result<Vec<Review>, StoreError> {
        let Some(rating) = rating else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT id, title, author, rating, review_text
            FROM reviews
            WHERE rating = $1
            ORDER BY id
            "#,
        )
        .bind(rating)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Review, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, rating, review_text
            FROM reviews WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => review_from_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn insert(&self, draft: ReviewDraft) -> Result<Review, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO reviews (title, author, rating, review_text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, rating, review_text
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(i32::from(draft.rating.get()))
        .bind(&draft.review_text)
        .fetch_one(&self.pool)
        .await?;

        let review = review_from_row(&row)?;

        debug!(id = review.id, "Inserted review into database");

        Ok(review)
    }

    async fn update(&self, id: i64, draft: ReviewDraft) -> Result<Review, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE reviews
            SET title = $1, author = $2, rating = $3, review_text = $4
            WHERE id = $5
            RETURNING id, title, author, rating, review_text
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(i32::from(draft.rating.get()))
        .bind(&draft.review_text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                debug!(id, "Updated review in database");
                review_from_row(&row)
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn remove(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, removed = result.rows_affected(), "Removed review from database");

        Ok(())
    }
}

fn review_from_row(row: &PgRow) -> Result<Review, StoreError> {
    let rating: i32 = row.try_get("rating")?;
    let rating = Rating::new(i64::from(rating)).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Review {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        rating,
        review_text: row.try_get("review_text")?,
    })
}
