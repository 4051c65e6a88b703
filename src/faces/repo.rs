use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::db::StoreError;

/// Averaged face embedding of one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmbeddingRecord {
    pub uuid: String,
    pub embedding: Vec<f64>,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn find(&self, uuid: &str) -> Result<Option<EmbeddingRecord>, StoreError>;
    /// Inserts or replaces the embedding for `uuid`.
    async fn save(&self, uuid: &str, embedding: &[f64]) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgEmbeddingStore {
    db: PgPool,
}

impl PgEmbeddingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmbeddingStore for PgEmbeddingStore {
    async fn find(&self, uuid: &str) -> Result<Option<EmbeddingRecord>, StoreError> {
        let row = sqlx::query_as::<_, EmbeddingRecord>(
            r#"
            SELECT uuid, embedding, created_at
            FROM user_embeddings
            WHERE uuid = $1
            "#,
        )
        .bind(uuid)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn save(&self, uuid: &str, embedding: &[f64]) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_embeddings (uuid, embedding)
            VALUES ($1, $2)
            ON CONFLICT (uuid)
            DO UPDATE SET embedding = EXCLUDED.embedding, created_at = now()
            "#,
        )
        .bind(uuid)
        .bind(embedding)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
