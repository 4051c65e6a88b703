use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::repo_types::{CredentialRecord, UserFilter};
use crate::db::StoreError;

/// Key-lookup and insert over the users collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_one(&self, filter: UserFilter) -> Result<Option<CredentialRecord>, StoreError>;
    async fn insert_one(&self, record: &CredentialRecord) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_one(&self, filter: UserFilter) -> Result<Option<CredentialRecord>, StoreError> {
        // column comes from a closed set, never from input
        let sql = format!(
            r#"
            SELECT uuid, name, username, email, phone, password_hash, created_at
            FROM users
            WHERE {} = $1
            "#,
            filter.column()
        );
        let user = sqlx::query_as::<_, CredentialRecord>(&sql)
            .bind(filter.value())
            .fetch_optional(&self.db)
            .await?;
        debug!(by = filter.column(), found = user.is_some(), "user lookup");
        Ok(user)
    }

    async fn insert_one(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (uuid, name, username, email, phone, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.uuid)
        .bind(&record.name)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
