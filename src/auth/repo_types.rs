use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Persisted credentials of a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredentialRecord {
    pub uuid: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub created_at: OffsetDateTime,
}

/// Key used to look a user up; each maps to a unique column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Uuid(String),
    Username(String),
    Email(String),
}

impl UserFilter {
    pub fn column(&self) -> &'static str {
        match self {
            UserFilter::Uuid(_) => "uuid",
            UserFilter::Username(_) => "username",
            UserFilter::Email(_) => "email",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            UserFilter::Uuid(v) | UserFilter::Username(v) | UserFilter::Email(v) => v,
        }
    }

    pub fn matches(&self, record: &CredentialRecord) -> bool {
        match self {
            UserFilter::Uuid(v) => &record.uuid == v,
            UserFilter::Username(v) => &record.username == v,
            UserFilter::Email(v) => &record.email == v,
        }
    }
}
