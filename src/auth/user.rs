use uuid::Uuid;

use super::{dto::RegisterRequest, repo_types::CredentialRecord};

/// A registration candidate. Holds both plain passwords only long enough to
/// validate them; nothing here is persisted as-is.
#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub uuid: String,
}

/// Two random v4 UUIDs back to back, in simple (hex) form.
pub fn generate_user_uuid() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

impl User {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
        uuid: Option<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            username: username.into().trim().to_string(),
            email: email.into().trim().to_lowercase(),
            phone: phone.into().trim().to_string(),
            password: password.into(),
            confirm_password: confirm_password.into(),
            uuid: uuid
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(generate_user_uuid),
        }
    }

    /// Persistable form; drops the plain passwords.
    pub fn into_credentials(self, password_hash: String) -> CredentialRecord {
        CredentialRecord {
            uuid: self.uuid,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password_hash,
            created_at: time::OffsetDateTime::now_utc(),
        }
    }
}

impl From<RegisterRequest> for User {
    fn from(req: RegisterRequest) -> Self {
        User::new(
            req.name,
            req.username,
            req.email,
            req.phone,
            req.password,
            req.confirm_password,
            None,
        )
    }
}
