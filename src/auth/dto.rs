use serde::{Deserialize, Deserializer, Serialize};

/// Registration form. Every field defaults to empty so the validator, not
/// the JSON layer, reports what is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    #[serde(alias = "Name")]
    pub name: String,
    pub username: String,
    #[serde(alias = "email_id")]
    pub email: String,
    #[serde(alias = "ph_no", deserialize_with = "string_or_number")]
    pub phone: String,
    #[serde(alias = "password1")]
    pub password: String,
    #[serde(alias = "password2")]
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(alias = "email_id")]
    pub email: String,
    pub password: String,
}

/// `{status, message}` envelope shared by the auth endpoints.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionUserView {
    pub uuid: String,
    pub username: String,
    pub face_verified: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub status: bool,
    pub message: String,
    pub user: Option<SessionUserView>,
}

/// Phone numbers arrive either as JSON strings or bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_legacy_field_names() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "Name": "Alice",
            "username": "alice",
            "email_id": "alice@example.com",
            "ph_no": 5551234,
            "password1": "password123",
            "password2": "password123"
        }))
        .unwrap();
        assert_eq!(req.name, "Alice");
        assert_eq!(req.email, "alice@example.com");
        assert_eq!(req.phone, "5551234");
        assert_eq!(req.confirm_password, "password123");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(req.username, "bob");
        assert!(req.name.is_empty() && req.email.is_empty() && req.phone.is_empty());
    }

    #[test]
    fn auth_response_omits_absent_uuid() {
        let json = serde_json::to_string(&AuthResponse {
            status: false,
            message: "nope".into(),
            uuid: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"status":false,"message":"nope"}"#);
    }
}
