use serde::{Deserialize, Serialize};

/// Purpose of a token: full session or registration follow-up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Enrollment,
}

/// JWT payload carried in the session cookies.
///
/// `sub` and `username` default to empty so that a signed token lacking them
/// still decodes and can be told apart from a forged one. `face_verified` is
/// only set on access tokens re-issued after a passing face check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: String, // user UUID
    #[serde(default)]
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
    #[serde(default)]
    pub face_verified: bool,
}
