use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, TokenKind};
use crate::{config::JwtConfig, error::AppError, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token is missing required claims")]
    MissingClaims,

    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },

    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::MissingClaims => AppError::ForceLogout,
            TokenError::Encoding(e) => AppError::Internal(e.into()),
            TokenError::Expired => AppError::AuthFailed("Session expired".into()),
            TokenError::Invalid | TokenError::WrongKind { .. } => {
                AppError::AuthFailed("Invalid session token".into())
            }
        }
    }
}

/// Signing material plus lifetimes, built from the injected [`JwtConfig`].
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub access_ttl: Duration,
    pub enrollment_ttl: Duration,
    pub cookie_secure: bool,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        TokenKeys::new(&state.config.jwt)
    }
}

impl TokenKeys {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            enrollment_ttl: Duration::minutes(cfg.enrollment_ttl_minutes),
            cookie_secure: cfg.cookie_secure,
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Enrollment => self.enrollment_ttl,
        }
    }

    pub fn sign(&self, uuid: &str, username: &str, kind: TokenKind) -> Result<String, TokenError> {
        self.sign_at(OffsetDateTime::now_utc(), uuid, username, kind, false)
    }

    /// Access token for a session whose face check has passed.
    pub fn sign_face_verified(&self, uuid: &str, username: &str) -> Result<String, TokenError> {
        self.sign_at(OffsetDateTime::now_utc(), uuid, username, TokenKind::Access, true)
    }

    fn sign_at(
        &self,
        now: OffsetDateTime,
        uuid: &str,
        username: &str,
        kind: TokenKind,
        face_verified: bool,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: uuid.to_string(),
            username: username.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl(kind)).unix_timestamp(),
            kind,
            face_verified,
        };
        let token = encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;
        debug!(uuid = %uuid, kind = ?kind, face_verified, "jwt signed");
        Ok(token)
    }

    /// Checks signature and expiry, then that identity claims are present.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() || claims.username.is_empty() {
            return Err(TokenError::MissingClaims);
        }
        debug!(uuid = %claims.sub, kind = ?claims.kind, "jwt verified");
        Ok(claims)
    }

    pub fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.kind != expected {
            return Err(TokenError::WrongKind { expected });
        }
        Ok(claims)
    }
}
