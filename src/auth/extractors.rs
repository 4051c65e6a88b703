use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{
    claims::{Claims, TokenKind},
    cookie::cookie_name,
    jwt::TokenKeys,
};
use crate::error::AppError;

/// Identity recovered from a verified session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uuid: String,
    pub username: String,
    pub face_verified: bool,
}

impl From<Claims> for SessionUser {
    fn from(c: Claims) -> Self {
        Self {
            uuid: c.sub,
            username: c.username,
            face_verified: c.face_verified,
        }
    }
}

/// `Ok(None)` when no cookie of `kind` is present; any present but unusable
/// token is an error.
fn session_from_parts(
    parts: &Parts,
    keys: &TokenKeys,
    kind: TokenKind,
) -> Result<Option<SessionUser>, AppError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(token) = jar.get(cookie_name(kind)).map(|c| c.value().to_string()) else {
        return Ok(None);
    };
    let claims = keys.verify_kind(&token, kind).map_err(|e| {
        warn!(error = %e, ?kind, "rejected session token");
        AppError::from(e)
    })?;
    Ok(Some(claims.into()))
}

/// Access session if present; anonymous otherwise.
pub struct MaybeUser(pub Option<SessionUser>);

/// Requires a valid access token.
pub struct CurrentUser(pub SessionUser);

/// Requires a valid enrollment token minted at registration.
pub struct EnrollingUser(pub SessionUser);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        Ok(MaybeUser(session_from_parts(parts, &keys, TokenKind::Access)?))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        session_from_parts(parts, &keys, TokenKind::Access)?
            .map(CurrentUser)
            .ok_or_else(|| AppError::AuthFailed("Not authenticated".into()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for EnrollingUser
where
    S: Send + Sync,
    TokenKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = TokenKeys::from_ref(state);
        session_from_parts(parts, &keys, TokenKind::Enrollment)?
            .map(EnrollingUser)
            .ok_or_else(|| AppError::AuthFailed("Register before submitting face images".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::{header::COOKIE, Request};

    fn keys() -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: "extractor-secret".into(),
            ttl_minutes: 15,
            enrollment_ttl_minutes: 30,
            cookie_secure: false,
        })
    }

    fn parts_with_cookie(cookie: Option<String>) -> Parts {
        let mut req = Request::builder().uri("/");
        if let Some(c) = cookie {
            req = req.header(COOKIE, c);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[test]
    fn no_cookie_is_anonymous() {
        let parts = parts_with_cookie(None);
        assert_eq!(session_from_parts(&parts, &keys(), TokenKind::Access).unwrap(), None);
    }

    #[test]
    fn valid_cookie_yields_identity() {
        let k = keys();
        let token = k.sign("U1", "alice", TokenKind::Access).unwrap();
        let parts = parts_with_cookie(Some(format!("theme=dark; access_token={token}")));
        let user = session_from_parts(&parts, &k, TokenKind::Access).unwrap();
        assert_eq!(
            user,
            Some(SessionUser {
                uuid: "U1".into(),
                username: "alice".into(),
                face_verified: false,
            })
        );
    }

    #[test]
    fn garbage_cookie_is_auth_failure() {
        let parts = parts_with_cookie(Some("access_token=garbage".into()));
        let err = session_from_parts(&parts, &keys(), TokenKind::Access).unwrap_err();
        assert!(matches!(err, AppError::AuthFailed(_)));
    }

    #[test]
    fn enrollment_token_in_access_cookie_is_rejected() {
        let k = keys();
        let token = k.sign("U1", "alice", TokenKind::Enrollment).unwrap();
        let parts = parts_with_cookie(Some(format!("access_token={token}")));
        assert!(session_from_parts(&parts, &k, TokenKind::Access).is_err());
    }
}
