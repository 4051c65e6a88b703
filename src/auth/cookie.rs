use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::{claims::TokenKind, jwt::TokenKeys};

pub const ACCESS_COOKIE: &str = "access_token";
pub const ENROLLMENT_COOKIE: &str = "enrollment_token";

pub fn cookie_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => ACCESS_COOKIE,
        TokenKind::Enrollment => ENROLLMENT_COOKIE,
    }
}

/// HttpOnly cookie carrying `token`, living as long as the token itself.
pub fn session_cookie(keys: &TokenKeys, kind: TokenKind, token: String) -> Cookie<'static> {
    Cookie::build((cookie_name(kind), token))
        .path("/")
        .http_only(true)
        .secure(keys.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(keys.ttl(kind))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").http_only(true).build();
    cookie.make_removal();
    cookie
}

pub fn clear_cookie(jar: CookieJar, kind: TokenKind) -> CookieJar {
    jar.add(removal_cookie(cookie_name(kind)))
}

/// Emits expired copies of both session cookies.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    let jar = clear_cookie(jar, TokenKind::Access);
    clear_cookie(jar, TokenKind::Enrollment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    #[test]
    fn access_cookie_is_http_only_with_token_lifetime() {
        let keys = TokenKeys::new(&JwtConfig {
            secret: "s".into(),
            ttl_minutes: 15,
            enrollment_ttl_minutes: 30,
            cookie_secure: true,
        });
        let cookie = session_cookie(&keys, TokenKind::Access, "abc.def.ghi".into());
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(15)));
    }

    #[test]
    fn removal_cookie_is_empty_and_expired() {
        let cookie = removal_cookie(ENROLLMENT_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn clear_cookie_touches_only_its_kind() {
        let jar = clear_cookie(CookieJar::new(), TokenKind::Enrollment);
        let cleared = jar.get(ENROLLMENT_COOKIE).expect("removal cookie");
        assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
        assert!(jar.get(ACCESS_COOKIE).is_none());
    }
}
