//! Registration and login validation.
//!
//! Registration runs every check and reports all failures at once; login only
//! checks the form before looking the user up and verifying the password.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    password::verify_password,
    repo::UserStore,
    repo_types::{CredentialRecord, UserFilter},
    user::User,
};
use crate::error::AppError;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 16;

/// Verified against when the email is unknown so both login failures cost one argon2 run.
/// Parameters match `Argon2::default()`.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dmlzYWdlLWR1bW15LXNhbHQ$qyRJV2apmYIjhOCFPwHGh4jP5Kniombprt+4BBpFL6k";

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^([A-Za-z0-9]+[._-])*[A-Za-z0-9]+@[A-Za-z0-9-]+(\.[A-Za-z]{2,})+$")
                .unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn is_valid_password_length(password: &str) -> bool {
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password.chars().count())
}

/// Pass/fail plus every message collected on the way.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    messages: Vec<String>,
}

impl ValidationOutcome {
    fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.messages.push(message.to_string());
        }
    }

    pub fn passed(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self) -> String {
        self.messages.join("; ")
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.passed() {
            Ok(())
        } else {
            Err(AppError::ValidationFailed(self.message()))
        }
    }
}

pub struct RegisterValidation<'a> {
    user: &'a User,
}

impl<'a> RegisterValidation<'a> {
    pub fn new(user: &'a User) -> Self {
        Self { user }
    }

    /// Field-level checks that need no store access.
    pub fn validate_fields(&self) -> ValidationOutcome {
        let u = self.user;
        let mut out = ValidationOutcome::default();
        out.check(!u.name.is_empty(), "Name is required");
        out.check(!u.username.is_empty(), "Username is required");
        out.check(!u.email.is_empty(), "Email is required");
        out.check(!u.phone.is_empty(), "Phone number is required");
        out.check(!u.password.is_empty(), "Password is required");
        out.check(
            !u.confirm_password.is_empty(),
            "Password confirmation is required",
        );
        out.check(is_valid_email(&u.email), "Invalid email");
        out.check(
            is_valid_password_length(&u.password),
            "Password must be between 8 and 16 characters",
        );
        out.check(u.password == u.confirm_password, "Passwords do not match");
        out
    }

    /// All field checks plus username/email/UUID uniqueness.
    pub async fn validate(&self, store: &dyn UserStore) -> Result<ValidationOutcome, AppError> {
        let u = self.user;
        let mut out = self.validate_fields();

        let username_taken = !u.username.is_empty()
            && store
                .find_one(UserFilter::Username(u.username.clone()))
                .await?
                .is_some();
        let email_taken = !u.email.is_empty()
            && store
                .find_one(UserFilter::Email(u.email.clone()))
                .await?
                .is_some();
        let uuid_taken = store
            .find_one(UserFilter::Uuid(u.uuid.clone()))
            .await?
            .is_some();

        out.check(!username_taken, "Username already exists");
        out.check(!email_taken, "Email already registered");
        out.check(!uuid_taken, "User id already exists");

        if !out.passed() {
            warn!(username = %u.username, reasons = %out.message(), "registration rejected");
        }
        Ok(out)
    }
}

pub struct LoginValidation {
    pub email: String,
    pub password: String,
}

impl LoginValidation {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> ValidationOutcome {
        let mut out = ValidationOutcome::default();
        out.check(!self.email.is_empty(), "Email is required");
        out.check(!self.password.is_empty(), "Password is required");
        out.check(is_valid_email(&self.email), "Invalid email");
        out
    }

    /// `Ok(None)` when the email is unknown or the password does not match;
    /// callers must not distinguish the two.
    pub async fn authenticate(
        &self,
        store: &dyn UserStore,
    ) -> Result<Option<CredentialRecord>, AppError> {
        self.authenticate_with(store, verify_password).await
    }

    async fn authenticate_with<V>(
        &self,
        store: &dyn UserStore,
        verify: V,
    ) -> Result<Option<CredentialRecord>, AppError>
    where
        V: Fn(&str, &str) -> Result<bool, AppError>,
    {
        self.validate().into_result()?;

        let Some(user) = store.find_one(UserFilter::Email(self.email.clone())).await? else {
            let _ = verify(&self.password, DUMMY_HASH);
            info!("login for unknown email");
            return Ok(None);
        };
        if !verify(&self.password, &user.password_hash)? {
            info!(uuid = %user.uuid, "login with wrong password");
            return Ok(None);
        }
        info!(uuid = %user.uuid, "password verified");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::hash_password, repo::memory::MemoryUserStore};

    fn user(name: &str, username: &str, email: &str, phone: &str, p1: &str, p2: &str) -> User {
        User::new(name, username, email, phone, p1, p2, None)
    }

    fn alice() -> User {
        user("Alice", "alice", "alice@example.com", "5551234", "password123", "password123")
    }

    async fn store_with(u: User) -> MemoryUserStore {
        let store = MemoryUserStore::default();
        let hash = hash_password(&u.password).unwrap();
        store.insert_one(&u.into_credentials(hash)).await.unwrap();
        store
    }

    #[test]
    fn email_pattern() {
        for ok in ["a@b.io", "first.last@example.com", "x_y-z@mail-host.co.uk", "A1@B2.ORG"] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
        for bad in ["", "plain", "a@b", "a@b.c", "@example.com", "a..b@example.com", "a b@x.io"] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn password_length_bounds() {
        assert!(!is_valid_password_length("1234567"));
        assert!(is_valid_password_length("12345678"));
        assert!(is_valid_password_length("1234567890123456"));
        assert!(!is_valid_password_length("12345678901234567"));
        // counted in characters, not bytes
        assert!(is_valid_password_length("ééééééééé"));
    }

    #[test]
    fn every_missing_field_is_reported() {
        let u = user("", "", "", "", "", "");
        let msg = RegisterValidation::new(&u).validate_fields().message();
        for expected in [
            "Name is required",
            "Username is required",
            "Email is required",
            "Phone number is required",
            "Password is required",
        ] {
            assert!(msg.contains(expected), "missing '{expected}' in '{msg}'");
        }
    }

    #[test]
    fn mismatch_fails_even_when_both_lengths_are_valid() {
        let u = user("A", "a", "a@example.com", "1", "password123", "password124");
        let out = RegisterValidation::new(&u).validate_fields();
        assert!(!out.passed());
        assert_eq!(out.message(), "Passwords do not match");
    }

    #[test]
    fn multiple_failures_accumulate() {
        let u = user("A", "a", "not-an-email", "1", "short", "short");
        let msg = RegisterValidation::new(&u).validate_fields().message();
        assert!(msg.contains("Invalid email"));
        assert!(msg.contains("between 8 and 16"));
    }

    #[tokio::test]
    async fn fresh_user_passes() {
        let store = MemoryUserStore::default();
        let u = alice();
        let out = RegisterValidation::new(&u).validate(&store).await.unwrap();
        assert!(out.passed(), "{}", out.message());
    }

    #[tokio::test]
    async fn same_email_different_username_is_rejected() {
        let store = store_with(alice()).await;
        let second = user("Al", "alice2", "ALICE@example.com", "5550000", "password123", "password123");
        let out = RegisterValidation::new(&second).validate(&store).await.unwrap();
        assert!(!out.passed());
        assert_eq!(out.message(), "Email already registered");
    }

    #[tokio::test]
    async fn uuid_collision_is_rejected() {
        let first = alice();
        let uuid = first.uuid.clone();
        let store = store_with(first).await;
        let second = User::new(
            "Bob", "bob", "bob@example.com", "1", "password123", "password123", Some(uuid),
        );
        let out = RegisterValidation::new(&second).validate(&store).await.unwrap();
        assert_eq!(out.message(), "User id already exists");
    }

    #[tokio::test]
    async fn store_outage_is_not_a_validation_failure() {
        let u = alice();
        let err = RegisterValidation::new(&u)
            .validate(&crate::auth::repo::memory::DownUserStore)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn login_succeeds_with_right_password() {
        let store = store_with(alice()).await;
        let found = LoginValidation::new(" Alice@Example.com ", "password123")
            .authenticate(&store)
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = store_with(alice()).await;
        let wrong = LoginValidation::new("alice@example.com", "password999")
            .authenticate(&store)
            .await
            .unwrap();
        let unknown = LoginValidation::new("nobody@example.com", "password123")
            .authenticate(&store)
            .await
            .unwrap();
        assert!(wrong.is_none());
        assert!(unknown.is_none());
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("password123", DUMMY_HASH).unwrap());
        assert!(!verify_password("", DUMMY_HASH).unwrap());
    }

    #[tokio::test]
    async fn unknown_email_runs_the_verifier_like_a_wrong_password() {
        use std::cell::Cell;

        let store = store_with(alice()).await;
        let calls = Cell::new(0);
        let counting = |plain: &str, hash: &str| {
            calls.set(calls.get() + 1);
            verify_password(plain, hash)
        };

        let unknown = LoginValidation::new("nobody@example.com", "password123")
            .authenticate_with(&store, &counting)
            .await
            .unwrap();
        assert!(unknown.is_none());
        assert_eq!(calls.get(), 1);

        calls.set(0);
        let wrong = LoginValidation::new("alice@example.com", "password999")
            .authenticate_with(&store, &counting)
            .await
            .unwrap();
        assert!(wrong.is_none());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn login_form_errors_are_validation_failures() {
        let store = MemoryUserStore::default();
        let err = LoginValidation::new("", "")
            .authenticate(&store)
            .await
            .unwrap_err();
        match err {
            AppError::ValidationFailed(msg) => {
                assert!(msg.contains("Email is required"));
                assert!(msg.contains("Password is required"));
                assert!(msg.contains("Invalid email"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
