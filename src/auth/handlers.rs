use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        claims::TokenKind,
        cookie::{clear_session_cookies, session_cookie},
        dto::{AuthResponse, LoginRequest, RegisterRequest, SessionResponse, SessionUserView},
        extractors::MaybeUser,
        jwt::TokenKeys,
        password::hash_password,
        user::User,
        validation::{LoginValidation, RegisterValidation},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(session))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

pub(crate) fn uuid_header(uuid: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(uuid)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("uuid header: {e}")))?;
    headers.insert("uuid", value);
    Ok(headers)
}

#[instrument(skip_all)]
pub async fn session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    let message = match &user {
        Some(u) if u.face_verified => format!("Logged in as {}", u.username),
        Some(u) => format!("Logged in as {}, face verification pending", u.username),
        None => "Not logged in".to_string(),
    };
    Json(SessionResponse {
        status: user.is_some(),
        message,
        user: user.map(|u| SessionUserView {
            uuid: u.uuid,
            username: u.username,
            face_verified: u.face_verified,
        }),
    })
}

#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, CookieJar, Json<AuthResponse>), AppError> {
    let user = User::from(payload);

    RegisterValidation::new(&user)
        .validate(state.users.as_ref())
        .await?
        .into_result()?;

    let hash = hash_password(&user.password)?;
    let record = user.into_credentials(hash);
    state.users.insert_one(&record).await?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(&record.uuid, &record.username, TokenKind::Enrollment)?;
    let jar = jar.add(session_cookie(&keys, TokenKind::Enrollment, token));

    info!(uuid = %record.uuid, "user registered");
    Ok((
        StatusCode::CREATED,
        uuid_header(&record.uuid)?,
        jar,
        Json(AuthResponse {
            status: true,
            message: "Registration successful, submit face images to finish enrollment".into(),
            uuid: Some(record.uuid),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, CookieJar, Json<AuthResponse>), AppError> {
    let user = LoginValidation::new(&payload.email, &payload.password)
        .authenticate(state.users.as_ref())
        .await?
        .ok_or_else(|| AppError::AuthFailed("Invalid credentials".into()))?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(&user.uuid, &user.username, TokenKind::Access)?;
    let jar = jar.add(session_cookie(&keys, TokenKind::Access, token));

    info!(uuid = %user.uuid, "user logged in");
    Ok((
        uuid_header(&user.uuid)?,
        jar,
        Json(AuthResponse {
            status: true,
            message: "Login successful".into(),
            uuid: Some(user.uuid),
        }),
    ))
}

#[instrument(skip_all)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        clear_session_cookies(jar),
        [(header::LOCATION, "/auth")],
    )
}
