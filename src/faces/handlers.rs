use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};

use super::{
    dto::{EmbeddingResponse, FaceLoginResponse},
    services::{register_embedding, verify_login_embedding},
};
use crate::{
    auth::{
        claims::TokenKind,
        cookie::{clear_cookie, session_cookie},
        extractors::{CurrentUser, EnrollingUser},
        handlers::uuid_header,
        jwt::TokenKeys,
    },
    error::AppError,
    images::services::UploadItem,
    state::AppState,
};

pub fn face_routes() -> Router<AppState> {
    Router::new()
        .route("/application/register_embedding", post(register_embedding_route))
        .route("/application/login_embedding", post(login_embedding_route))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// Collects `files` / `files[]` parts; other fields are ignored.
async fn collect_images(mut mp: Multipart) -> Result<Vec<UploadItem>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::ValidationFailed(format!("Malformed upload: {e}")))?
    {
        if !matches!(field.name(), Some("files") | Some("files[]")) {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationFailed(format!("Malformed upload: {e}")))?;
        if !body.is_empty() {
            files.push(UploadItem { body, content_type });
        }
    }
    if files.is_empty() {
        return Err(AppError::ValidationFailed("files[] is required".into()));
    }
    Ok(files)
}

/// POST /application/register_embedding (multipart files[])
///
/// The enrollment cookie is spent once the embedding is stored.
#[instrument(skip(state, jar, mp), fields(uuid = %user.uuid))]
pub async fn register_embedding_route(
    State(state): State<AppState>,
    EnrollingUser(user): EnrollingUser,
    jar: CookieJar,
    mp: Multipart,
) -> Result<(HeaderMap, CookieJar, Json<EmbeddingResponse>), AppError> {
    let images = collect_images(mp).await?;
    register_embedding(&state, &user.uuid, images).await?;
    Ok((
        uuid_header(&user.uuid)?,
        clear_cookie(jar, TokenKind::Enrollment),
        Json(EmbeddingResponse {
            status: true,
            message: "Embedding stored successfully".into(),
        }),
    ))
}

/// POST /application/login_embedding (multipart files[])
///
/// A passing face check swaps the access cookie for one marked `face_verified`.
#[instrument(skip(state, jar, mp), fields(uuid = %user.uuid))]
pub async fn login_embedding_route(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    mp: Multipart,
) -> Result<(CookieJar, Json<FaceLoginResponse>), AppError> {
    let images = collect_images(mp).await?;
    let similarity = verify_login_embedding(&state, &user.uuid, images).await?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign_face_verified(&user.uuid, &user.username)?;
    let jar = jar.add(session_cookie(&keys, TokenKind::Access, token));

    info!(similarity, "face verified");
    Ok((
        jar,
        Json(FaceLoginResponse {
            status: true,
            message: "Face verified".into(),
            similarity,
        }),
    ))
}
