use tracing::{info, instrument, warn};

use super::embedding::{average_embedding, cosine_similarity};
use crate::{
    error::AppError,
    images::services::{archive_face_images, discard_face_images, UploadItem},
    state::AppState,
};

/// One embedding per image, in submission order.
async fn embed_all(state: &AppState, images: &[UploadItem]) -> Result<Vec<Vec<f64>>, AppError> {
    let mut out = Vec::with_capacity(images.len());
    for (idx, img) in images.iter().enumerate() {
        let embedding = state.model.represent(img.body.clone()).await.map_err(|e| {
            warn!(error = %e, image = idx, "embedding generation failed");
            AppError::from(e)
        })?;
        out.push(embedding);
    }
    Ok(out)
}

/// Embeds every image, averages the results and stores them for `uuid`.
/// Nothing is written unless every image produced an embedding.
#[instrument(skip(state, images), fields(images = images.len()))]
pub async fn register_embedding(
    state: &AppState,
    uuid: &str,
    images: Vec<UploadItem>,
) -> Result<Vec<f64>, AppError> {
    if images.is_empty() {
        return Err(AppError::ValidationFailed("At least one face image is required".into()));
    }
    let embeddings = embed_all(state, &images).await?;
    let averaged = average_embedding(&embeddings)?;

    let archived = match &state.archive {
        Some(storage) => archive_face_images(storage.as_ref(), uuid, &images)
            .await
            .map_err(AppError::StoreUnavailable)?,
        None => Vec::new(),
    };

    if let Err(e) = state.embeddings.save(uuid, &averaged).await {
        if let Some(storage) = &state.archive {
            discard_face_images(storage.as_ref(), &archived).await;
        }
        return Err(e.into());
    }

    info!(dim = averaged.len(), "embedding stored");
    Ok(averaged)
}

/// Compares freshly submitted images against the stored embedding and
/// returns the similarity when it clears the configured threshold.
#[instrument(skip(state, images), fields(images = images.len()))]
pub async fn verify_login_embedding(
    state: &AppState,
    uuid: &str,
    images: Vec<UploadItem>,
) -> Result<f64, AppError> {
    if images.is_empty() {
        return Err(AppError::ValidationFailed("At least one face image is required".into()));
    }
    let Some(stored) = state.embeddings.find(uuid).await? else {
        warn!("no stored embedding");
        return Err(AppError::AuthFailed("No face enrolled for this account".into()));
    };

    let fresh = average_embedding(&embed_all(state, &images).await?)?;
    let similarity = cosine_similarity(&stored.embedding, &fresh)?;
    let threshold = state.config.embedding.similarity_threshold;

    if similarity < threshold {
        warn!(similarity, threshold, "face did not match");
        return Err(AppError::AuthFailed("Face does not match".into()));
    }
    info!(similarity, "face matched");
    Ok(similarity)
}
