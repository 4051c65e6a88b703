use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::storage::StorageClient;

/// One uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> &'static str {
    match ct {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

pub fn face_image_key(uuid: &str, image_id: Uuid, content_type: &str) -> String {
    format!("faces/{}/{}.{}", uuid, image_id, ext_from_mime(content_type))
}

/// Uploads every image under the user's prefix. On failure, objects already
/// written are removed before the error is returned.
pub async fn archive_face_images(
    storage: &dyn StorageClient,
    uuid: &str,
    images: &[UploadItem],
) -> anyhow::Result<Vec<String>> {
    let mut keys = Vec::with_capacity(images.len());
    for img in images {
        let key = face_image_key(uuid, Uuid::new_v4(), &img.content_type);
        if let Err(e) = storage
            .put_object(&key, img.body.clone(), &img.content_type)
            .await
        {
            discard_face_images(storage, &keys).await;
            return Err(e);
        }
        keys.push(key);
    }
    info!(uuid = %uuid, count = keys.len(), "face images archived");
    Ok(keys)
}

/// Best-effort removal; failures are only logged.
pub async fn discard_face_images(storage: &dyn StorageClient, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete_object(key).await {
            warn!(error = %e, key = %key, "could not remove archived face image");
        }
    }
}
