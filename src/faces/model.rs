//! Client for the external face detection + representation service.
//!
//! The service accepts one image per call and answers with one entry per
//! detected face; only the first face is used.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{config::EmbeddingConfig, error::AppError};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("no face detected")]
    NoFace,

    #[error(transparent)]
    Inference(#[from] anyhow::Error),
}

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::NoFace => AppError::NoFaceDetected,
            ModelError::Inference(e) => AppError::InferenceFailed(e),
        }
    }
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embedding of the first face found in `image`.
    async fn represent(&self, image: Bytes) -> Result<Vec<f64>, ModelError>;
}

#[derive(Debug, Deserialize)]
struct RepresentResponse {
    #[serde(default)]
    results: Vec<FaceRepresentation>,
}

#[derive(Debug, Deserialize)]
struct FaceRepresentation {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RepresentError {
    error: String,
}

pub struct HttpEmbeddingModel {
    client: reqwest::Client,
    endpoint: String,
    detector_backend: String,
    model_name: String,
    enforce_detection: bool,
}

impl HttpEmbeddingModel {
    pub fn new(cfg: &EmbeddingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("build embedding http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/represent", cfg.service_url.trim_end_matches('/')),
            detector_backend: cfg.detector_backend.clone(),
            model_name: cfg.model_name.clone(),
            enforce_detection: cfg.enforce_detection,
        })
    }
}

#[async_trait]
impl EmbeddingModel for HttpEmbeddingModel {
    #[instrument(skip(self, image), fields(bytes = image.len(), model = %self.model_name))]
    async fn represent(&self, image: Bytes) -> Result<Vec<f64>, ModelError> {
        let form = multipart::Form::new()
            .part("img", multipart::Part::bytes(image.to_vec()).file_name("face"))
            .text("detector_backend", self.detector_backend.clone())
            .text("model_name", self.model_name.clone())
            .text("enforce_detection", self.enforce_detection.to_string());

        let res = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("embedding service request")?;
        let status = res.status();
        let body = res.text().await.context("embedding service body")?;
        debug!(%status, "embedding service answered");
        parse_represent_response(status, &body)
    }
}

fn parse_represent_response(status: StatusCode, body: &str) -> Result<Vec<f64>, ModelError> {
    if !status.is_success() {
        let message = serde_json::from_str::<RepresentError>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        if message.to_lowercase().contains("face could not be detected") {
            return Err(ModelError::NoFace);
        }
        return Err(anyhow::anyhow!("embedding service returned {status}: {message}").into());
    }

    let parsed: RepresentResponse =
        serde_json::from_str(body).context("decode embedding service response")?;
    parsed
        .results
        .into_iter()
        .next()
        .map(|face| face.embedding)
        .ok_or(ModelError::NoFace)
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;

    use super::*;

    /// Maps exact image bytes to canned embeddings; unknown images have no face.
    #[derive(Default)]
    pub struct ScriptedModel {
        pub faces: HashMap<Vec<u8>, Vec<f64>>,
        pub broken: bool,
    }

    impl ScriptedModel {
        pub fn with_face(mut self, image: &[u8], embedding: Vec<f64>) -> Self {
            self.faces.insert(image.to_vec(), embedding);
            self
        }
    }

    #[async_trait]
    impl EmbeddingModel for ScriptedModel {
        async fn represent(&self, image: Bytes) -> Result<Vec<f64>, ModelError> {
            if self.broken {
                return Err(anyhow::anyhow!("model server down").into());
            }
            self.faces.get(image.as_ref()).cloned().ok_or(ModelError::NoFace)
        }
    }
}
