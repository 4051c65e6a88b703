use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FaceLoginResponse {
    pub status: bool,
    pub message: String,
    pub similarity: f64,
}
