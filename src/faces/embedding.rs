use crate::error::AppError;

/// Element-wise arithmetic mean of equally sized vectors.
pub fn average_embedding(embeddings: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
    let Some(first) = embeddings.first() else {
        return Err(AppError::ValidationFailed("At least one face image is required".into()));
    };
    let dim = first.len();
    if dim == 0 {
        return Err(AppError::InferenceFailed(anyhow::anyhow!("model returned an empty embedding")));
    }

    let mut sum = vec![0.0_f64; dim];
    for (i, e) in embeddings.iter().enumerate() {
        if e.len() != dim {
            return Err(AppError::InferenceFailed(anyhow::anyhow!(
                "embedding {i} has length {}, expected {dim}",
                e.len()
            )));
        }
        for (acc, v) in sum.iter_mut().zip(e) {
            *acc += v;
        }
    }

    let n = embeddings.len() as f64;
    Ok(sum.into_iter().map(|s| s / n).collect())
}

/// Cosine of the angle between `a` and `b`; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, AppError> {
    if a.len() != b.len() {
        return Err(AppError::InferenceFailed(anyhow::anyhow!(
            "cannot compare embeddings of length {} and {}",
            a.len(),
            b.len()
        )));
    }
    let (mut dot, mut na, mut nb) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (na.sqrt() * nb.sqrt()))
}
