use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub enrollment_ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub service_url: String,
    pub detector_backend: String,
    pub model_name: String,
    pub enforce_detection: bool,
    pub similarity_threshold: f64,
}

/// S3/MinIO target for enrollment images. Absent means images are not archived.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub embedding: EmbeddingConfig,
    pub archive: Option<ArchiveConfig>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: env_or("JWT_TTL_MINUTES", 15),
            enrollment_ttl_minutes: env_or("JWT_ENROLLMENT_TTL_MINUTES", 30),
            cookie_secure: env_or("COOKIE_SECURE", false),
        };
        let embedding = EmbeddingConfig {
            service_url: std::env::var("EMBEDDING_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5005".into()),
            detector_backend: std::env::var("DETECTOR_BACKEND").unwrap_or_else(|_| "mtcnn".into()),
            model_name: std::env::var("EMBEDDING_MODEL_NAME")
                .unwrap_or_else(|_| "Facenet".into()),
            enforce_detection: env_or("ENFORCE_DETECTION", true),
            similarity_threshold: env_or("SIMILARITY_THRESHOLD", 0.70),
        };
        if !(-1.0..=1.0).contains(&embedding.similarity_threshold) {
            anyhow::bail!(
                "SIMILARITY_THRESHOLD must be within [-1, 1], got {}",
                embedding.similarity_threshold
            );
        }

        let archive = match std::env::var("FACE_ARCHIVE_BUCKET") {
            Ok(bucket) => Some(ArchiveConfig {
                endpoint: std::env::var("MINIO_ENDPOINT")?,
                bucket,
                access_key: std::env::var("MINIO_ACCESS_KEY")?,
                secret_key: std::env::var("MINIO_SECRET_KEY")?,
                region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            jwt,
            embedding,
            archive,
        })
    }
}
