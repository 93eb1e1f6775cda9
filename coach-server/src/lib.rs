pub mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use coach_axum::CoachAxumApp;
use coach_blob::{BlobStore, MemoryBlobStore, PhotoKeys, S3CompatibleStore, S3Config};
use coach_core::{
    CoachConfigSnapshot, CoachRepository, MemoryCoachRepository, ReviewDirectory,
    ServiceDirectory, UserDirectory,
};
use coach_postgres::PgCoachRepository;
use coach_remote::{
    HttpReviewDirectory, HttpServiceDirectory, HttpUserDirectory, MemoryDirectory, RemoteEndpoint,
};
use coach_service::{CoachService, IngestLimits, JoinAggregator, DEFAULT_MAX_PHOTO_BYTES};

fn required(config: &CoachConfigSnapshot, key: &str) -> Result<String> {
    config
        .get_string(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing '{key}' configuration"))
}

async fn repository(config: &CoachConfigSnapshot) -> Result<Arc<dyn CoachRepository>> {
    match config.get("storage.backend").unwrap_or("postgres") {
        "memory" => Ok(Arc::new(MemoryCoachRepository::new())),
        "postgres" => {
            let url = required(config, "database.url")?;
            let max_connections = config
                .get("database.max_connections")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5);
            let repo = PgCoachRepository::connect(&url, max_connections)
                .await
                .context("connecting to postgres")?;
            Ok(Arc::new(repo))
        }
        other => bail!("Unknown storage.backend '{other}'"),
    }
}

async fn blob_store(config: &CoachConfigSnapshot) -> Result<Arc<dyn BlobStore>> {
    match config.get("blob.backend").unwrap_or("s3") {
        "memory" => {
            let bucket = config
                .get_string("blob.bucket")
                .unwrap_or_else(|| "coach-photos".to_string());
            Ok(Arc::new(MemoryBlobStore::new(bucket)))
        }
        "s3" => {
            let store = S3CompatibleStore::new(S3Config {
                bucket: required(config, "blob.bucket")?,
                region: required(config, "blob.region")?,
                endpoint_url: config.get_string("blob.endpoint"),
                access_key_id: required(config, "blob.access_key_id")?,
                secret_access_key: required(config, "blob.secret_access_key")?,
            })
            .await?;
            Ok(Arc::new(store))
        }
        other => bail!("Unknown blob.backend '{other}'"),
    }
}

struct Directories {
    services: Arc<dyn ServiceDirectory>,
    reviews: Arc<dyn ReviewDirectory>,
    users: Arc<dyn UserDirectory>,
}

fn directories(config: &CoachConfigSnapshot) -> Result<Directories> {
    match config.get("remote.backend").unwrap_or("http") {
        "memory" => {
            let directory = Arc::new(MemoryDirectory::new());
            Ok(Directories {
                services: directory.clone(),
                reviews: directory.clone(),
                users: directory,
            })
        }
        "http" => {
            let timeout = Duration::from_secs(config.get_u64("remote.timeout_secs").unwrap_or(10));
            let client = reqwest::Client::new();
            let endpoint = |key: &str| -> Result<RemoteEndpoint> {
                Ok(RemoteEndpoint::new(client.clone(), required(config, key)?, timeout))
            };
            Ok(Directories {
                services: Arc::new(HttpServiceDirectory::new(endpoint("remote.services.url")?)),
                reviews: Arc::new(HttpReviewDirectory::new(endpoint("remote.reviews.url")?)),
                users: Arc::new(HttpUserDirectory::new(endpoint("remote.users.url")?)),
            })
        }
        other => bail!("Unknown remote.backend '{other}'"),
    }
}

/// Wire stores, directories and the HTTP adapter from `config`.
pub async fn build(config: &CoachConfigSnapshot) -> Result<CoachAxumApp> {
    let repository = repository(config).await?;
    let blobs = blob_store(config).await?;
    let remote = directories(config)?;

    let max_photo_bytes = config
        .get_usize("ingest.max_photo_bytes")
        .unwrap_or(DEFAULT_MAX_PHOTO_BYTES);
    let keys = PhotoKeys::new(
        config
            .get_string("blob.key_prefix")
            .unwrap_or_else(|| coach_blob::DEFAULT_KEY_PREFIX.to_string()),
    );

    let aggregator = JoinAggregator::new(
        Arc::clone(&repository),
        remote.services,
        remote.reviews,
        remote.users,
    );
    let service = CoachService::new(repository, blobs, aggregator)
        .with_keys(keys)
        .with_limits(IngestLimits { max_photo_bytes });

    Ok(CoachAxumApp::new(Arc::new(service))
        .with_photo_limit(max_photo_bytes)
        .with_tracing())
}
