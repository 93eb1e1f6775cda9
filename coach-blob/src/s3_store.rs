use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use bytes::Bytes;

use crate::{BlobError, BlobResult, BlobStore, PutResult};

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (LocalStack, RustFS, MinIO). `None` uses AWS.
    pub endpoint_url: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Config {
    fn validate(&self) -> BlobResult<()> {
        for (name, value) in [
            ("bucket", &self.bucket),
            ("region", &self.region),
            ("access_key_id", &self.access_key_id),
            ("secret_access_key", &self.secret_access_key),
        ] {
            if value.trim().is_empty() {
                return Err(BlobError::invalid(format!("S3 {name} is required")));
            }
        }
        Ok(())
    }

    /// Public location of `key`, path-style.
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }
}

/// Blob store backed by the AWS SDK (works with any S3-compatible service)
#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
    config: S3Config,
}

impl S3CompatibleStore {
    pub async fn new(config: S3Config) -> BlobResult<Self> {
        config.validate()?;
        let client = Self::create_client(&config).await;
        Ok(Self { client, config })
    }

    async fn create_client(config: &S3Config) -> Client {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "coach-service",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true) // LocalStack / RustFS need path-style addressing
                .build(),
        )
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> BlobError {
        BlobError::backend(err)
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn put(&self, key: &str, content_type: Option<&str>, data: Bytes) -> BlobResult<PutResult> {
        let size_bytes = data.len() as u64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(AwsByteStream::from(data.to_vec()));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        let result = request.send().await.map_err(Self::map_aws_error)?;
        tracing::debug!(key, size_bytes, "stored blob");

        Ok(PutResult {
            location: self.config.object_url(key),
            etag: result.e_tag().map(str::to_string),
            size_bytes,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let result = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().map(|e| e.is_no_such_key()).unwrap_or(false) {
                    BlobError::not_found(key)
                } else {
                    Self::map_aws_error(err)
                }
            })?;

        let body = result.body.collect().await.map_err(Self::map_aws_error)?;
        Ok(body.into_bytes())
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        tracing::debug!(key, "deleted blob");
        Ok(())
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().map(|e| e.is_not_found()).unwrap_or(false) => Ok(false),
            Err(err) => Err(Self::map_aws_error(err)),
        }
    }
}
