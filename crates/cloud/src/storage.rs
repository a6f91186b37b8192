//! Narration object storage on Cloudflare R2 through its S3-compatible API.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use escaperoom_core::narration::public_object_url;

use crate::error::CloudError;

/// Stores an object and returns the URL it is publicly served from.
#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn put_public(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError>;
}

/// Connection settings for an R2 bucket.
#[derive(Debug, Clone)]
pub struct R2Config {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub public_domain: String,
    /// Overrides `https://{account_id}.r2.cloudflarestorage.com`.
    pub endpoint: Option<String>,
}

impl R2Config {
    /// Load from environment variables.
    ///
    /// Returns `None` unless `R2_ACCOUNT_ID`, `R2_ACCESS_KEY_ID`,
    /// `R2_SECRET_ACCESS_KEY`, `R2_BUCKET_NAME` and `R2_PUBLIC_DOMAIN` are all
    /// set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            account_id: crate::env_opt("R2_ACCOUNT_ID")?,
            access_key_id: crate::env_opt("R2_ACCESS_KEY_ID")?,
            secret_access_key: crate::env_opt("R2_SECRET_ACCESS_KEY")?,
            bucket: crate::env_opt("R2_BUCKET_NAME")?,
            public_domain: crate::env_opt("R2_PUBLIC_DOMAIN")?,
            endpoint: None,
        })
    }

    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.r2.cloudflarestorage.com", self.account_id))
    }
}

/// S3 client bound to one R2 bucket.
pub struct R2Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_domain: String,
}

impl R2Store {
    pub fn new(config: &R2Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_domain: config.public_domain.clone(),
        }
    }
}

#[async_trait]
impl AudioStore for R2Store {
    async fn put_public(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| CloudError::Storage(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(bucket = %self.bucket, key, size, "Object uploaded");
        Ok(public_object_url(&self.public_domain, key))
    }
}
