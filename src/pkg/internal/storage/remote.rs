use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
    Client,
};
use standard_error::{Interpolate, StandardError};

use super::StorageBackend;
use crate::{conf::settings, prelude::Result};

/// S3-compatible object store, addressed by bucket + key.
pub struct RemoteStore {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl RemoteStore {
    pub fn new(client: Client, bucket: &str, endpoint: &str) -> Self {
        RemoteStore {
            client,
            bucket: bucket.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub async fn from_settings() -> Self {
        let creds = Credentials::new(
            settings.s3_access_key.clone(),
            settings.s3_secret_key.clone(),
            None,
            None,
            "resumebox",
        );
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.s3_region.clone()))
            .credentials_provider(creds)
            .load()
            .await;
        let s3_config = S3ConfigBuilder::from(&sdk_config)
            .endpoint_url(&settings.s3_endpoint_url)
            .force_path_style(true)
            .build();
        RemoteStore::new(
            Client::from_conf(s3_config),
            &settings.s3_bucket_name,
            &settings.s3_endpoint_url,
        )
    }
}

#[async_trait]
impl StorageBackend for RemoteStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| {
                StandardError::new("ERR-STORAGE-REMOTE")
                    .interpolate_err(format!("{}", DisplayErrorContext(&e)))
            })?;
        Ok(format!("{}/{}/{}", self.endpoint, self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StandardError::new("ERR-STORAGE-REMOTE")
                    .interpolate_err(format!("{}", DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    async fn signed_get(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StandardError::new("ERR-STORAGE-PRESIGN").interpolate_err(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                StandardError::new("ERR-STORAGE-PRESIGN")
                    .interpolate_err(format!("{}", DisplayErrorContext(&e)))
            })?;
        Ok(presigned.uri().to_string())
    }
}
