//! S3-compatible object store (MinIO in development), implementing
//! `memoria_core::ObjectStore` against `aws-sdk-s3` (spec §1, §4.11).

use async_trait::async_trait;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use memoria_core::{ObjectStore, Result, Status, StatusCode};

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub async fn new(endpoint: &str, access_key: &str, secret_key: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "memoria-config");
        let shared_config = aws_config::from_env()
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(Status::with_cause(
                StatusCode::Unavailable,
                "bucket_exists check failed",
                e,
            )),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Unavailable, "make_bucket failed", e))?;
        Ok(())
    }

    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Unavailable, "put object failed", e))?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Status::with_cause(StatusCode::NotFound, "get object failed", e))?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Internal, "read object body failed", e))?;
        Ok(bytes.into_bytes().to_vec())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Status::with_cause(StatusCode::Unavailable, "delete object failed", e))?;
        Ok(())
    }
}
