use aws_config::Region;
use aws_sdk_s3::{config::{Credentials, SharedCredentialsProvider}, error::ProvideErrorMetadata, primitives::ByteStream, Client};
use bytes::Bytes;
use anyhow::Result;

use crate::common::error::RecordStoreError;

pub struct S3Client {
    client: Client,
}

impl S3Client {
    pub async fn new(endpoint: &str, access_key: &str, secret_key: &str, region: &str) -> Result<Self> {
        log::info!("Creating S3 client with endpoint: {}, region: {}", endpoint, region);
        let credentials = Credentials::new(access_key.to_string(), secret_key.to_string(), None, None, "custom");
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version_latest()
            .region(Region::new(region.to_string()))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .force_path_style(true)
            .endpoint_url(endpoint.to_string())
            .build();
        let client = Client::from_conf(config);
        Ok(S3Client { client })
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<(Bytes, String)>, RecordStoreError> {
        let output = match self.client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(RecordStoreError::Service(service_err.into()));
            }
        };

        let etag = output.e_tag()
            .ok_or_else(|| anyhow::anyhow!("ETag not found in response"))?
            .to_string();
        let data = output.body.collect().await.map_err(anyhow::Error::from)?.into_bytes();
        Ok(Some((data, etag)))
    }

    /// With an ETag the put is a compare-and-swap against that revision;
    /// without one it only succeeds when the object does not exist yet.
    pub async fn put_object(&self, bucket: &str, key: &str, body: &Vec<u8>, etag: Option<String>) -> Result<(), RecordStoreError> {
        let response = match etag {
            Some(etag) => {
                log::debug!("Putting object to S3 with ETag: {}", etag);
                self.client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .body(ByteStream::from(body.clone()))
                    .set_if_match(Some(etag)) // CAS Lock
                    .send()
                    .await
            }
            None => {
                log::debug!("Putting object to S3 if absent");
                self.client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .body(ByteStream::from(body.clone()))
                    .if_none_match("*")
                    .send()
                    .await
            }
        };
        match response {
            Ok(_) => {
                log::debug!("Committing changes to S3 (CAS succeeded)");
                Ok(())
            }
            Err(ref e) if e.code() == Some("PreconditionFailed") => {
                log::warn!("CAS failed due to ETag mismatch on {}", key);
                Err(RecordStoreError::Conflict { key: key.to_string() })
            }
            Err(e) => {
                log::error!("S3 error: {:?}", e);
                Err(RecordStoreError::Service(e.into()))
            }
        }
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), RecordStoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| RecordStoreError::Service(e.into()))?;
        Ok(())
    }

    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, RecordStoreError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let output = self.client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token.clone())
                .send()
                .await
                .map_err(|e| RecordStoreError::Service(e.into()))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(|t| t.to_string());
            } else {
                break;
            }
        }
        Ok(keys)
    }
}
