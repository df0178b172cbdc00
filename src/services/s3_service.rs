use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectCannedAcl, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Duration;
use uuid::Uuid;

use crate::config::S3Config;
use crate::models::messages::storage as msg;
use crate::utils::api_response::AppError;

/// S3 caps DeleteObjects at this many keys per request.
const DELETE_BATCH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub location: String,
}

/// Blob store for picture payloads. Every upload gets a fresh random key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_image(&self, data: Bytes, content_type: &str) -> Result<UploadedObject, AppError>;
    async fn delete_image(&self, key: &str) -> Result<(), AppError>;
    /// Temporary signed URL for `key`.
    async fn image_url(&self, key: &str) -> Result<String, AppError>;
    /// Empties the bucket. `false` when there was nothing to delete.
    async fn delete_all_images(&self) -> Result<bool, AppError>;
    async fn ensure_bucket(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct S3Service {
    config: S3Config,
    client: Client,
}

impl S3Service {
    pub async fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let region = Region::new(config.region.clone());

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .endpoint_url(config.endpoint.clone())
            .load()
            .await;

        // MinIO and LocalStack only serve path-style URLs
        let s3_config_builder = aws_sdk_s3::config::Builder::from(&shared_config).force_path_style(true);

        let client = Client::from_conf(s3_config_builder.build());

        Self { config, client }
    }

    fn object_url(&self, key: &str) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        format!("{}/{}/{}", base, self.config.bucket_name, key)
    }

    async fn list_keys(&self) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.config.bucket_name)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| AppError::internal(msg::DELETE_ALL_ERROR, DisplayErrorContext(&e)))?;

            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));

            match page.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl ObjectStorage for S3Service {
    async fn upload_image(&self, data: Bytes, content_type: &str) -> Result<UploadedObject, AppError> {
        let key = Uuid::new_v4().to_string();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type);
        if self.config.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        match request.send().await {
            Ok(_) => {
                tracing::debug!(key = %key, "image uploaded");
                Ok(UploadedObject {
                    location: self.object_url(&key),
                    key,
                })
            }
            Err(e) => {
                tracing::error!("S3 Upload Error: {}", DisplayErrorContext(&e));
                Err(AppError::internal(msg::UPLOAD_ERROR, DisplayErrorContext(&e)))
            }
        }
    }

    async fn delete_image(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::internal(msg::DELETE_ERROR, DisplayErrorContext(&e)))?;
        tracing::debug!(key = %key, "image deleted");
        Ok(())
    }

    async fn image_url(&self, key: &str) -> Result<String, AppError> {
        let presigning_config = PresigningConfig::expires_in(Duration::from_secs(self.config.presign_expires_secs))
            .map_err(|e| AppError::internal(msg::URL_ERROR, e))?;

        let presigned_req = self
            .client
            .get_object()
            .bucket(&self.config.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::internal(msg::URL_ERROR, DisplayErrorContext(&e)))?;

        Ok(presigned_req.uri().to_string())
    }

    async fn delete_all_images(&self) -> Result<bool, AppError> {
        let keys = self.list_keys().await?;
        if keys.is_empty() {
            tracing::info!("No images to delete");
            return Ok(false);
        }

        for chunk in keys.chunks(DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::internal(msg::DELETE_ALL_ERROR, e))?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| AppError::internal(msg::DELETE_ALL_ERROR, e))?;

            self.client
                .delete_objects()
                .bucket(&self.config.bucket_name)
                .delete(delete)
                .send()
                .await
                .map_err(|e| AppError::internal(msg::DELETE_ALL_ERROR, DisplayErrorContext(&e)))?;
        }

        tracing::info!(count = keys.len(), "All images deleted successfully");
        Ok(true)
    }

    async fn ensure_bucket(&self) -> Result<(), AppError> {
        let bucket = &self.config.bucket_name;
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket = %bucket, "Bucket exists");
                Ok(())
            }
            Err(e) if e.as_service_error().map(|s| s.is_not_found()).unwrap_or(false) => {
                let mut request = self.client.create_bucket().bucket(bucket);
                // us-east-1 rejects an explicit location constraint
                if self.config.region != "us-east-1" {
                    request = request.create_bucket_configuration(
                        CreateBucketConfiguration::builder()
                            .location_constraint(BucketLocationConstraint::from(self.config.region.as_str()))
                            .build(),
                    );
                }
                request
                    .send()
                    .await
                    .map_err(|e| AppError::internal(msg::BUCKET_CREATE_ERROR, DisplayErrorContext(&e)))?;
                tracing::info!(bucket = %bucket, "Bucket created");
                Ok(())
            }
            Err(e) => Err(AppError::internal(msg::BUCKET_CHECK_ERROR, DisplayErrorContext(&e))),
        }
    }
}

pub mod memory {
    //! Process-local storage used by `STORAGE_BACKEND=memory` and by tests.

    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    pub const DEFAULT_BASE_URL: &str = "http://localhost:4566";

    #[derive(Default)]
    struct State {
        objects: BTreeMap<String, (String, Bytes)>,
        deleted: Vec<String>,
        uploads_left: Option<usize>,
        fail_deletes: bool,
    }

    pub struct MemoryStorage {
        base_url: String,
        presign_expires_secs: u64,
        state: Mutex<State>,
    }

    impl Default for MemoryStorage {
        fn default() -> Self {
            Self::new(DEFAULT_BASE_URL, 60)
        }
    }

    impl MemoryStorage {
        pub fn new(base_url: impl Into<String>, presign_expires_secs: u64) -> Self {
            Self {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                presign_expires_secs,
                state: Mutex::new(State::default()),
            }
        }

        fn lock(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        /// Uploads start failing once `n` more have succeeded.
        pub fn fail_uploads_after(&self, n: usize) {
            self.lock().uploads_left = Some(n);
        }

        pub fn fail_deletes(&self, fail: bool) {
            self.lock().fail_deletes = fail;
        }

        pub fn contains(&self, key: &str) -> bool {
            self.lock().objects.contains_key(key)
        }

        pub fn keys(&self) -> Vec<String> {
            self.lock().objects.keys().cloned().collect()
        }

        pub fn deleted_keys(&self) -> Vec<String> {
            self.lock().deleted.clone()
        }

        pub fn content_type(&self, key: &str) -> Option<String> {
            self.lock().objects.get(key).map(|(content_type, _)| content_type.clone())
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn upload_image(&self, data: Bytes, content_type: &str) -> Result<UploadedObject, AppError> {
            let mut state = self.lock();
            if let Some(left) = state.uploads_left.as_mut() {
                if *left == 0 {
                    return Err(AppError::internal(msg::UPLOAD_ERROR, "upload refused"));
                }
                *left -= 1;
            }
            let key = Uuid::new_v4().to_string();
            state.objects.insert(key.clone(), (content_type.to_string(), data));
            Ok(UploadedObject {
                location: format!("{}/{}", self.base_url, key),
                key,
            })
        }

        async fn delete_image(&self, key: &str) -> Result<(), AppError> {
            let mut state = self.lock();
            if state.fail_deletes {
                return Err(AppError::internal(msg::DELETE_ERROR, "delete refused"));
            }
            state.objects.remove(key);
            state.deleted.push(key.to_string());
            Ok(())
        }

        async fn image_url(&self, key: &str) -> Result<String, AppError> {
            Ok(format!("{}/{}?expires={}", self.base_url, key, self.presign_expires_secs))
        }

        async fn delete_all_images(&self) -> Result<bool, AppError> {
            let mut state = self.lock();
            if state.objects.is_empty() {
                return Ok(false);
            }
            let keys: Vec<String> = state.objects.keys().cloned().collect();
            state.objects.clear();
            state.deleted.extend(keys);
            Ok(true)
        }

        async fn ensure_bucket(&self) -> Result<(), AppError> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStorage;
    use super::*;

    #[tokio::test]
    async fn uploads_get_distinct_keys_and_locations() {
        let storage = MemoryStorage::default();
        let first = storage.upload_image(Bytes::from_static(b"a"), "image/png").await.unwrap();
        let second = storage.upload_image(Bytes::from_static(b"b"), "image/png").await.unwrap();

        assert_ne!(first.key, second.key);
        assert_eq!(first.location, format!("http://localhost:4566/{}", first.key));
        assert!(Uuid::parse_str(&first.key).is_ok());
        assert_eq!(storage.content_type(&first.key).as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn delete_all_reports_whether_anything_was_removed() {
        let storage = MemoryStorage::default();
        assert!(!storage.delete_all_images().await.unwrap());

        storage.upload_image(Bytes::from_static(b"a"), "image/jpeg").await.unwrap();
        assert!(storage.delete_all_images().await.unwrap());
        assert!(storage.keys().is_empty());
        assert_eq!(storage.deleted_keys().len(), 1);
    }

    #[tokio::test]
    async fn upload_budget_turns_into_internal_error() {
        let storage = MemoryStorage::default();
        storage.fail_uploads_after(1);
        assert!(storage.upload_image(Bytes::new(), "image/webp").await.is_ok());

        let err = storage.upload_image(Bytes::new(), "image/webp").await.unwrap_err();
        assert_eq!(err.to_string(), msg::UPLOAD_ERROR);
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn signed_url_carries_expiry() {
        let storage = MemoryStorage::new("http://minio:9000/pictures/", 120);
        let url = storage.image_url("abc").await.unwrap();
        assert_eq!(url, "http://minio:9000/pictures/abc?expires=120");
    }
}
