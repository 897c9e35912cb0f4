use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult},
        models::{
            BucketSummary, EmptyBucketReport, EnsureOutcome, ObjectSummary, PutObjectRequest,
            PutObjectResult, StoredObject,
        },
        value_objects::{BucketName, ObjectKey},
    },
    ports::{services::StorageService, storage::ObjectStorageClient},
};

/// Largest number of keys the object-storage service accepts in one batch delete
pub const MAX_BATCH_DELETE: usize = 1000;

/// Implementation of StorageService on top of an object-storage client
#[derive(Clone)]
pub struct StorageServiceImpl {
    client: Arc<dyn ObjectStorageClient>,
}

impl StorageServiceImpl {
    /// Create a new StorageServiceImpl instance
    pub fn new(client: Arc<dyn ObjectStorageClient>) -> Self {
        Self { client }
    }

    /// Issue one batch delete per chunk of `keys` and fold the outcomes into `report`
    async fn delete_keys(
        &self,
        bucket: &BucketName,
        keys: Vec<String>,
        report: &mut EmptyBucketReport,
    ) -> ServiceResult<()> {
        for chunk in keys.chunks(MAX_BATCH_DELETE) {
            let outcome = self.client.delete_objects(bucket, chunk.to_vec()).await?;

            report.deleted_count += outcome.deleted.len();
            for failure in outcome.failed {
                warn!(bucket = %bucket, key = %failure.key, "file could not be deleted: {}", failure.message);
                report.failures.push(failure.to_string());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for StorageServiceImpl {
    async fn health_check(&self) -> ServiceResult<()> {
        self.client.list_buckets().await.map(|_| ())
    }

    async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>> {
        self.client.list_buckets().await
    }

    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn ensure_bucket_exists(
        &self,
        bucket: &BucketName,
    ) -> ServiceResult<EnsureOutcome<BucketName>> {
        // Attempt the create and treat a conflict as success; no check-then-act
        match self.client.create_bucket(bucket).await {
            Ok(()) => {
                info!("bucket created");
                Ok(EnsureOutcome::Created(bucket.clone()))
            }
            Err(ServiceError::AlreadyExists { .. }) => {
                debug!("bucket already exists");
                Ok(EnsureOutcome::AlreadyExists(bucket.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn bucket_exists(&self, bucket: &BucketName) -> ServiceResult<bool> {
        self.client.bucket_exists(bucket).await
    }

    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn delete_bucket(
        &self,
        bucket: &BucketName,
        force: bool,
    ) -> ServiceResult<Option<EmptyBucketReport>> {
        let report = if force {
            Some(self.delete_all_files(bucket).await?)
        } else {
            None
        };

        self.client.delete_bucket(bucket).await?;
        info!("bucket deleted");

        Ok(report)
    }

    async fn list_files(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> ServiceResult<Vec<ObjectSummary>> {
        let mut files = Vec::new();
        let mut continuation_token = None;

        loop {
            let page = self
                .client
                .list_objects_page(bucket, prefix, continuation_token)
                .await?;
            files.extend(page.objects);

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        debug!(bucket = %bucket, count = files.len(), "listed files");
        Ok(files)
    }

    #[instrument(skip(self, request), fields(bucket = %bucket, key = %request.key))]
    async fn upload_file(
        &self,
        bucket: &BucketName,
        request: PutObjectRequest,
    ) -> ServiceResult<PutObjectResult> {
        let result = self.client.put_object(bucket, request).await?;
        info!(size = result.size, "file uploaded");
        Ok(result)
    }

    async fn download_file(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> ServiceResult<StoredObject> {
        self.client.get_object(bucket, key).await
    }

    #[instrument(skip(self), fields(bucket = %bucket, key = %key))]
    async fn delete_file(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<()> {
        // Deleting a missing key succeeds remotely, so look first to report 404
        if !self.client.object_exists(bucket, key).await? {
            return Err(ServiceError::not_found(ResourceKind::Object, key.as_str()));
        }

        self.client.delete_object(bucket, key).await?;
        info!("file deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %bucket))]
    async fn delete_all_files(&self, bucket: &BucketName) -> ServiceResult<EmptyBucketReport> {
        let mut report = EmptyBucketReport::default();

        let first = self.client.list_objects_page(bucket, None, None).await?;
        if first.objects.is_empty() && first.next_continuation_token.is_none() {
            debug!("bucket already empty");
            return Ok(report);
        }

        let mut page = first;
        loop {
            let keys: Vec<String> = page
                .objects
                .iter()
                .map(|o| o.key.as_str().to_string())
                .collect();

            if !keys.is_empty() {
                self.delete_keys(bucket, keys, &mut report).await?;
            }

            let Some(token) = page.next_continuation_token else {
                break;
            };
            page = self
                .client
                .list_objects_page(bucket, None, Some(token))
                .await?;
        }

        if report.is_complete() {
            info!(deleted = report.deleted_count, "bucket emptied");
        } else {
            warn!(
                deleted = report.deleted_count,
                failed = report.failures.len(),
                "bucket partially emptied"
            );
        }

        Ok(report)
    }
}
