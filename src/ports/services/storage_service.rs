use crate::domain::{
    errors::ServiceResult,
    models::{
        BucketSummary, EmptyBucketReport, EnsureOutcome, ObjectSummary, PutObjectRequest,
        PutObjectResult, StoredObject,
    },
    value_objects::{BucketName, ObjectKey},
};
use async_trait::async_trait;

/// Service port for bucket and file operations
#[async_trait]
pub trait StorageService: Send + Sync + 'static {
    /// Verify the object-storage service is reachable
    async fn health_check(&self) -> ServiceResult<()>;

    /// List all buckets
    async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>>;

    /// Create the bucket unless it already exists
    async fn ensure_bucket_exists(
        &self,
        bucket: &BucketName,
    ) -> ServiceResult<EnsureOutcome<BucketName>>;

    /// Check whether a bucket exists
    async fn bucket_exists(&self, bucket: &BucketName) -> ServiceResult<bool>;

    /// Delete a bucket; with `force` the bucket is emptied first and the
    /// emptying report is returned
    async fn delete_bucket(
        &self,
        bucket: &BucketName,
        force: bool,
    ) -> ServiceResult<Option<EmptyBucketReport>>;

    /// List every file in a bucket, following continuation tokens
    async fn list_files(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
    ) -> ServiceResult<Vec<ObjectSummary>>;

    /// Upload a file
    async fn upload_file(
        &self,
        bucket: &BucketName,
        request: PutObjectRequest,
    ) -> ServiceResult<PutObjectResult>;

    /// Download a file
    async fn download_file(&self, bucket: &BucketName, key: &ObjectKey)
    -> ServiceResult<StoredObject>;

    /// Delete a file, `NotFound` if it does not exist
    async fn delete_file(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<()>;

    /// Delete every file in a bucket
    async fn delete_all_files(&self, bucket: &BucketName) -> ServiceResult<EmptyBucketReport>;
}
