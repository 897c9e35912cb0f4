use crate::domain::{
    errors::ServiceResult,
    models::{
        BatchDeleteOutcome, BucketSummary, ObjectPage, PutObjectRequest, PutObjectResult,
        StoredObject,
    },
    value_objects::{BucketName, ObjectKey},
};
use async_trait::async_trait;

/// Port for an S3-compatible object-storage service
///
/// Implementations translate their native failures into [`ServiceError`]:
/// a missing bucket or key becomes `NotFound`, an existing bucket on create
/// becomes `AlreadyExists`.
///
/// [`ServiceError`]: crate::domain::errors::ServiceError
#[async_trait]
pub trait ObjectStorageClient: Send + Sync + 'static {
    /// List all buckets visible to the caller
    async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>>;

    /// Create a bucket, failing with `AlreadyExists` if it is already there
    async fn create_bucket(&self, bucket: &BucketName) -> ServiceResult<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &BucketName) -> ServiceResult<()>;

    /// Check whether a bucket exists
    async fn bucket_exists(&self, bucket: &BucketName) -> ServiceResult<bool>;

    /// Fetch one page of a listing; pass the previous page's token to continue
    async fn list_objects_page(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> ServiceResult<ObjectPage>;

    /// Store object data
    async fn put_object(
        &self,
        bucket: &BucketName,
        request: PutObjectRequest,
    ) -> ServiceResult<PutObjectResult>;

    /// Retrieve object data
    async fn get_object(&self, bucket: &BucketName, key: &ObjectKey)
    -> ServiceResult<StoredObject>;

    /// Check whether an object exists, `NotFound` if the bucket itself is missing
    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<bool>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<()>;

    /// Delete up to [`MAX_BATCH_DELETE`](crate::services::MAX_BATCH_DELETE) keys in one call
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: Vec<String>,
    ) -> ServiceResult<BatchDeleteOutcome>;
}
