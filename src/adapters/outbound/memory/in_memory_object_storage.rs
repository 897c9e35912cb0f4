use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::SystemTime;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult},
        models::{
            BatchDeleteOutcome, BucketSummary, FailedDeletion, ObjectPage, ObjectSummary,
            PutObjectRequest, PutObjectResult, StoredObject,
        },
        value_objects::{BucketName, ObjectKey},
    },
    ports::storage::ObjectStorageClient,
};

/// Listing page size used by S3
const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory implementation of ObjectStorageClient for testing and development
///
/// Listing is continuation-token driven like S3: the token is the last key of
/// the previous page.
#[derive(Clone)]
pub struct InMemoryObjectStorage {
    data: Arc<RwLock<StorageData>>,
    page_size: usize,
    batch_delete_calls: Arc<AtomicUsize>,
}

#[derive(Default)]
struct StorageData {
    buckets: BTreeMap<String, StoredBucket>,
}

struct StoredBucket {
    created_at: SystemTime,
    objects: BTreeMap<String, StoredEntry>,
    // Keys whose deletion is refused, to exercise partial failures
    protected: HashSet<String>,
}

#[derive(Clone)]
struct StoredEntry {
    data: Vec<u8>,
    content_type: Option<String>,
    etag: String,
    last_modified: SystemTime,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a store whose listings return at most `page_size` objects per page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: Arc::new(RwLock::new(StorageData::default())),
            page_size: page_size.max(1),
            batch_delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of batch delete calls received so far
    pub fn batch_delete_calls(&self) -> usize {
        self.batch_delete_calls.load(Ordering::SeqCst)
    }

    /// Make batch deletes of `key` in `bucket` fail with "Access Denied"
    pub async fn deny_delete(&self, bucket: &BucketName, key: &str) {
        let mut data = self.data.write().await;
        if let Some(stored) = data.buckets.get_mut(bucket.as_str()) {
            stored.protected.insert(key.to_string());
        }
    }

    fn bucket_not_found(bucket: &BucketName) -> ServiceError {
        ServiceError::not_found(ResourceKind::Bucket, bucket.as_str())
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorageClient for InMemoryObjectStorage {
    async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>> {
        let data = self.data.read().await;

        Ok(data
            .buckets
            .iter()
            .map(|(name, stored)| BucketSummary {
                name: name.clone(),
                created_at: Some(stored.created_at),
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &BucketName) -> ServiceResult<()> {
        let mut data = self.data.write().await;

        if data.buckets.contains_key(bucket.as_str()) {
            return Err(ServiceError::AlreadyExists {
                kind: ResourceKind::Bucket,
                name: bucket.as_str().to_string(),
            });
        }

        data.buckets.insert(
            bucket.as_str().to_string(),
            StoredBucket {
                created_at: SystemTime::now(),
                objects: BTreeMap::new(),
                protected: HashSet::new(),
            },
        );
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ServiceResult<()> {
        let mut data = self.data.write().await;

        let stored = data
            .buckets
            .get(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        if !stored.objects.is_empty() {
            return Err(ServiceError::conflict(
                ResourceKind::Bucket,
                bucket.as_str(),
                "The bucket you tried to delete is not empty",
            ));
        }

        data.buckets.remove(bucket.as_str());
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &BucketName) -> ServiceResult<bool> {
        Ok(self.data.read().await.buckets.contains_key(bucket.as_str()))
    }

    async fn list_objects_page(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> ServiceResult<ObjectPage> {
        let data = self.data.read().await;
        let stored = data
            .buckets
            .get(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        let mut matching = stored
            .objects
            .iter()
            .filter(|(key, _)| {
                continuation_token
                    .as_deref()
                    .map_or(true, |t| key.as_str() > t)
            })
            .filter(|(key, _)| prefix.map_or(true, |p| key.starts_with(p)));

        let objects: Vec<ObjectSummary> = matching
            .by_ref()
            .take(self.page_size)
            .filter_map(|(key, entry)| {
                Some(ObjectSummary {
                    key: ObjectKey::new(key.clone()).ok()?,
                    size: entry.data.len() as u64,
                    last_modified: Some(entry.last_modified),
                    etag: Some(entry.etag.clone()),
                })
            })
            .collect();

        let next_continuation_token = match (matching.next(), objects.last()) {
            (Some(_), Some(last)) => Some(last.key.as_str().to_string()),
            _ => None,
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    async fn put_object(
        &self,
        bucket: &BucketName,
        request: PutObjectRequest,
    ) -> ServiceResult<PutObjectResult> {
        let mut data = self.data.write().await;
        let stored = data
            .buckets
            .get_mut(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        let etag = format!("\"{:x}\"", md5::compute(&request.data));
        let size = request.data.len() as u64;

        stored.objects.insert(
            request.key.as_str().to_string(),
            StoredEntry {
                data: request.data,
                content_type: request.content_type,
                etag: etag.clone(),
                last_modified: SystemTime::now(),
            },
        );

        Ok(PutObjectResult {
            key: request.key,
            etag: Some(etag),
            size,
        })
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> ServiceResult<StoredObject> {
        let data = self.data.read().await;
        let stored = data
            .buckets
            .get(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        let entry = stored
            .objects
            .get(key.as_str())
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Object, key.as_str()))?;

        Ok(StoredObject {
            key: key.clone(),
            data: entry.data.clone(),
            content_type: entry.content_type.clone(),
            etag: Some(entry.etag.clone()),
        })
    }

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<bool> {
        let data = self.data.read().await;
        let stored = data
            .buckets
            .get(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        Ok(stored.objects.contains_key(key.as_str()))
    }

    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let stored = data
            .buckets
            .get_mut(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        stored.objects.remove(key.as_str());
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: Vec<String>,
    ) -> ServiceResult<BatchDeleteOutcome> {
        self.batch_delete_calls.fetch_add(1, Ordering::SeqCst);

        let mut data = self.data.write().await;
        let stored = data
            .buckets
            .get_mut(bucket.as_str())
            .ok_or_else(|| Self::bucket_not_found(bucket))?;

        let mut outcome = BatchDeleteOutcome::default();
        for key in keys {
            if stored.protected.contains(&key) {
                outcome.failed.push(FailedDeletion {
                    key,
                    message: "Access Denied".to_string(),
                });
            } else {
                // Like S3, deleting an absent key is reported as deleted
                stored.objects.remove(&key);
                outcome.deleted.push(key);
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> BucketName {
        BucketName::new("memory-bucket".to_string()).unwrap()
    }

    fn put(key: &str) -> PutObjectRequest {
        PutObjectRequest {
            key: ObjectKey::new(key.to_string()).unwrap(),
            data: key.as_bytes().to_vec(),
            content_type: Some("text/plain".to_string()),
        }
    }

    #[tokio::test]
    async fn test_listing_pages_with_continuation_tokens() {
        let storage = InMemoryObjectStorage::with_page_size(2);
        storage.create_bucket(&bucket()).await.unwrap();
        for key in ["a", "b", "c", "d", "e"] {
            storage.put_object(&bucket(), put(key)).await.unwrap();
        }

        let first = storage.list_objects_page(&bucket(), None, None).await.unwrap();
        assert_eq!(first.objects.len(), 2);
        assert_eq!(first.next_continuation_token.as_deref(), Some("b"));

        let second = storage
            .list_objects_page(&bucket(), None, first.next_continuation_token)
            .await
            .unwrap();
        assert_eq!(second.objects[0].key.as_str(), "c");

        let last = storage
            .list_objects_page(&bucket(), None, second.next_continuation_token)
            .await
            .unwrap();
        assert_eq!(last.objects.len(), 1);
        assert!(last.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_exact_page_has_no_token() {
        let storage = InMemoryObjectStorage::with_page_size(2);
        storage.create_bucket(&bucket()).await.unwrap();
        storage.put_object(&bucket(), put("a")).await.unwrap();
        storage.put_object(&bucket(), put("b")).await.unwrap();

        let page = storage.list_objects_page(&bucket(), None, None).await.unwrap();

        assert_eq!(page.objects.len(), 2);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_prefix_filter() {
        let storage = InMemoryObjectStorage::new();
        storage.create_bucket(&bucket()).await.unwrap();
        storage.put_object(&bucket(), put("logs/1")).await.unwrap();
        storage.put_object(&bucket(), put("data/1")).await.unwrap();

        let page = storage
            .list_objects_page(&bucket(), Some("logs/"), None)
            .await
            .unwrap();

        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key.as_str(), "logs/1");
    }

    #[tokio::test]
    async fn test_create_existing_bucket_conflicts() {
        let storage = InMemoryObjectStorage::new();
        storage.create_bucket(&bucket()).await.unwrap();

        let err = storage.create_bucket(&bucket()).await.unwrap_err();

        assert!(err.is_already_exists());
    }
}
