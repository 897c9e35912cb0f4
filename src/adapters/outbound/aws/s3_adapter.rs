use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    Client,
    primitives::{ByteStream, DateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier},
};
use std::time::SystemTime;
use tracing::debug;

use super::error::{build_error, classify, error_code, remote_error};
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

/// Region whose buckets must be created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// ObjectStorageClient backed by aws-sdk-s3
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
    region: String,
}

impl S3Adapter {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig, force_path_style: bool) -> Self {
        let config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(force_path_style)
            .build();
        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self::new(Client::from_conf(config), region)
    }

    fn to_system_time(date: Option<&DateTime>) -> Option<SystemTime> {
        date.and_then(|d| SystemTime::try_from(*d).ok())
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        (self.region != DEFAULT_REGION).then(|| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build()
        })
    }
}

#[async_trait]
impl ObjectStorageClient for S3Adapter {
    async fn list_buckets(&self) -> ServiceResult<Vec<BucketSummary>> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| remote_error("ListBuckets", e))?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|bucket| {
                Some(BucketSummary {
                    name: bucket.name()?.to_string(),
                    created_at: Self::to_system_time(bucket.creation_date()),
                })
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &BucketName) -> ServiceResult<()> {
        let result = self
            .client
            .create_bucket()
            .bucket(bucket.as_str())
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let exists = e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                });
                if exists {
                    return Err(ServiceError::AlreadyExists {
                        kind: ResourceKind::Bucket,
                        name: bucket.as_str().to_string(),
                    });
                }
                Err(remote_error("CreateBucket", e))
            }
        }
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ServiceResult<()> {
        let result = self.client.delete_bucket().bucket(bucket.as_str()).send().await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if error_code(&e) == Some("BucketNotEmpty") => Err(ServiceError::conflict(
                ResourceKind::Bucket,
                bucket.as_str(),
                "The bucket you tried to delete is not empty",
            )),
            Err(e) => Err(classify("DeleteBucket", ResourceKind::Bucket, bucket.as_str(), e)),
        }
    }

    async fn bucket_exists(&self, bucket: &BucketName) -> ServiceResult<bool> {
        match self.client.head_bucket().bucket(bucket.as_str()).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let missing = e.as_service_error().is_some_and(|se| se.is_not_found())
                    || error_code(&e) == Some("NoSuchBucket");
                if missing {
                    Ok(false)
                } else {
                    Err(remote_error("HeadBucket", e))
                }
            }
        }
    }

    async fn list_objects_page(
        &self,
        bucket: &BucketName,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> ServiceResult<ObjectPage> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket.as_str())
            .set_prefix(prefix.map(str::to_string))
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_bucket()) {
                    ServiceError::not_found(ResourceKind::Bucket, bucket.as_str())
                } else {
                    classify("ListObjectsV2", ResourceKind::Bucket, bucket.as_str(), e)
                }
            })?;

        let objects: Vec<ObjectSummary> = response
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: ObjectKey::new(object.key()?.to_string()).ok()?,
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: Self::to_system_time(object.last_modified()),
                    etag: object.e_tag().map(str::to_string),
                })
            })
            .collect();

        let next_continuation_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        debug!(
            bucket = %bucket,
            count = objects.len(),
            more = next_continuation_token.is_some(),
            "listed page"
        );
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
        let size = request.data.len() as u64;

        let response = self
            .client
            .put_object()
            .bucket(bucket.as_str())
            .key(request.key.as_str())
            .body(ByteStream::from(request.data))
            .set_content_type(request.content_type)
            .send()
            .await
            .map_err(|e| classify("PutObject", ResourceKind::Bucket, bucket.as_str(), e))?;

        Ok(PutObjectResult {
            key: request.key,
            etag: response.e_tag().map(str::to_string),
            size,
        })
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> ServiceResult<StoredObject> {
        let response = self
            .client
            .get_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    ServiceError::not_found(ResourceKind::Object, key.as_str())
                } else if error_code(&e) == Some("NoSuchBucket") {
                    ServiceError::not_found(ResourceKind::Bucket, bucket.as_str())
                } else {
                    remote_error("GetObject", e)
                }
            })?;

        let content_type = response.content_type().map(str::to_string);
        let etag = response.e_tag().map(str::to_string);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| ServiceError::remote(format!("GetObject body read failed: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(StoredObject {
            key: key.clone(),
            data,
            content_type,
            etag,
        })
    }

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<bool> {
        let result = self
            .client
            .head_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            // HEAD carries no error body, so a missing bucket also reads as NotFound
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                if self.bucket_exists(bucket).await? {
                    Ok(false)
                } else {
                    Err(ServiceError::not_found(ResourceKind::Bucket, bucket.as_str()))
                }
            }
            Err(e) => Err(remote_error("HeadObject", e)),
        }
    }

    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey) -> ServiceResult<()> {
        self.client
            .delete_object()
            .bucket(bucket.as_str())
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify("DeleteObject", ResourceKind::Bucket, bucket.as_str(), e))?;
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        keys: Vec<String>,
    ) -> ServiceResult<BatchDeleteOutcome> {
        let identifiers = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| build_error("DeleteObjects", e))?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| build_error("DeleteObjects", e))?;

        let response = self
            .client
            .delete_objects()
            .bucket(bucket.as_str())
            .delete(delete)
            .send()
            .await
            .map_err(|e| classify("DeleteObjects", ResourceKind::Bucket, bucket.as_str(), e))?;

        Ok(BatchDeleteOutcome {
            deleted: response
                .deleted()
                .iter()
                .filter_map(|d| d.key().map(str::to_string))
                .collect(),
            failed: response
                .errors()
                .iter()
                .map(|e| FailedDeletion {
                    key: e.key().unwrap_or_default().to_string(),
                    message: e
                        .message()
                        .or(e.code())
                        .unwrap_or("unknown error")
                        .to_string(),
                })
                .collect(),
        })
    }
}
