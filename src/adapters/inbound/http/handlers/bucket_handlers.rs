use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::debug;

use crate::{
    adapters::inbound::http::{
        dto::{
            BucketDto, BucketExistsDto, BucketListDto, CreateBucketDto, DeleteBucketQuery,
            EmptyBucketResponseDto, EnsureResponseDto, ErrorResponseDto, FileDto, FileListDto,
            ListFilesQuery, SuccessResponseDto, UploadResponseDto,
        },
        error::{
            HandlerError, json_rejection, query_rejection, service_error, validation_error,
        },
        router::AppState,
    },
    domain::{
        errors::{ResourceKind, ServiceError, ValidationError},
        models::{EnsureOutcome, PutObjectRequest},
        value_objects::{BucketName, ObjectKey},
    },
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn bucket_name(name: String) -> Result<BucketName, HandlerError> {
    BucketName::new(name).map_err(validation_error)
}

fn object_key(key: String) -> Result<ObjectKey, HandlerError> {
    ObjectKey::new(key).map_err(validation_error)
}

/// Handle bucket listing
pub async fn list_buckets(
    State(app_state): State<AppState>,
) -> Result<Json<BucketListDto>, HandlerError> {
    let buckets: Vec<BucketDto> = app_state
        .storage_service
        .list_buckets()
        .await
        .map_err(service_error)?
        .into_iter()
        .map(BucketDto::from)
        .collect();

    Ok(Json(BucketListDto {
        count: buckets.len(),
        buckets,
    }))
}

/// Handle bucket creation; an existing bucket is reported with 200
pub async fn create_bucket(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateBucketDto>, JsonRejection>,
) -> Result<(StatusCode, Json<EnsureResponseDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = dto
        .bucket_name
        .ok_or_else(|| validation_error(ValidationError::MissingField("bucketName")))?;
    let bucket = bucket_name(name)?;

    let outcome = app_state
        .storage_service
        .ensure_bucket_exists(&bucket)
        .await
        .map_err(service_error)?;

    let (status, message) = match &outcome {
        EnsureOutcome::Created(_) => (StatusCode::CREATED, "Bucket created successfully"),
        EnsureOutcome::AlreadyExists(_) => (StatusCode::OK, "Bucket already exists"),
    };

    Ok((
        status,
        Json(EnsureResponseDto {
            name: bucket.as_str().to_string(),
            created: outcome.is_created(),
            message: message.to_string(),
            url: None,
            arn: None,
        }),
    ))
}

/// Handle bucket existence check
pub async fn get_bucket(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BucketExistsDto>, HandlerError> {
    let bucket = bucket_name(name)?;

    let exists = app_state
        .storage_service
        .bucket_exists(&bucket)
        .await
        .map_err(service_error)?;

    if !exists {
        return Err(service_error(ServiceError::not_found(
            ResourceKind::Bucket,
            bucket.as_str(),
        )));
    }

    Ok(Json(BucketExistsDto {
        name: bucket.as_str().to_string(),
        exists,
    }))
}

/// Handle bucket deletion, emptying it first with `?force=true`
pub async fn delete_bucket(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<DeleteBucketQuery>, QueryRejection>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let Query(query) = query.map_err(query_rejection)?;
    let bucket = bucket_name(name)?;

    let report = app_state
        .storage_service
        .delete_bucket(&bucket, query.force)
        .await
        .map_err(service_error)?;

    let response = match report {
        Some(report) => SuccessResponseDto::with_data(
            "Bucket emptied and deleted successfully",
            serde_json::to_value(EmptyBucketResponseDto::new(bucket.as_str(), report))
                .unwrap_or_default(),
        ),
        None => SuccessResponseDto::new("Bucket deleted successfully"),
    };

    Ok(Json(response))
}

/// Handle file listing across every page of the bucket
pub async fn list_files(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<ListFilesQuery>, QueryRejection>,
) -> Result<Json<FileListDto>, HandlerError> {
    let Query(query) = query.map_err(query_rejection)?;
    let bucket = bucket_name(name)?;

    let files: Vec<FileDto> = app_state
        .storage_service
        .list_files(&bucket, query.prefix.as_deref())
        .await
        .map_err(service_error)?
        .into_iter()
        .map(FileDto::from)
        .collect();

    Ok(Json(FileListDto {
        bucket: bucket.as_str().to_string(),
        count: files.len(),
        files,
    }))
}

/// Handle multipart upload of the `file` field
///
/// The object key is the uploaded file name.
pub async fn upload_file(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponseDto>), HandlerError> {
    let bucket = bucket_name(name)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponseDto::bad_request(&e.body_text())),
        )
    })? {
        if field.name() != Some("file") {
            debug!(field = ?field.name(), "ignoring multipart field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponseDto::bad_request(&e.body_text())),
            )
        })?;
        upload = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| validation_error(ValidationError::MissingField("file")))?;
    let key = object_key(
        file_name.ok_or_else(|| validation_error(ValidationError::MissingField("filename")))?,
    )?;

    store(&app_state, bucket, key, content_type, data).await
}

/// Handle raw-body upload to an explicit key
pub async fn put_file(
    State(app_state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponseDto>), HandlerError> {
    let bucket = bucket_name(name)?;
    let key = object_key(key)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(str::to_string);

    store(&app_state, bucket, key, content_type, body).await
}

async fn store(
    app_state: &AppState,
    bucket: BucketName,
    key: ObjectKey,
    content_type: Option<String>,
    data: Bytes,
) -> Result<(StatusCode, Json<UploadResponseDto>), HandlerError> {
    let result = app_state
        .storage_service
        .upload_file(
            &bucket,
            PutObjectRequest {
                key,
                data: data.to_vec(),
                content_type,
            },
        )
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponseDto {
            bucket: bucket.as_str().to_string(),
            key: result.key.as_str().to_string(),
            etag: result.etag,
            size: result.size,
        }),
    ))
}

/// Handle file download
pub async fn download_file(
    State(app_state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Response, HandlerError> {
    let bucket = bucket_name(name)?;
    let key = object_key(key)?;

    let object = app_state
        .storage_service
        .download_file(&bucket, &key)
        .await
        .map_err(service_error)?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let disposition = format!("attachment; filename=\"{}\"", object.key.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        object.data,
    )
        .into_response())
}

/// Handle single file deletion
pub async fn delete_file(
    State(app_state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let bucket = bucket_name(name)?;
    let key = object_key(key)?;

    app_state
        .storage_service
        .delete_file(&bucket, &key)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("File deleted successfully")))
}

/// Handle deletion of every file in a bucket
pub async fn delete_all_files(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<EmptyBucketResponseDto>, HandlerError> {
    let bucket = bucket_name(name)?;

    let report = app_state
        .storage_service
        .delete_all_files(&bucket)
        .await
        .map_err(service_error)?;

    Ok(Json(EmptyBucketResponseDto::new(bucket.as_str(), report)))
}
