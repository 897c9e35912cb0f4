//! Translation of AWS SDK failures into [`ServiceError`]
//!
//! Adapters first check the modeled predicates of the operation's error type
//! (`is_no_such_key`, `is_queue_does_not_exist`, ...). Errors the SDK does not
//! model for an operation are classified by their error code.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use tracing::error;

use crate::domain::errors::{ResourceKind, ServiceError};

/// Error codes meaning the addressed resource does not exist
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchBucket",
    "NoSuchKey",
    "NotFound",
    "NotFoundException",
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
];

/// Error code reported by the SDK, if the service sent one
pub(crate) fn error_code<E: ProvideErrorMetadata>(err: &E) -> Option<&str> {
    err.code()
}

/// Whether `err` carries one of the well-known not-found codes
pub(crate) fn is_not_found_code<E: ProvideErrorMetadata>(err: &E) -> bool {
    error_code(err).is_some_and(|code| NOT_FOUND_CODES.contains(&code))
}

/// Classify `err` as `NotFound` for `kind`/`name` when possible, `Remote` otherwise
pub(crate) fn classify<E>(operation: &str, kind: ResourceKind, name: &str, err: E) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    if is_not_found_code(&err) {
        return ServiceError::not_found(kind, name);
    }
    remote_error(operation, err)
}

/// Wrap any SDK failure as `ServiceError::Remote`, keeping code and message
pub(crate) fn remote_error<E>(operation: &str, err: E) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let detail = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => DisplayErrorContext(&err).to_string(),
    };

    error!(operation, "{}", detail);
    ServiceError::remote(format!("{operation} failed: {detail}"))
}

/// Wrap a request-builder failure, which only happens on missing required fields
pub(crate) fn build_error(operation: &str, err: impl std::fmt::Display) -> ServiceError {
    ServiceError::remote(format!("{operation} request could not be built: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;

    #[derive(Debug)]
    struct FakeError(ErrorMetadata);

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake")
        }
    }

    impl std::error::Error for FakeError {}

    impl ProvideErrorMetadata for FakeError {
        fn meta(&self) -> &ErrorMetadata {
            &self.0
        }
    }

    fn fake(code: &str, message: &str) -> FakeError {
        FakeError(ErrorMetadata::builder().code(code).message(message).build())
    }

    #[test]
    fn test_not_found_codes_are_classified() {
        let err = classify(
            "GetQueueUrl",
            ResourceKind::Queue,
            "jobs",
            fake("AWS.SimpleQueueService.NonExistentQueue", "gone"),
        );
        assert_eq!(err, ServiceError::not_found(ResourceKind::Queue, "jobs"));
    }

    #[test]
    fn test_other_codes_become_remote() {
        let err = classify(
            "ListObjectsV2",
            ResourceKind::Bucket,
            "b",
            fake("AccessDenied", "Access Denied"),
        );
        assert_eq!(
            err,
            ServiceError::remote("ListObjectsV2 failed: AccessDenied: Access Denied")
        );
    }
}
