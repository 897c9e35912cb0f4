use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
};

use super::dto::ErrorResponseDto;
use crate::domain::errors::{ServiceError, ValidationError};

/// Error half of every handler result
pub type HandlerError = (StatusCode, Json<ErrorResponseDto>);

/// Convert domain ServiceError to HTTP status codes for API responses
impl From<ServiceError> for StatusCode {
    fn from(err: ServiceError) -> Self {
        StatusCode::from(&err)
    }
}

impl From<&ServiceError> for StatusCode {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::AlreadyExists { .. } | ServiceError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            ServiceError::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn service_error(err: ServiceError) -> HandlerError {
    (StatusCode::from(&err), Json(ErrorResponseDto::from_service_error(err)))
}

pub fn validation_error(err: ValidationError) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(&err.to_string())),
    )
}

/// Malformed or mistyped JSON bodies are client errors like any other validation failure
pub fn json_rejection(rejection: JsonRejection) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(&rejection.body_text())),
    )
}

pub fn query_rejection(rejection: QueryRejection) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponseDto::bad_request(&rejection.body_text())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ResourceKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StatusCode::from(ServiceError::not_found(ResourceKind::Bucket, "b")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StatusCode::from(ServiceError::conflict(ResourceKind::Queue, "q", "busy")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            StatusCode::from(ServiceError::from(ValidationError::MissingField("x"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(ServiceError::remote("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
