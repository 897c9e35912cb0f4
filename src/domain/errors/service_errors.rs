use std::fmt;

use thiserror::Error;

use super::ValidationError;

/// Kind of remote resource an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    Object,
    Queue,
    Message,
    Topic,
    Subscription,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "Bucket",
            ResourceKind::Object => "File",
            ResourceKind::Queue => "Queue",
            ResourceKind::Message => "Message",
            ResourceKind::Topic => "Topic",
            ResourceKind::Subscription => "Subscription",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the storage, queue and topic services
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Request rejected locally before contacting the remote service
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The remote service reports the resource as absent
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    /// The resource already exists and the operation is not idempotent
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: ResourceKind, name: String },

    /// The remote service refused the operation because of the resource's state
    #[error("{kind} '{name}' conflict: {reason}")]
    Conflict {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    /// Any other remote or SDK failure
    #[error("Remote service error: {message}")]
    Remote { message: String },
}

impl ServiceError {
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        ServiceError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn conflict(kind: ResourceKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::Conflict {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        ServiceError::Remote {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ServiceError::AlreadyExists { .. })
    }
}

/// Result type for service and client operations
pub type ServiceResult<T> = Result<T, ServiceError>;
