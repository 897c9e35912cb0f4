use std::time::SystemTime;

use crate::domain::value_objects::ObjectKey;

/// Summary of an object returned by a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: ObjectKey,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
    pub etag: Option<String>,
}

/// One page of a continuation-token driven listing
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub next_continuation_token: Option<String>,
}

/// An object's content together with its metadata
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: ObjectKey,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// Request to store a new object
#[derive(Debug, Clone)]
pub struct PutObjectRequest {
    pub key: ObjectKey,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Result of storing an object
#[derive(Debug, Clone, PartialEq)]
pub struct PutObjectResult {
    pub key: ObjectKey,
    pub etag: Option<String>,
    pub size: u64,
}

/// A key that the batch delete refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDeletion {
    pub key: String,
    pub message: String,
}

impl std::fmt::Display for FailedDeletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Per-key outcome of a single batch delete call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDeletion>,
}
