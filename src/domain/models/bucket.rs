use std::time::SystemTime;

/// A bucket as reported by the object-storage service
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSummary {
    pub name: String,
    pub created_at: Option<SystemTime>,
}

/// Result of emptying a bucket
///
/// `deleted_count` is summed over every listing page. Keys the service refused
/// are reported as `"key: message"` strings and do not fail the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyBucketReport {
    pub deleted_count: usize,
    pub failures: Vec<String>,
}

impl EmptyBucketReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
