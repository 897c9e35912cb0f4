use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    errors::ServiceError,
    models::{
        BucketSummary, EmptyBucketReport, FailedPublish, ObjectSummary, PublishBatchReport,
        PublishEntry, PublishedEntry, QueueDetails, QueueSummary, ReceivedMessage, SentMessage,
        SubscriptionInfo, TopicSummary,
    },
};

// Requests

/// DTO for creating a bucket
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketDto {
    pub bucket_name: Option<String>,
}

/// DTO for creating a queue
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueDto {
    pub queue_name: Option<String>,
}

/// DTO for sending a message to a queue
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    pub message_body: Option<String>,
    pub delay_seconds: Option<i32>,
}

/// DTO for acknowledging a received message
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageDto {
    pub receipt_handle: Option<String>,
}

/// DTO for creating a topic
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicDto {
    pub topic_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubscriptionDto {
    pub email: Option<String>,
}

/// DTO for wiring a queue to a topic
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsSubscriptionDto {
    pub queue_name: Option<String>,
    #[serde(default)]
    pub raw_message_delivery: Option<bool>,
}

/// DTO for publishing a single message
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishDto {
    pub message: Option<String>,
    pub subject: Option<String>,
}

/// One entry of a batch publish; `id` defaults to the entry's position
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBatchEntryDto {
    pub id: Option<String>,
    pub message: String,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBatchDto {
    #[serde(default)]
    pub messages: Vec<PublishBatchEntryDto>,
}

impl PublishBatchDto {
    /// Convert to domain entries, numbering entries without an id "0", "1", ...
    ///
    /// Generated ids skip any id a caller supplied explicitly.
    pub fn into_entries(self) -> Vec<PublishEntry> {
        let taken: HashSet<String> = self
            .messages
            .iter()
            .filter_map(|entry| entry.id.clone())
            .collect();
        let mut counter = 0usize;
        let mut entries = Vec::with_capacity(self.messages.len());

        for entry in self.messages {
            let id = match entry.id {
                Some(id) => id,
                None => loop {
                    let candidate = counter.to_string();
                    counter += 1;
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                },
            };
            entries.push(PublishEntry {
                id,
                message: entry.message,
                subject: entry.subject,
            });
        }

        entries
    }
}

// Query parameters

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBucketQuery {
    #[serde(default)]
    pub force: bool,
}

/// Receive parameters; clamped by the queue service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessagesQuery {
    pub max_messages: Option<i32>,
    pub wait_time_seconds: Option<i32>,
    pub visibility_timeout: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeQuery {
    pub subscription_arn: Option<String>,
}

// Responses

/// DTO for health responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub service: String,
    pub message: String,
}

impl HealthDto {
    pub fn up(service: &str) -> Self {
        Self {
            status: "UP".to_string(),
            service: service.to_string(),
            message: format!("{service} service is reachable"),
        }
    }

    pub fn down(service: &str, error: &ServiceError) -> Self {
        Self {
            status: "DOWN".to_string(),
            service: service.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDto {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<BucketSummary> for BucketDto {
    fn from(bucket: BucketSummary) -> Self {
        Self {
            name: bucket.name,
            created_at: bucket.created_at.map(DateTime::<Utc>::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketListDto {
    pub buckets: Vec<BucketDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketExistsDto {
    pub name: String,
    pub exists: bool,
}

/// Result of an ensure-exists call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureResponseDto {
    pub name: String,
    pub created: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl From<ObjectSummary> for FileDto {
    fn from(object: ObjectSummary) -> Self {
        Self {
            key: object.key.as_str().to_string(),
            size: object.size,
            last_modified: object.last_modified.map(DateTime::<Utc>::from),
            etag: object.etag,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListDto {
    pub bucket: String,
    pub files: Vec<FileDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponseDto {
    pub bucket: String,
    pub key: String,
    pub etag: Option<String>,
    pub size: u64,
}

/// Outcome of emptying a bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyBucketResponseDto {
    pub bucket: String,
    pub deleted_count: usize,
    pub failures: Vec<String>,
}

impl EmptyBucketResponseDto {
    pub fn new(bucket: &str, report: EmptyBucketReport) -> Self {
        Self {
            bucket: bucket.to_string(),
            deleted_count: report.deleted_count,
            failures: report.failures,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueDto {
    pub name: String,
    pub url: String,
}

impl From<QueueSummary> for QueueDto {
    fn from(queue: QueueSummary) -> Self {
        Self {
            name: queue.name,
            url: queue.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueListDto {
    pub queues: Vec<QueueDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDetailsDto {
    pub name: String,
    pub url: String,
    pub arn: Option<String>,
    pub approximate_message_count: Option<u64>,
    pub attributes: HashMap<String, String>,
}

impl From<QueueDetails> for QueueDetailsDto {
    fn from(details: QueueDetails) -> Self {
        Self {
            approximate_message_count: details.approximate_message_count(),
            name: details.name.as_str().to_string(),
            url: details.url,
            arn: details.arn,
            attributes: details.attributes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessageDto {
    pub message_id: String,
    pub md5_of_body: Option<String>,
}

impl From<SentMessage> for SentMessageDto {
    fn from(sent: SentMessage) -> Self {
        Self {
            message_id: sent.message_id,
            md5_of_body: sent.md5_of_body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
}

impl From<ReceivedMessage> for MessageDto {
    fn from(message: ReceivedMessage) -> Self {
        Self {
            message_id: message.message_id,
            receipt_handle: message.receipt_handle,
            body: message.body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListDto {
    pub messages: Vec<MessageDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDto {
    pub name: String,
    pub arn: String,
}

impl From<TopicSummary> for TopicDto {
    fn from(topic: TopicSummary) -> Self {
        Self {
            name: topic.name,
            arn: topic.arn,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicListDto {
    pub topics: Vec<TopicDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub subscription_arn: String,
    pub protocol: String,
    pub endpoint: String,
    pub topic_arn: String,
}

impl From<SubscriptionInfo> for SubscriptionDto {
    fn from(subscription: SubscriptionInfo) -> Self {
        Self {
            subscription_arn: subscription.subscription_arn,
            protocol: subscription.protocol,
            endpoint: subscription.endpoint,
            topic_arn: subscription.topic_arn,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionListDto {
    pub topic: String,
    pub subscriptions: Vec<SubscriptionDto>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCreatedDto {
    pub topic: String,
    pub protocol: String,
    pub endpoint: String,
    pub subscription_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponseDto {
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntryDto {
    pub id: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPublishDto {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    pub sender_fault: bool,
}

/// Per-entry outcome of a batch publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishBatchResponseDto {
    pub successful: Vec<PublishedEntryDto>,
    pub failed: Vec<FailedPublishDto>,
}

impl From<PublishBatchReport> for PublishBatchResponseDto {
    fn from(report: PublishBatchReport) -> Self {
        Self {
            successful: report
                .successful
                .into_iter()
                .map(|PublishedEntry { id, message_id }| PublishedEntryDto { id, message_id })
                .collect(),
            failed: report
                .failed
                .into_iter()
                .map(
                    |FailedPublish {
                         id,
                         code,
                         message,
                         sender_fault,
                     }| FailedPublishDto {
                        id,
                        code,
                        message,
                        sender_fault,
                    },
                )
                .collect(),
        }
    }
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponseDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponseDto {
    pub fn from_service_error(error: ServiceError) -> Self {
        let mut details = HashMap::new();

        let code = match &error {
            ServiceError::Validation(_) => "BadRequest",
            ServiceError::NotFound { kind, name } => {
                details.insert("resource".to_string(), kind.as_str().into());
                details.insert("name".to_string(), name.as_str().into());
                "NotFound"
            }
            ServiceError::AlreadyExists { kind, name } => {
                details.insert("resource".to_string(), kind.as_str().into());
                details.insert("name".to_string(), name.as_str().into());
                "Conflict"
            }
            ServiceError::Conflict { kind, name, reason } => {
                details.insert("resource".to_string(), kind.as_str().into());
                details.insert("name".to_string(), name.as_str().into());
                details.insert("reason".to_string(), reason.as_str().into());
                "Conflict"
            }
            ServiceError::Remote { .. } => "InternalServerError",
        };

        ErrorResponseDto {
            error: code.to_string(),
            message: error.to_string(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        ErrorResponseDto {
            error: "BadRequest".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_data(message: &str, data: serde_json::Value) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ResourceKind;
    use serde_json::json;

    #[test]
    fn test_batch_entries_get_sequential_ids() {
        let dto: PublishBatchDto = serde_json::from_value(json!({
            "messages": [
                {"message": "first"},
                {"id": "custom", "message": "second", "subject": "s"},
                {"message": "third"}
            ]
        }))
        .unwrap();

        let ids: Vec<String> = dto.into_entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["0", "custom", "1"]);
    }

    #[test]
    fn test_generated_ids_skip_explicit_ones() {
        let dto: PublishBatchDto = serde_json::from_value(json!({
            "messages": [
                {"id": "1", "message": "named"},
                {"message": "unnamed"},
                {"id": "0", "message": "also named"},
                {"message": "unnamed again"}
            ]
        }))
        .unwrap();

        let ids: Vec<String> = dto.into_entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "0", "3"]);
    }

    #[test]
    fn test_camel_case_request_fields() {
        let dto: SendMessageDto =
            serde_json::from_value(json!({"messageBody": "hi", "delaySeconds": 5})).unwrap();
        assert_eq!(dto.message_body.as_deref(), Some("hi"));
        assert_eq!(dto.delay_seconds, Some(5));

        let query: ReceiveMessagesQuery =
            serde_json::from_value(json!({"maxMessages": 3})).unwrap();
        assert_eq!(query.max_messages, Some(3));
    }

    #[test]
    fn test_error_body_shape() {
        let dto =
            ErrorResponseDto::from_service_error(ServiceError::not_found(ResourceKind::Queue, "q"));
        let body = serde_json::to_value(&dto).unwrap();

        assert_eq!(body["error"], "NotFound");
        assert_eq!(body["message"], "Queue not found: q");
        assert_eq!(body["details"]["resource"], "Queue");
        assert!(body.get("timestamp").is_some());
    }

    #[test]
    fn test_empty_bucket_response_is_camel_case() {
        let dto = EmptyBucketResponseDto::new(
            "bucket",
            EmptyBucketReport {
                deleted_count: 3,
                failures: vec![],
            },
        );
        let body = serde_json::to_value(&dto).unwrap();
        assert_eq!(body["deletedCount"], 3);
    }
}
