use std::collections::HashMap;

use crate::domain::value_objects::QueueName;

/// Upper bound the queue service accepts for a single receive
pub const MAX_RECEIVE_MESSAGES: i32 = 10;
/// Upper bound for long polling
pub const MAX_WAIT_TIME_SECONDS: i32 = 20;
/// Upper bound for per-message delivery delay
pub const MAX_DELAY_SECONDS: i32 = 900;

/// A queue as reported by the queue service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSummary {
    pub name: String,
    pub url: String,
}

impl QueueSummary {
    /// Build a summary from a queue URL; the name is the last path segment
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { name, url }
    }
}

/// A queue with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDetails {
    pub name: QueueName,
    pub url: String,
    pub arn: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl QueueDetails {
    pub fn approximate_message_count(&self) -> Option<u64> {
        self.attributes
            .get("ApproximateNumberOfMessages")
            .and_then(|v| v.parse().ok())
    }
}

/// Request to send a message
#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub body: String,
    pub delay_seconds: Option<i32>,
}

/// Acknowledgement of a sent message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    pub md5_of_body: Option<String>,
}

/// A delivered message together with the handle required to delete it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
}

/// Normalized receive parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub max_messages: i32,
    pub wait_time_seconds: i32,
    pub visibility_timeout: Option<i32>,
}

impl ReceiveOptions {
    /// Clamp caller-supplied values into the range the queue service accepts
    pub fn clamped(
        max_messages: Option<i32>,
        wait_time_seconds: Option<i32>,
        visibility_timeout: Option<i32>,
    ) -> Self {
        Self {
            max_messages: max_messages
                .unwrap_or(MAX_RECEIVE_MESSAGES)
                .clamp(1, MAX_RECEIVE_MESSAGES),
            wait_time_seconds: wait_time_seconds
                .unwrap_or(0)
                .clamp(0, MAX_WAIT_TIME_SECONDS),
            visibility_timeout: visibility_timeout.map(|v| v.max(0)),
        }
    }
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self::clamped(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_options_clamping() {
        let opts = ReceiveOptions::clamped(Some(25), Some(60), Some(-3));
        assert_eq!(opts.max_messages, 10);
        assert_eq!(opts.wait_time_seconds, 20);
        assert_eq!(opts.visibility_timeout, Some(0));

        let opts = ReceiveOptions::clamped(Some(0), None, None);
        assert_eq!(opts.max_messages, 1);
        assert_eq!(opts.wait_time_seconds, 0);
        assert_eq!(opts.visibility_timeout, None);

        assert_eq!(ReceiveOptions::default().max_messages, 10);
        assert_eq!(ReceiveOptions::clamped(Some(4), None, None).max_messages, 4);
    }

    #[test]
    fn test_queue_summary_from_url() {
        let summary =
            QueueSummary::from_url("http://localhost:4566/000000000000/order-events");
        assert_eq!(summary.name, "order-events");
        assert_eq!(summary.url, "http://localhost:4566/000000000000/order-events");
    }
}
