use std::collections::HashMap;

use crate::domain::{
    errors::ServiceResult,
    models::{ReceiveOptions, ReceivedMessage, SendMessageRequest, SentMessage},
    value_objects::QueueName,
};
use async_trait::async_trait;

/// Port for an SQS-compatible queue service
///
/// Queues are addressed by URL once resolved through [`QueueClient::get_queue_url`].
#[async_trait]
pub trait QueueClient: Send + Sync + 'static {
    /// List the URLs of all queues
    async fn list_queues(&self) -> ServiceResult<Vec<String>>;

    /// Create a queue and return its URL, failing with `AlreadyExists` if it is already there
    async fn create_queue(&self, name: &QueueName) -> ServiceResult<String>;

    /// Resolve a queue name to its URL, `NotFound` if absent
    async fn get_queue_url(&self, name: &QueueName) -> ServiceResult<String>;

    /// Delete a queue
    async fn delete_queue(&self, queue_url: &str) -> ServiceResult<()>;

    /// Read all attributes of a queue (including `QueueArn`)
    async fn get_queue_attributes(&self, queue_url: &str)
    -> ServiceResult<HashMap<String, String>>;

    /// Replace the queue's access policy document
    async fn set_queue_policy(&self, queue_url: &str, policy: &str) -> ServiceResult<()>;

    /// Send one message
    async fn send_message(
        &self,
        queue_url: &str,
        request: SendMessageRequest,
    ) -> ServiceResult<SentMessage>;

    /// Receive up to `options.max_messages` messages
    async fn receive_messages(
        &self,
        queue_url: &str,
        options: ReceiveOptions,
    ) -> ServiceResult<Vec<ReceivedMessage>>;

    /// Acknowledge a delivery
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ServiceResult<()>;

    /// Drop every message in the queue
    async fn purge_queue(&self, queue_url: &str) -> ServiceResult<()>;
}
