use crate::domain::{
    errors::ServiceResult,
    models::{
        EnsureOutcome, QueueDetails, QueueSummary, ReceiveOptions, ReceivedMessage,
        SendMessageRequest, SentMessage,
    },
    value_objects::QueueName,
};
use async_trait::async_trait;

/// Service port for queue and message lifecycle operations
#[async_trait]
pub trait QueueService: Send + Sync + 'static {
    /// Verify the queue service is reachable
    async fn health_check(&self) -> ServiceResult<()>;

    /// List all queues
    async fn list_queues(&self) -> ServiceResult<Vec<QueueSummary>>;

    /// Create the queue unless it already exists
    async fn create_queue(&self, name: &QueueName) -> ServiceResult<EnsureOutcome<QueueSummary>>;

    /// Get a queue with its attributes
    async fn get_queue(&self, name: &QueueName) -> ServiceResult<QueueDetails>;

    /// Delete a queue
    async fn delete_queue(&self, name: &QueueName) -> ServiceResult<()>;

    /// Send a message
    async fn send_message(
        &self,
        name: &QueueName,
        request: SendMessageRequest,
    ) -> ServiceResult<SentMessage>;

    /// Receive messages
    async fn receive_messages(
        &self,
        name: &QueueName,
        options: ReceiveOptions,
    ) -> ServiceResult<Vec<ReceivedMessage>>;

    /// Delete a received message by its receipt handle
    async fn delete_message(&self, name: &QueueName, receipt_handle: &str) -> ServiceResult<()>;

    /// Purge all messages
    async fn purge_queue(&self, name: &QueueName) -> ServiceResult<()>;
}
