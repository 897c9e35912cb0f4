use crate::domain::{
    errors::ServiceResult,
    models::{EnsureOutcome, PublishBatchReport, PublishEntry, SubscriptionInfo, TopicSummary},
    value_objects::{EmailAddress, QueueName, TopicName},
};
use async_trait::async_trait;

/// Service port for topics, subscriptions and publishing
///
/// Topics are addressed by name and resolved to ARNs on every call.
#[async_trait]
pub trait TopicService: Send + Sync + 'static {
    /// Verify the pub/sub service is reachable
    async fn health_check(&self) -> ServiceResult<()>;

    /// List all topics
    async fn list_topics(&self) -> ServiceResult<Vec<TopicSummary>>;

    /// Create the topic unless it already exists
    async fn ensure_topic_exists(
        &self,
        name: &TopicName,
    ) -> ServiceResult<EnsureOutcome<TopicSummary>>;

    /// Resolve a topic by name
    async fn get_topic(&self, name: &TopicName) -> ServiceResult<TopicSummary>;

    /// Delete a topic
    async fn delete_topic(&self, name: &TopicName) -> ServiceResult<()>;

    /// List a topic's subscriptions
    async fn list_subscriptions(&self, name: &TopicName) -> ServiceResult<Vec<SubscriptionInfo>>;

    /// Subscribe an email endpoint, returning the subscription ARN
    async fn subscribe_email(
        &self,
        name: &TopicName,
        email: &EmailAddress,
    ) -> ServiceResult<String>;

    /// Wire a queue to receive everything published to the topic
    async fn subscribe_queue(
        &self,
        name: &TopicName,
        queue: &QueueName,
        raw_message_delivery: bool,
    ) -> ServiceResult<String>;

    /// Remove a subscription from a topic
    async fn unsubscribe(&self, name: &TopicName, subscription_arn: &str) -> ServiceResult<()>;

    /// Publish a message, returning its message id
    async fn publish(
        &self,
        name: &TopicName,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<String>;

    /// Publish between one and ten messages
    async fn publish_batch(
        &self,
        name: &TopicName,
        entries: Vec<PublishEntry>,
    ) -> ServiceResult<PublishBatchReport>;
}
