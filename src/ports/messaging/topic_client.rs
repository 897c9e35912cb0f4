use crate::domain::{
    errors::ServiceResult,
    models::{PublishBatchReport, PublishEntry, SubscribeRequest, SubscriptionInfo, TopicPage},
    value_objects::TopicName,
};
use async_trait::async_trait;

/// Port for an SNS-compatible pub/sub service
///
/// The service is ARN-addressed; name lookups happen in the topic service.
#[async_trait]
pub trait TopicClient: Send + Sync + 'static {
    /// Fetch one page of topic ARNs
    async fn list_topics(&self, next_token: Option<String>) -> ServiceResult<TopicPage>;

    /// Create a topic and return its ARN, failing with `AlreadyExists` if it is already there
    async fn create_topic(&self, name: &TopicName) -> ServiceResult<String>;

    /// Delete a topic
    async fn delete_topic(&self, topic_arn: &str) -> ServiceResult<()>;

    /// Register a delivery endpoint, returning the subscription ARN
    async fn subscribe(&self, topic_arn: &str, request: SubscribeRequest) -> ServiceResult<String>;

    /// Remove a subscription
    async fn unsubscribe(&self, subscription_arn: &str) -> ServiceResult<()>;

    /// List every subscription of a topic
    async fn list_subscriptions(&self, topic_arn: &str) -> ServiceResult<Vec<SubscriptionInfo>>;

    /// Publish a single message, returning its message id
    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<String>;

    /// Publish up to ten messages in one call
    async fn publish_batch(
        &self,
        topic_arn: &str,
        entries: Vec<PublishEntry>,
    ) -> ServiceResult<PublishBatchReport>;
}
