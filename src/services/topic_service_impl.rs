use async_trait::async_trait;
use serde_json::json;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, instrument};

use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult, ValidationError},
        models::{
            EnsureOutcome, MAX_PUBLISH_BATCH, PublishBatchReport, PublishEntry, SubscribeRequest,
            SubscriptionInfo, SubscriptionProtocol, TopicSummary,
        },
        value_objects::{EmailAddress, QueueName, TopicName},
    },
    ports::{
        messaging::{QueueClient, TopicClient},
        services::TopicService,
    },
};

/// Implementation of TopicService on top of topic and queue clients
///
/// The queue client is only used to wire queue subscriptions.
#[derive(Clone)]
pub struct TopicServiceImpl {
    topics: Arc<dyn TopicClient>,
    queues: Arc<dyn QueueClient>,
}

impl TopicServiceImpl {
    pub fn new(topics: Arc<dyn TopicClient>, queues: Arc<dyn QueueClient>) -> Self {
        Self { topics, queues }
    }

    /// Find the ARN of the topic called `name`
    ///
    /// Walks every page of the topic listing and scans linearly for an ARN
    /// whose last segment equals the name. Nothing is cached, so the cost is
    /// O(number of topics) on every call.
    pub async fn resolve_topic_arn(&self, name: &TopicName) -> ServiceResult<String> {
        let mut next_token = None;

        loop {
            let page = self.topics.list_topics(next_token).await?;
            if let Some(arn) = page.arns.into_iter().find(|arn| name.matches_arn(arn)) {
                return Ok(arn);
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Err(ServiceError::not_found(ResourceKind::Topic, name.as_str()))
    }

    /// Access policy letting `topic_arn` deliver into the queue `queue_arn`
    fn queue_policy(queue_arn: &str, topic_arn: &str) -> String {
        json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Sid": "AllowTopicDelivery",
                "Effect": "Allow",
                "Principal": { "Service": "sns.amazonaws.com" },
                "Action": "sqs:SendMessage",
                "Resource": queue_arn,
                "Condition": { "ArnEquals": { "aws:SourceArn": topic_arn } }
            }]
        })
        .to_string()
    }

    fn validate_batch(entries: &[PublishEntry]) -> Result<(), ValidationError> {
        if entries.is_empty() || entries.len() > MAX_PUBLISH_BATCH {
            return Err(ValidationError::BatchSizeOutOfRange {
                actual: entries.len(),
                min: 1,
                max: MAX_PUBLISH_BATCH,
            });
        }

        let mut seen = HashSet::new();
        for entry in entries {
            if entry.message.trim().is_empty() {
                return Err(ValidationError::MissingField("message"));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ValidationError::DuplicateBatchEntryId(entry.id.clone()));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TopicService for TopicServiceImpl {
    async fn health_check(&self) -> ServiceResult<()> {
        self.topics.list_topics(None).await.map(|_| ())
    }

    async fn list_topics(&self) -> ServiceResult<Vec<TopicSummary>> {
        let mut topics = Vec::new();
        let mut next_token = None;

        loop {
            let page = self.topics.list_topics(next_token).await?;
            topics.extend(page.arns.into_iter().map(TopicSummary::from_arn));

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(topics)
    }

    #[instrument(skip(self), fields(topic = %name))]
    async fn ensure_topic_exists(
        &self,
        name: &TopicName,
    ) -> ServiceResult<EnsureOutcome<TopicSummary>> {
        match self.topics.create_topic(name).await {
            Ok(arn) => {
                info!(arn = %arn, "topic created");
                Ok(EnsureOutcome::Created(TopicSummary::from_arn(arn)))
            }
            Err(ServiceError::AlreadyExists { .. }) => {
                let arn = self.resolve_topic_arn(name).await?;
                debug!("topic already exists");
                Ok(EnsureOutcome::AlreadyExists(TopicSummary::from_arn(arn)))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_topic(&self, name: &TopicName) -> ServiceResult<TopicSummary> {
        let arn = self.resolve_topic_arn(name).await?;
        Ok(TopicSummary::from_arn(arn))
    }

    #[instrument(skip(self), fields(topic = %name))]
    async fn delete_topic(&self, name: &TopicName) -> ServiceResult<()> {
        let arn = self.resolve_topic_arn(name).await?;
        self.topics.delete_topic(&arn).await?;
        info!("topic deleted");
        Ok(())
    }

    async fn list_subscriptions(&self, name: &TopicName) -> ServiceResult<Vec<SubscriptionInfo>> {
        let arn = self.resolve_topic_arn(name).await?;
        self.topics.list_subscriptions(&arn).await
    }

    #[instrument(skip(self), fields(topic = %name))]
    async fn subscribe_email(
        &self,
        name: &TopicName,
        email: &EmailAddress,
    ) -> ServiceResult<String> {
        let arn = self.resolve_topic_arn(name).await?;
        let subscription_arn = self
            .topics
            .subscribe(
                &arn,
                SubscribeRequest {
                    protocol: SubscriptionProtocol::Email,
                    endpoint: email.as_str().to_string(),
                    raw_message_delivery: false,
                },
            )
            .await?;

        info!(subscription = %subscription_arn, "email subscribed");
        Ok(subscription_arn)
    }

    #[instrument(skip(self), fields(topic = %name, queue = %queue))]
    async fn subscribe_queue(
        &self,
        name: &TopicName,
        queue: &QueueName,
        raw_message_delivery: bool,
    ) -> ServiceResult<String> {
        let topic_arn = self.resolve_topic_arn(name).await?;

        let queue_url = self.queues.get_queue_url(queue).await?;
        let attributes = self.queues.get_queue_attributes(&queue_url).await?;
        let queue_arn = attributes.get("QueueArn").cloned().ok_or_else(|| {
            ServiceError::remote(format!("Queue {queue} did not report a QueueArn attribute"))
        })?;

        self.queues
            .set_queue_policy(&queue_url, &Self::queue_policy(&queue_arn, &topic_arn))
            .await?;

        let subscription_arn = self
            .topics
            .subscribe(
                &topic_arn,
                SubscribeRequest {
                    protocol: SubscriptionProtocol::Sqs,
                    endpoint: queue_arn,
                    raw_message_delivery,
                },
            )
            .await?;

        info!(subscription = %subscription_arn, "queue subscribed");
        Ok(subscription_arn)
    }

    #[instrument(skip(self), fields(topic = %name))]
    async fn unsubscribe(&self, name: &TopicName, subscription_arn: &str) -> ServiceResult<()> {
        if subscription_arn.trim().is_empty() {
            return Err(ValidationError::MissingField("subscriptionArn").into());
        }

        // Only subscriptions of the named topic may be removed through it
        let topic_arn = self.resolve_topic_arn(name).await?;
        let subscriptions = self.topics.list_subscriptions(&topic_arn).await?;
        if !subscriptions
            .iter()
            .any(|s| s.subscription_arn == subscription_arn)
        {
            return Err(ServiceError::not_found(
                ResourceKind::Subscription,
                subscription_arn,
            ));
        }

        self.topics.unsubscribe(subscription_arn).await?;
        info!(subscription = %subscription_arn, "unsubscribed");
        Ok(())
    }

    #[instrument(skip(self, message), fields(topic = %name))]
    async fn publish(
        &self,
        name: &TopicName,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<String> {
        if message.trim().is_empty() {
            return Err(ValidationError::MissingField("message").into());
        }

        let arn = self.resolve_topic_arn(name).await?;
        let message_id = self.topics.publish(&arn, message, subject).await?;
        debug!(message_id = %message_id, "message published");
        Ok(message_id)
    }

    #[instrument(skip(self, entries), fields(topic = %name, entries = entries.len()))]
    async fn publish_batch(
        &self,
        name: &TopicName,
        entries: Vec<PublishEntry>,
    ) -> ServiceResult<PublishBatchReport> {
        // Reject before any remote call, topic resolution included
        Self::validate_batch(&entries)?;

        let arn = self.resolve_topic_arn(name).await?;
        let report = self.topics.publish_batch(&arn, entries).await?;
        debug!(
            successful = report.successful.len(),
            failed = report.failed.len(),
            "batch published"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::{InMemoryQueueClient, InMemoryTopicClient},
        domain::models::ReceiveOptions,
    };

    fn topic(name: &str) -> TopicName {
        TopicName::new(name.to_string()).unwrap()
    }

    fn entry(id: &str, message: &str) -> PublishEntry {
        PublishEntry {
            id: id.to_string(),
            message: message.to_string(),
            subject: None,
        }
    }

    fn service() -> (TopicServiceImpl, Arc<InMemoryTopicClient>, Arc<InMemoryQueueClient>) {
        let queues = Arc::new(InMemoryQueueClient::new());
        let topics = Arc::new(InMemoryTopicClient::new().with_queue_delivery(queues.clone()));
        (
            TopicServiceImpl::new(topics.clone(), queues.clone()),
            topics,
            queues,
        )
    }

    #[tokio::test]
    async fn test_resolution_matches_exact_name_only() {
        let (service, _, _) = service();
        service.ensure_topic_exists(&topic("order-events-2")).await.unwrap();
        service.ensure_topic_exists(&topic("order-events")).await.unwrap();

        let arn = service.resolve_topic_arn(&topic("order-events")).await.unwrap();
        assert!(arn.ends_with(":order-events"));

        let err = service.resolve_topic_arn(&topic("order")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolution_follows_pages() {
        let queues = Arc::new(InMemoryQueueClient::new());
        let topics = Arc::new(InMemoryTopicClient::with_page_size(5));
        let service = TopicServiceImpl::new(topics, queues);
        for i in 0..12 {
            service
                .ensure_topic_exists(&topic(&format!("topic-{i:02}")))
                .await
                .unwrap();
        }

        let found = service.get_topic(&topic("topic-11")).await.unwrap();
        assert_eq!(found.name, "topic-11");
        assert_eq!(service.list_topics().await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_publish_batch_size_limits() {
        let (service, topics, _) = service();
        let name = topic("batched");
        service.ensure_topic_exists(&name).await.unwrap();
        let calls_before = topics.list_calls();

        let err = service.publish_batch(&name, Vec::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::BatchSizeOutOfRange { actual: 0, .. })
        ));

        let eleven = (0..11).map(|i| entry(&i.to_string(), "m")).collect();
        let err = service.publish_batch(&name, eleven).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::BatchSizeOutOfRange { actual: 11, .. })
        ));

        // Neither rejection reached the remote service
        assert_eq!(topics.list_calls(), calls_before);

        let ten = (0..10).map(|i| entry(&i.to_string(), "m")).collect();
        let report = service.publish_batch(&name, ten).await.unwrap();
        assert_eq!(report.successful.len(), 10);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_publish_batch_rejects_duplicate_ids() {
        let (service, _, _) = service();
        let name = topic("dupes");
        service.ensure_topic_exists(&name).await.unwrap();

        let err = service
            .publish_batch(&name, vec![entry("a", "one"), entry("a", "two")])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Validation(ValidationError::DuplicateBatchEntryId("a".to_string()))
        );
    }

    #[tokio::test]
    async fn test_queue_subscription_fans_out() {
        let (service, _, queues) = service();
        let name = topic("fan-out");
        let queue = QueueName::new("fan-out-consumer".to_string()).unwrap();
        service.ensure_topic_exists(&name).await.unwrap();
        queues.create_queue(&queue).await.unwrap();

        let subscription = service.subscribe_queue(&name, &queue, true).await.unwrap();
        assert!(subscription.contains(":fan-out:"));

        service.publish(&name, "hello subscribers", None).await.unwrap();

        let url = queues.get_queue_url(&queue).await.unwrap();
        let received = queues
            .receive_messages(&url, ReceiveOptions::default())
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, "hello subscribers");

        let policy = queues.get_queue_attributes(&url).await.unwrap()["Policy"].clone();
        assert!(policy.contains("sns.amazonaws.com"));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_subscription() {
        let (service, _, _) = service();
        let name = topic("alerts");
        service.ensure_topic_exists(&name).await.unwrap();

        let err = service
            .unsubscribe(&name, "arn:aws:sns:us-east-1:000000000000:alerts:nope")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_email_subscription_is_listed() {
        let (service, _, _) = service();
        let name = topic("newsletter");
        service.ensure_topic_exists(&name).await.unwrap();
        let email = EmailAddress::new("reader@example.com".to_string()).unwrap();

        service.subscribe_email(&name, &email).await.unwrap();

        let subscriptions = service.list_subscriptions(&name).await.unwrap();
        assert_eq!(subscriptions.len(), 1);
        assert_eq!(subscriptions[0].protocol, "email");
        assert_eq!(subscriptions[0].endpoint, "reader@example.com");
    }

    #[tokio::test]
    async fn test_ensure_reports_existing_topic() {
        let (service, _, _) = service();
        let name = topic("audit");

        let first = service.ensure_topic_exists(&name).await.unwrap();
        let second = service.ensure_topic_exists(&name).await.unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.value().arn, second.value().arn);
    }
}
