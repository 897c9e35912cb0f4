use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, btree_map::Entry};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult},
        models::{
            PublishBatchReport, PublishEntry, PublishedEntry, SubscribeRequest, SubscriptionInfo,
            SubscriptionProtocol, TopicPage,
        },
        value_objects::{TopicName, topic_name_from_arn},
    },
    ports::messaging::TopicClient,
};

use super::{ACCOUNT_ID, InMemoryQueueClient, REGION};

/// ListTopics returns at most 100 topics per page
const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory implementation of TopicClient for testing and development
///
/// When built with a queue client, publishing delivers to every `sqs`
/// subscription synchronously. Email endpoints receive nothing.
#[derive(Clone)]
pub struct InMemoryTopicClient {
    data: Arc<RwLock<TopicData>>,
    page_size: usize,
    list_calls: Arc<AtomicUsize>,
    queues: Option<Arc<InMemoryQueueClient>>,
}

#[derive(Default)]
struct TopicData {
    topics: BTreeMap<String, StoredTopic>,
}

struct StoredTopic {
    arn: String,
    subscriptions: Vec<StoredSubscription>,
}

#[derive(Clone)]
struct StoredSubscription {
    info: SubscriptionInfo,
    raw_message_delivery: bool,
}

impl InMemoryTopicClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a client whose topic listings return at most `page_size` ARNs per page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            data: Arc::new(RwLock::new(TopicData::default())),
            page_size: page_size.max(1),
            list_calls: Arc::new(AtomicUsize::new(0)),
            queues: None,
        }
    }

    /// Deliver published messages to `sqs` subscriptions through `queues`
    pub fn with_queue_delivery(mut self, queues: Arc<InMemoryQueueClient>) -> Self {
        self.queues = Some(queues);
        self
    }

    /// Number of topic listing calls received so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn topic_arn(name: &str) -> String {
        format!("arn:aws:sns:{REGION}:{ACCOUNT_ID}:{name}")
    }

    fn topic_not_found(arn: &str) -> ServiceError {
        ServiceError::not_found(ResourceKind::Topic, topic_name_from_arn(arn))
    }

    /// Body an `sqs` endpoint receives for a published message
    fn queue_payload(
        subscription: &StoredSubscription,
        message_id: &str,
        message: &str,
        subject: Option<&str>,
    ) -> String {
        if subscription.raw_message_delivery {
            return message.to_string();
        }

        json!({
            "Type": "Notification",
            "MessageId": message_id,
            "TopicArn": subscription.info.topic_arn,
            "Subject": subject,
            "Message": message,
            "Timestamp": Utc::now().to_rfc3339(),
        })
        .to_string()
    }

    async fn fan_out(
        &self,
        topic_arn: &str,
        message_id: &str,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<()> {
        let subscriptions = {
            let data = self.data.read().await;
            let topic = data
                .topics
                .get(topic_name_from_arn(topic_arn))
                .ok_or_else(|| Self::topic_not_found(topic_arn))?;
            topic.subscriptions.clone()
        };

        let Some(queues) = &self.queues else {
            return Ok(());
        };

        for subscription in subscriptions
            .iter()
            .filter(|s| s.info.protocol == SubscriptionProtocol::Sqs.as_str())
        {
            let payload = Self::queue_payload(subscription, message_id, message, subject);
            if let Err(e) = queues.deliver(&subscription.info.endpoint, payload).await {
                // Delivery is asynchronous in SNS; a dead endpoint never fails the publish
                warn!(endpoint = %subscription.info.endpoint, "delivery failed: {}", e);
            }
        }

        Ok(())
    }
}

impl Default for InMemoryTopicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicClient for InMemoryTopicClient {
    async fn list_topics(&self, next_token: Option<String>) -> ServiceResult<TopicPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.read().await;

        let mut remaining = data
            .topics
            .values()
            .map(|topic| &topic.arn)
            .filter(|arn| next_token.as_deref().map_or(true, |t| arn.as_str() > t));

        let arns: Vec<String> = remaining.by_ref().take(self.page_size).cloned().collect();
        let next_token = match (remaining.next(), arns.last()) {
            (Some(_), Some(last)) => Some(last.clone()),
            _ => None,
        };

        Ok(TopicPage { arns, next_token })
    }

    async fn create_topic(&self, name: &TopicName) -> ServiceResult<String> {
        let mut data = self.data.write().await;
        match data.topics.entry(name.as_str().to_string()) {
            Entry::Occupied(_) => Err(ServiceError::AlreadyExists {
                kind: ResourceKind::Topic,
                name: name.as_str().to_string(),
            }),
            Entry::Vacant(slot) => {
                let topic = slot.insert(StoredTopic {
                    arn: Self::topic_arn(name.as_str()),
                    subscriptions: Vec::new(),
                });
                Ok(topic.arn.clone())
            }
        }
    }

    async fn delete_topic(&self, topic_arn: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        data.topics
            .remove(topic_name_from_arn(topic_arn))
            .map(|_| ())
            .ok_or_else(|| Self::topic_not_found(topic_arn))
    }

    async fn subscribe(&self, topic_arn: &str, request: SubscribeRequest) -> ServiceResult<String> {
        let mut data = self.data.write().await;
        let topic = data
            .topics
            .get_mut(topic_name_from_arn(topic_arn))
            .ok_or_else(|| Self::topic_not_found(topic_arn))?;

        // Subscribing the same endpoint twice returns the existing subscription
        if let Some(existing) = topic.subscriptions.iter_mut().find(|s| {
            s.info.protocol == request.protocol.as_str() && s.info.endpoint == request.endpoint
        }) {
            existing.raw_message_delivery = request.raw_message_delivery;
            return Ok(existing.info.subscription_arn.clone());
        }

        let subscription_arn = format!("{}:{}", topic.arn, Uuid::new_v4());
        topic.subscriptions.push(StoredSubscription {
            info: SubscriptionInfo {
                subscription_arn: subscription_arn.clone(),
                protocol: request.protocol.as_str().to_string(),
                endpoint: request.endpoint,
                topic_arn: topic.arn.clone(),
            },
            raw_message_delivery: request.raw_message_delivery,
        });

        Ok(subscription_arn)
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;

        for topic in data.topics.values_mut() {
            let before = topic.subscriptions.len();
            topic
                .subscriptions
                .retain(|s| s.info.subscription_arn != subscription_arn);
            if topic.subscriptions.len() != before {
                return Ok(());
            }
        }

        Err(ServiceError::not_found(
            ResourceKind::Subscription,
            subscription_arn,
        ))
    }

    async fn list_subscriptions(&self, topic_arn: &str) -> ServiceResult<Vec<SubscriptionInfo>> {
        let data = self.data.read().await;
        let topic = data
            .topics
            .get(topic_name_from_arn(topic_arn))
            .ok_or_else(|| Self::topic_not_found(topic_arn))?;

        Ok(topic.subscriptions.iter().map(|s| s.info.clone()).collect())
    }

    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<String> {
        let message_id = Uuid::new_v4().to_string();
        self.fan_out(topic_arn, &message_id, message, subject).await?;
        Ok(message_id)
    }

    async fn publish_batch(
        &self,
        topic_arn: &str,
        entries: Vec<PublishEntry>,
    ) -> ServiceResult<PublishBatchReport> {
        let mut report = PublishBatchReport::default();

        for entry in entries {
            let message_id = self
                .publish(topic_arn, &entry.message, entry.subject.as_deref())
                .await?;
            report.successful.push(PublishedEntry {
                id: entry.id,
                message_id,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            models::{ReceiveOptions, SubscriptionProtocol},
            value_objects::QueueName,
        },
        ports::messaging::QueueClient,
    };

    fn topic(name: &str) -> TopicName {
        TopicName::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_existing_topic_reports_already_exists() {
        let client = InMemoryTopicClient::new();

        let first = client.create_topic(&topic("alerts")).await.unwrap();
        let err = client.create_topic(&topic("alerts")).await.unwrap_err();

        assert_eq!(first, "arn:aws:sns:us-east-1:000000000000:alerts");
        assert!(err.is_already_exists());
        assert_eq!(client.list_topics(None).await.unwrap().arns.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_pages() {
        let client = InMemoryTopicClient::with_page_size(2);
        for name in ["a", "b", "c"] {
            client.create_topic(&topic(name)).await.unwrap();
        }

        let first = client.list_topics(None).await.unwrap();
        assert_eq!(first.arns.len(), 2);
        assert!(first.next_token.is_some());

        let second = client.list_topics(first.next_token).await.unwrap();
        assert_eq!(second.arns.len(), 1);
        assert!(second.arns[0].ends_with(":c"));
        assert!(second.next_token.is_none());
        assert_eq!(client.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_wrapped_delivery_without_raw_flag() {
        let queues = Arc::new(InMemoryQueueClient::new());
        let client = InMemoryTopicClient::new().with_queue_delivery(queues.clone());
        let arn = client.create_topic(&topic("wrapped")).await.unwrap();
        let queue = QueueName::new("wrapped-consumer".to_string()).unwrap();
        let url = queues.create_queue(&queue).await.unwrap();
        let queue_arn = queues.get_queue_attributes(&url).await.unwrap()["QueueArn"].clone();

        client
            .subscribe(
                &arn,
                SubscribeRequest {
                    protocol: SubscriptionProtocol::Sqs,
                    endpoint: queue_arn,
                    raw_message_delivery: false,
                },
            )
            .await
            .unwrap();
        client.publish(&arn, "payload", Some("subject")).await.unwrap();

        let received = queues
            .receive_messages(&url, ReceiveOptions::default())
            .await
            .unwrap();
        let envelope: serde_json::Value = serde_json::from_str(&received[0].body).unwrap();
        assert_eq!(envelope["Type"], "Notification");
        assert_eq!(envelope["Message"], "payload");
        assert_eq!(envelope["Subject"], "subject");
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_subscription() {
        let client = InMemoryTopicClient::new();
        let arn = client.create_topic(&topic("mail")).await.unwrap();
        let subscription = client
            .subscribe(
                &arn,
                SubscribeRequest {
                    protocol: SubscriptionProtocol::Email,
                    endpoint: "ops@example.com".to_string(),
                    raw_message_delivery: false,
                },
            )
            .await
            .unwrap();

        client.unsubscribe(&subscription).await.unwrap();

        assert!(client.list_subscriptions(&arn).await.unwrap().is_empty());
        assert!(client.unsubscribe(&subscription).await.unwrap_err().is_not_found());
    }
}
