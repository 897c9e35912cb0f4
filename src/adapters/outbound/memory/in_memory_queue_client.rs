use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque, btree_map::Entry};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult, ValidationError},
        models::{QueueSummary, ReceiveOptions, ReceivedMessage, SendMessageRequest, SentMessage},
        value_objects::QueueName,
    },
    ports::messaging::QueueClient,
};

use super::{ACCOUNT_ID, REGION};

const ENDPOINT: &str = "http://localhost:4566";
const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// In-memory implementation of QueueClient for testing and development
///
/// Delivery delays and visibility timeouts are honored; long polling is not,
/// a receive returns immediately with whatever is visible.
#[derive(Clone, Default)]
pub struct InMemoryQueueClient {
    data: Arc<RwLock<QueueData>>,
}

#[derive(Default)]
struct QueueData {
    queues: BTreeMap<String, StoredQueue>,
}

struct StoredQueue {
    url: String,
    arn: String,
    created_at: SystemTime,
    policy: Option<String>,
    messages: VecDeque<StoredMessage>,
    // receipt handle -> (message, instant it becomes visible again)
    in_flight: HashMap<String, (StoredMessage, Instant)>,
    last_purge: Option<Instant>,
}

#[derive(Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
    available_at: Instant,
}

impl StoredQueue {
    fn new(name: &str) -> Self {
        Self {
            url: format!("{ENDPOINT}/{ACCOUNT_ID}/{name}"),
            arn: queue_arn(name),
            created_at: SystemTime::now(),
            policy: None,
            messages: VecDeque::new(),
            in_flight: HashMap::new(),
            last_purge: None,
        }
    }

    /// Return messages whose visibility timeout has elapsed to the queue
    fn release_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, (_, visible_at))| *visible_at <= now)
            .map(|(handle, _)| handle.clone())
            .collect();

        for handle in expired {
            if let Some((message, _)) = self.in_flight.remove(&handle) {
                self.messages.push_front(message);
            }
        }
    }

    fn visible_count(&self, now: Instant) -> usize {
        self.messages.iter().filter(|m| m.available_at <= now).count()
    }

    fn enqueue(&mut self, body: String, delay: Duration) -> StoredMessage {
        let message = StoredMessage {
            message_id: Uuid::new_v4().to_string(),
            body,
            available_at: Instant::now() + delay,
        };
        self.messages.push_back(message.clone());
        message
    }
}

fn queue_arn(name: &str) -> String {
    format!("arn:aws:sqs:{REGION}:{ACCOUNT_ID}:{name}")
}

impl InMemoryQueueClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `body` into the queue whose ARN is `queue_arn`
    ///
    /// Used by the in-memory topic client to emulate fan-out.
    pub(crate) async fn deliver(&self, queue_arn: &str, body: String) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let queue = data
            .queues
            .values_mut()
            .find(|q| q.arn == queue_arn)
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Queue, queue_arn))?;

        queue.enqueue(body, Duration::ZERO);
        Ok(())
    }

    fn name_from_url(queue_url: &str) -> String {
        QueueSummary::from_url(queue_url).name
    }
}

/// Look up the queue addressed by `queue_url`
fn queue_mut<'a>(data: &'a mut QueueData, queue_url: &str) -> ServiceResult<&'a mut StoredQueue> {
    let name = InMemoryQueueClient::name_from_url(queue_url);
    data.queues
        .get_mut(&name)
        .ok_or_else(|| ServiceError::not_found(ResourceKind::Queue, name.clone()))
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn list_queues(&self) -> ServiceResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data.queues.values().map(|q| q.url.clone()).collect())
    }

    async fn create_queue(&self, name: &QueueName) -> ServiceResult<String> {
        let mut data = self.data.write().await;
        match data.queues.entry(name.as_str().to_string()) {
            Entry::Occupied(_) => Err(ServiceError::AlreadyExists {
                kind: ResourceKind::Queue,
                name: name.as_str().to_string(),
            }),
            Entry::Vacant(slot) => Ok(slot.insert(StoredQueue::new(name.as_str())).url.clone()),
        }
    }

    async fn get_queue_url(&self, name: &QueueName) -> ServiceResult<String> {
        let data = self.data.read().await;
        data.queues
            .get(name.as_str())
            .map(|q| q.url.clone())
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Queue, name.as_str()))
    }

    async fn delete_queue(&self, queue_url: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let name = Self::name_from_url(queue_url);
        data.queues
            .remove(&name)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Queue, name))
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> ServiceResult<HashMap<String, String>> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;
        let now = Instant::now();
        queue.release_expired(now);

        let created = queue
            .created_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let delayed = queue.messages.len() - queue.visible_count(now);

        let mut attributes = HashMap::from([
            ("QueueArn".to_string(), queue.arn.clone()),
            (
                "ApproximateNumberOfMessages".to_string(),
                queue.visible_count(now).to_string(),
            ),
            (
                "ApproximateNumberOfMessagesNotVisible".to_string(),
                queue.in_flight.len().to_string(),
            ),
            (
                "ApproximateNumberOfMessagesDelayed".to_string(),
                delayed.to_string(),
            ),
            ("CreatedTimestamp".to_string(), created.to_string()),
            (
                "VisibilityTimeout".to_string(),
                DEFAULT_VISIBILITY_TIMEOUT.as_secs().to_string(),
            ),
        ]);
        if let Some(policy) = &queue.policy {
            attributes.insert("Policy".to_string(), policy.clone());
        }

        Ok(attributes)
    }

    async fn set_queue_policy(&self, queue_url: &str, policy: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;
        queue.policy = Some(policy.to_string());
        Ok(())
    }

    async fn send_message(
        &self,
        queue_url: &str,
        request: SendMessageRequest,
    ) -> ServiceResult<SentMessage> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;

        let delay = Duration::from_secs(request.delay_seconds.unwrap_or(0).max(0) as u64);
        let md5_of_body = format!("{:x}", md5::compute(request.body.as_bytes()));
        let message = queue.enqueue(request.body, delay);

        Ok(SentMessage {
            message_id: message.message_id,
            md5_of_body: Some(md5_of_body),
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        options: ReceiveOptions,
    ) -> ServiceResult<Vec<ReceivedMessage>> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;
        let now = Instant::now();
        queue.release_expired(now);

        let visibility = options
            .visibility_timeout
            .map(|secs| Duration::from_secs(secs.max(0) as u64))
            .unwrap_or(DEFAULT_VISIBILITY_TIMEOUT);
        let limit = options.max_messages.max(1) as usize;

        let mut received = Vec::new();
        let mut remaining = VecDeque::new();
        while let Some(message) = queue.messages.pop_front() {
            if received.len() < limit && message.available_at <= now {
                let receipt_handle = Uuid::new_v4().to_string();
                received.push(ReceivedMessage {
                    message_id: message.message_id.clone(),
                    receipt_handle: receipt_handle.clone(),
                    body: message.body.clone(),
                });
                queue
                    .in_flight
                    .insert(receipt_handle, (message, now + visibility));
            } else {
                remaining.push_back(message);
            }
        }
        queue.messages = remaining;

        Ok(received)
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;

        queue
            .in_flight
            .remove(receipt_handle)
            .map(|_| ())
            .ok_or_else(|| {
                ValidationError::InvalidField {
                    field: "receiptHandle",
                    value: receipt_handle.to_string(),
                    expected: "a receipt handle from a current delivery".to_string(),
                }
                .into()
            })
    }

    async fn purge_queue(&self, queue_url: &str) -> ServiceResult<()> {
        let mut data = self.data.write().await;
        let queue = queue_mut(&mut data, queue_url)?;
        let now = Instant::now();

        if let Some(last) = queue.last_purge {
            if now.duration_since(last) < PURGE_INTERVAL {
                return Err(ServiceError::conflict(
                    ResourceKind::Queue,
                    Self::name_from_url(queue_url),
                    "Only one PurgeQueue operation is allowed every 60 seconds",
                ));
            }
        }

        queue.messages.clear();
        queue.in_flight.clear();
        queue.last_purge = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> QueueName {
        QueueName::new("memory-queue".to_string()).unwrap()
    }

    fn send(body: &str, delay_seconds: Option<i32>) -> SendMessageRequest {
        SendMessageRequest {
            body: body.to_string(),
            delay_seconds,
        }
    }

    #[tokio::test]
    async fn test_create_existing_queue_reports_already_exists() {
        let client = InMemoryQueueClient::new();
        let first = client.create_queue(&queue()).await.unwrap();
        let err = client.create_queue(&queue()).await.unwrap_err();

        assert!(err.is_already_exists());
        assert_eq!(first, "http://localhost:4566/000000000000/memory-queue");
        assert_eq!(client.list_queues().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_received_message_is_invisible_until_timeout() {
        let client = InMemoryQueueClient::new();
        let url = client.create_queue(&queue()).await.unwrap();
        client.send_message(&url, send("hello", None)).await.unwrap();

        let first = client
            .receive_messages(&url, ReceiveOptions::default())
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = client
            .receive_messages(&url, ReceiveOptions::default())
            .await
            .unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_zero_visibility_timeout_redelivers() {
        let client = InMemoryQueueClient::new();
        let url = client.create_queue(&queue()).await.unwrap();
        client.send_message(&url, send("again", None)).await.unwrap();
        let options = ReceiveOptions::clamped(None, None, Some(0));

        let first = client.receive_messages(&url, options).await.unwrap();
        let second = client.receive_messages(&url, options).await.unwrap();

        assert_eq!(first[0].message_id, second[0].message_id);
        assert_ne!(first[0].receipt_handle, second[0].receipt_handle);
    }

    #[tokio::test]
    async fn test_delayed_message_is_not_received() {
        let client = InMemoryQueueClient::new();
        let url = client.create_queue(&queue()).await.unwrap();
        client.send_message(&url, send("later", Some(60))).await.unwrap();

        let received = client
            .receive_messages(&url, ReceiveOptions::default())
            .await
            .unwrap();
        assert!(received.is_empty());

        let attributes = client.get_queue_attributes(&url).await.unwrap();
        assert_eq!(attributes["ApproximateNumberOfMessagesDelayed"], "1");
    }

    #[tokio::test]
    async fn test_delete_with_unknown_receipt_handle() {
        let client = InMemoryQueueClient::new();
        let url = client.create_queue(&queue()).await.unwrap();

        let err = client.delete_message(&url, "bogus").await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_queue_url() {
        let client = InMemoryQueueClient::new();

        let err = client
            .send_message("http://localhost:4566/000000000000/ghost", send("x", None))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::not_found(ResourceKind::Queue, "ghost"));
    }
}
