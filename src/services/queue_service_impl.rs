use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    domain::{
        errors::{ServiceError, ServiceResult, ValidationError},
        models::{
            EnsureOutcome, MAX_DELAY_SECONDS, QueueDetails, QueueSummary, ReceiveOptions,
            ReceivedMessage, SendMessageRequest, SentMessage,
        },
        value_objects::QueueName,
    },
    ports::{messaging::QueueClient, services::QueueService},
};

/// Implementation of QueueService on top of a queue client
#[derive(Clone)]
pub struct QueueServiceImpl {
    client: Arc<dyn QueueClient>,
}

impl QueueServiceImpl {
    pub fn new(client: Arc<dyn QueueClient>) -> Self {
        Self { client }
    }

    fn validate_message(request: &SendMessageRequest) -> Result<(), ValidationError> {
        if request.body.trim().is_empty() {
            return Err(ValidationError::MissingField("messageBody"));
        }

        if let Some(delay) = request.delay_seconds {
            if !(0..=MAX_DELAY_SECONDS).contains(&delay) {
                return Err(ValidationError::InvalidField {
                    field: "delaySeconds",
                    value: delay.to_string(),
                    expected: format!("0 to {MAX_DELAY_SECONDS}"),
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl QueueService for QueueServiceImpl {
    async fn health_check(&self) -> ServiceResult<()> {
        self.client.list_queues().await.map(|_| ())
    }

    async fn list_queues(&self) -> ServiceResult<Vec<QueueSummary>> {
        let urls = self.client.list_queues().await?;
        Ok(urls.into_iter().map(QueueSummary::from_url).collect())
    }

    #[instrument(skip(self), fields(queue = %name))]
    async fn create_queue(&self, name: &QueueName) -> ServiceResult<EnsureOutcome<QueueSummary>> {
        match self.client.create_queue(name).await {
            Ok(url) => {
                info!(url = %url, "queue created");
                Ok(EnsureOutcome::Created(QueueSummary::from_url(url)))
            }
            Err(ServiceError::AlreadyExists { .. }) => {
                let url = self.client.get_queue_url(name).await?;
                debug!("queue already exists");
                Ok(EnsureOutcome::AlreadyExists(QueueSummary::from_url(url)))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_queue(&self, name: &QueueName) -> ServiceResult<QueueDetails> {
        let url = self.client.get_queue_url(name).await?;
        let attributes = self.client.get_queue_attributes(&url).await?;

        Ok(QueueDetails {
            name: name.clone(),
            arn: attributes.get("QueueArn").cloned(),
            url,
            attributes,
        })
    }

    #[instrument(skip(self), fields(queue = %name))]
    async fn delete_queue(&self, name: &QueueName) -> ServiceResult<()> {
        let url = self.client.get_queue_url(name).await?;
        self.client.delete_queue(&url).await?;
        info!("queue deleted");
        Ok(())
    }

    #[instrument(skip(self, request), fields(queue = %name))]
    async fn send_message(
        &self,
        name: &QueueName,
        request: SendMessageRequest,
    ) -> ServiceResult<SentMessage> {
        Self::validate_message(&request)?;

        let url = self.client.get_queue_url(name).await?;
        let sent = self.client.send_message(&url, request).await?;
        debug!(message_id = %sent.message_id, "message sent");
        Ok(sent)
    }

    async fn receive_messages(
        &self,
        name: &QueueName,
        options: ReceiveOptions,
    ) -> ServiceResult<Vec<ReceivedMessage>> {
        // Callers may build options by hand; re-apply the service limits
        let options = ReceiveOptions::clamped(
            Some(options.max_messages),
            Some(options.wait_time_seconds),
            options.visibility_timeout,
        );

        let url = self.client.get_queue_url(name).await?;
        let messages = self.client.receive_messages(&url, options).await?;
        debug!(queue = %name, count = messages.len(), "messages received");
        Ok(messages)
    }

    #[instrument(skip(self, receipt_handle), fields(queue = %name))]
    async fn delete_message(&self, name: &QueueName, receipt_handle: &str) -> ServiceResult<()> {
        if receipt_handle.trim().is_empty() {
            return Err(ValidationError::MissingField("receiptHandle").into());
        }

        let url = self.client.get_queue_url(name).await?;
        self.client.delete_message(&url, receipt_handle).await?;
        debug!("message deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(queue = %name))]
    async fn purge_queue(&self, name: &QueueName) -> ServiceResult<()> {
        let url = self.client.get_queue_url(name).await?;
        self.client.purge_queue(&url).await?;
        info!("queue purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryQueueClient;

    fn queue(name: &str) -> QueueName {
        QueueName::new(name.to_string()).unwrap()
    }

    fn message(body: &str) -> SendMessageRequest {
        SendMessageRequest {
            body: body.to_string(),
            delay_seconds: None,
        }
    }

    #[tokio::test]
    async fn test_receive_clamps_to_ten() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));
        let name = queue("bulk");
        service.create_queue(&name).await.unwrap();
        for i in 0..15 {
            service
                .send_message(&name, message(&format!("message {i}")))
                .await
                .unwrap();
        }

        let options = ReceiveOptions {
            max_messages: 50,
            wait_time_seconds: 0,
            visibility_timeout: None,
        };
        let received = service.receive_messages(&name, options).await.unwrap();

        assert_eq!(received.len(), 10);
    }

    #[tokio::test]
    async fn test_send_rejects_empty_body() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));

        let err = service
            .send_message(&queue("any"), message("   "))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Validation(ValidationError::MissingField("messageBody"))
        );
    }

    #[tokio::test]
    async fn test_send_rejects_delay_out_of_range() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));
        let request = SendMessageRequest {
            body: "hello".to_string(),
            delay_seconds: Some(901),
        };

        let err = service
            .send_message(&queue("any"), request)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_receive_then_delete() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));
        let name = queue("work");
        service.create_queue(&name).await.unwrap();
        service.send_message(&name, message("job-1")).await.unwrap();

        let received = service
            .receive_messages(&name, ReceiveOptions::default())
            .await
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, "job-1");

        service
            .delete_message(&name, &received[0].receipt_handle)
            .await
            .unwrap();

        let details = service.get_queue(&name).await.unwrap();
        assert_eq!(details.approximate_message_count(), Some(0));
    }

    #[tokio::test]
    async fn test_second_purge_conflicts() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));
        let name = queue("purgeable");
        service.create_queue(&name).await.unwrap();

        service.purge_queue(&name).await.unwrap();
        let err = service.purge_queue(&name).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_missing_queue() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));

        let err = service.get_queue(&queue("ghost")).await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_reports_existing_queue() {
        let service = QueueServiceImpl::new(Arc::new(InMemoryQueueClient::new()));
        let name = queue("twice");

        let first = service.create_queue(&name).await.unwrap();
        let second = service.create_queue(&name).await.unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert_eq!(first.value().url, second.value().url);
    }
}
