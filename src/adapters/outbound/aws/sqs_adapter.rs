use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::{Client, types::QueueAttributeName};
use std::collections::HashMap;
use tracing::debug;

use super::error::{classify, remote_error};
use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult, ValidationError},
        models::{QueueSummary, ReceiveOptions, ReceivedMessage, SendMessageRequest, SentMessage},
        value_objects::QueueName,
    },
    ports::messaging::QueueClient,
};

/// ListQueues page size ceiling
const LIST_PAGE_SIZE: i32 = 1000;

/// QueueClient backed by aws-sdk-sqs
#[derive(Clone)]
pub struct SqsAdapter {
    client: Client,
}

impl SqsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    fn queue_name(queue_url: &str) -> String {
        QueueSummary::from_url(queue_url).name
    }
}

#[async_trait]
impl QueueClient for SqsAdapter {
    async fn list_queues(&self) -> ServiceResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut next_token = None;

        loop {
            let response = self
                .client
                .list_queues()
                .max_results(LIST_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| remote_error("ListQueues", e))?;

            urls.extend(response.queue_urls().iter().cloned());

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(urls)
    }

    async fn create_queue(&self, name: &QueueName) -> ServiceResult<String> {
        // CreateQueue succeeds silently for an existing queue with matching attributes
        match self.get_queue_url(name).await {
            Ok(_) => {
                return Err(ServiceError::AlreadyExists {
                    kind: ResourceKind::Queue,
                    name: name.as_str().to_string(),
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let mut request = self.client.create_queue().queue_name(name.as_str());
        if name.is_fifo() {
            request = request.attributes(QueueAttributeName::FifoQueue, "true");
        }

        let response = request.send().await.map_err(|e| {
            if e.as_service_error().is_some_and(|se| se.is_queue_name_exists()) {
                ServiceError::conflict(
                    ResourceKind::Queue,
                    name.as_str(),
                    "A queue already exists with the same name and different attributes",
                )
            } else {
                remote_error("CreateQueue", e)
            }
        })?;

        response
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::remote("CreateQueue returned no queue URL"))
    }

    async fn get_queue_url(&self, name: &QueueName) -> ServiceResult<String> {
        let response = self
            .client
            .get_queue_url()
            .queue_name(name.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_queue_does_not_exist()) {
                    ServiceError::not_found(ResourceKind::Queue, name.as_str())
                } else {
                    classify("GetQueueUrl", ResourceKind::Queue, name.as_str(), e)
                }
            })?;

        response
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::not_found(ResourceKind::Queue, name.as_str()))
    }

    async fn delete_queue(&self, queue_url: &str) -> ServiceResult<()> {
        self.client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| {
                classify("DeleteQueue", ResourceKind::Queue, &Self::queue_name(queue_url), e)
            })?;
        Ok(())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> ServiceResult<HashMap<String, String>> {
        let response = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "GetQueueAttributes",
                    ResourceKind::Queue,
                    &Self::queue_name(queue_url),
                    e,
                )
            })?;

        Ok(response
            .attributes()
            .map(|attributes| {
                attributes
                    .iter()
                    .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set_queue_policy(&self, queue_url: &str, policy: &str) -> ServiceResult<()> {
        self.client
            .set_queue_attributes()
            .queue_url(queue_url)
            .attributes(QueueAttributeName::Policy, policy)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "SetQueueAttributes",
                    ResourceKind::Queue,
                    &Self::queue_name(queue_url),
                    e,
                )
            })?;
        Ok(())
    }

    async fn send_message(
        &self,
        queue_url: &str,
        request: SendMessageRequest,
    ) -> ServiceResult<SentMessage> {
        let response = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(request.body)
            .set_delay_seconds(request.delay_seconds)
            .send()
            .await
            .map_err(|e| {
                classify("SendMessage", ResourceKind::Queue, &Self::queue_name(queue_url), e)
            })?;

        Ok(SentMessage {
            message_id: response.message_id().unwrap_or_default().to_string(),
            md5_of_body: response.md5_of_message_body().map(str::to_string),
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        options: ReceiveOptions,
    ) -> ServiceResult<Vec<ReceivedMessage>> {
        let response = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(options.max_messages)
            .wait_time_seconds(options.wait_time_seconds)
            .set_visibility_timeout(options.visibility_timeout)
            .send()
            .await
            .map_err(|e| {
                classify(
                    "ReceiveMessage",
                    ResourceKind::Queue,
                    &Self::queue_name(queue_url),
                    e,
                )
            })?;

        let messages: Vec<ReceivedMessage> = response
            .messages()
            .iter()
            .filter_map(|message| {
                Some(ReceivedMessage {
                    message_id: message.message_id()?.to_string(),
                    receipt_handle: message.receipt_handle()?.to_string(),
                    body: message.body().unwrap_or_default().to_string(),
                })
            })
            .collect();

        debug!(queue_url, count = messages.len(), "received messages");
        Ok(messages)
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ServiceResult<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                let invalid = e.as_service_error().is_some_and(|se| {
                    se.is_receipt_handle_is_invalid() || se.is_invalid_id_format()
                });
                if invalid {
                    ServiceError::from(ValidationError::InvalidField {
                        field: "receiptHandle",
                        value: receipt_handle.to_string(),
                        expected: "a receipt handle from a current delivery".to_string(),
                    })
                } else {
                    classify(
                        "DeleteMessage",
                        ResourceKind::Queue,
                        &Self::queue_name(queue_url),
                        e,
                    )
                }
            })?;
        Ok(())
    }

    async fn purge_queue(&self, queue_url: &str) -> ServiceResult<()> {
        let name = Self::queue_name(queue_url);

        self.client
            .purge_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| {
                let (in_progress, missing) = e
                    .as_service_error()
                    .map(|se| (se.is_purge_queue_in_progress(), se.is_queue_does_not_exist()))
                    .unwrap_or_default();

                if in_progress {
                    ServiceError::conflict(
                        ResourceKind::Queue,
                        name.as_str(),
                        "Only one PurgeQueue operation is allowed every 60 seconds",
                    )
                } else if missing {
                    ServiceError::not_found(ResourceKind::Queue, name.as_str())
                } else {
                    classify("PurgeQueue", ResourceKind::Queue, &name, e)
                }
            })?;
        Ok(())
    }
}
