use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::{Client, types::PublishBatchRequestEntry};
use tracing::debug;

use super::error::{build_error, classify, remote_error};
use crate::{
    domain::{
        errors::{ResourceKind, ServiceError, ServiceResult},
        models::{
            FailedPublish, PublishBatchReport, PublishEntry, PublishedEntry, SubscribeRequest,
            SubscriptionInfo, TopicPage,
        },
        value_objects::{TopicName, topic_name_from_arn},
    },
    ports::messaging::TopicClient,
};

/// TopicClient backed by aws-sdk-sns
#[derive(Clone)]
pub struct SnsAdapter {
    client: Client,
}

impl SnsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(Client::new(sdk_config))
    }

    /// Walk every ListTopics page looking for an exact name match
    async fn find_topic_arn(&self, name: &TopicName) -> ServiceResult<Option<String>> {
        let mut next_token = None;

        loop {
            let page = self.list_topics(next_token).await?;
            if let Some(arn) = page
                .arns
                .into_iter()
                .find(|arn| topic_name_from_arn(arn) == name.as_str())
            {
                return Ok(Some(arn));
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl TopicClient for SnsAdapter {
    async fn list_topics(&self, next_token: Option<String>) -> ServiceResult<TopicPage> {
        let response = self
            .client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| remote_error("ListTopics", e))?;

        Ok(TopicPage {
            arns: response
                .topics()
                .iter()
                .filter_map(|topic| topic.topic_arn().map(str::to_string))
                .collect(),
            next_token: response.next_token().map(str::to_string),
        })
    }

    async fn create_topic(&self, name: &TopicName) -> ServiceResult<String> {
        // CreateTopic returns the existing ARN instead of failing
        if self.find_topic_arn(name).await?.is_some() {
            return Err(ServiceError::AlreadyExists {
                kind: ResourceKind::Topic,
                name: name.as_str().to_string(),
            });
        }

        let mut request = self.client.create_topic().name(name.as_str());
        if name.is_fifo() {
            request = request.attributes("FifoTopic", "true");
        }

        let response = request
            .send()
            .await
            .map_err(|e| remote_error("CreateTopic", e))?;

        response
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::remote("CreateTopic returned no topic ARN"))
    }

    async fn delete_topic(&self, topic_arn: &str) -> ServiceResult<()> {
        self.client
            .delete_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(|e| {
                classify("DeleteTopic", ResourceKind::Topic, topic_name_from_arn(topic_arn), e)
            })?;
        Ok(())
    }

    async fn subscribe(&self, topic_arn: &str, request: SubscribeRequest) -> ServiceResult<String> {
        let mut call = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(request.protocol.as_str())
            .endpoint(request.endpoint)
            .return_subscription_arn(true);
        if request.raw_message_delivery {
            call = call.attributes("RawMessageDelivery", "true");
        }

        let response = call.send().await.map_err(|e| {
            classify("Subscribe", ResourceKind::Topic, topic_name_from_arn(topic_arn), e)
        })?;

        response
            .subscription_arn()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::remote("Subscribe returned no subscription ARN"))
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> ServiceResult<()> {
        self.client
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found_exception()) {
                    ServiceError::not_found(ResourceKind::Subscription, subscription_arn)
                } else {
                    remote_error("Unsubscribe", e)
                }
            })?;
        Ok(())
    }

    async fn list_subscriptions(&self, topic_arn: &str) -> ServiceResult<Vec<SubscriptionInfo>> {
        let mut subscriptions = Vec::new();
        let mut next_token = None;

        loop {
            let response = self
                .client
                .list_subscriptions_by_topic()
                .topic_arn(topic_arn)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| {
                    classify(
                        "ListSubscriptionsByTopic",
                        ResourceKind::Topic,
                        topic_name_from_arn(topic_arn),
                        e,
                    )
                })?;

            subscriptions.extend(response.subscriptions().iter().map(|s| SubscriptionInfo {
                subscription_arn: s.subscription_arn().unwrap_or_default().to_string(),
                protocol: s.protocol().unwrap_or_default().to_string(),
                endpoint: s.endpoint().unwrap_or_default().to_string(),
                topic_arn: s.topic_arn().unwrap_or(topic_arn).to_string(),
            }));

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(subscriptions)
    }

    async fn publish(
        &self,
        topic_arn: &str,
        message: &str,
        subject: Option<&str>,
    ) -> ServiceResult<String> {
        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .set_subject(subject.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                classify("Publish", ResourceKind::Topic, topic_name_from_arn(topic_arn), e)
            })?;

        Ok(response.message_id().unwrap_or_default().to_string())
    }

    async fn publish_batch(
        &self,
        topic_arn: &str,
        entries: Vec<PublishEntry>,
    ) -> ServiceResult<PublishBatchReport> {
        let request_entries = entries
            .into_iter()
            .map(|entry| {
                PublishBatchRequestEntry::builder()
                    .id(entry.id)
                    .message(entry.message)
                    .set_subject(entry.subject)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| build_error("PublishBatch", e))?;

        let response = self
            .client
            .publish_batch()
            .topic_arn(topic_arn)
            .set_publish_batch_request_entries(Some(request_entries))
            .send()
            .await
            .map_err(|e| {
                classify(
                    "PublishBatch",
                    ResourceKind::Topic,
                    topic_name_from_arn(topic_arn),
                    e,
                )
            })?;

        let report = PublishBatchReport {
            successful: response
                .successful()
                .iter()
                .map(|entry| PublishedEntry {
                    id: entry.id().unwrap_or_default().to_string(),
                    message_id: entry.message_id().unwrap_or_default().to_string(),
                })
                .collect(),
            failed: response
                .failed()
                .iter()
                .map(|entry| FailedPublish {
                    id: entry.id().to_string(),
                    code: entry.code().to_string(),
                    message: entry.message().map(str::to_string),
                    sender_fault: entry.sender_fault(),
                })
                .collect(),
        };

        debug!(
            successful = report.successful.len(),
            failed = report.failed.len(),
            "batch published"
        );
        Ok(report)
    }
}
