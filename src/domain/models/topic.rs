use crate::domain::value_objects::topic_name_from_arn;

/// Maximum number of entries in one batch publish
pub const MAX_PUBLISH_BATCH: usize = 10;

/// A topic as reported by the pub/sub service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSummary {
    pub name: String,
    pub arn: String,
}

impl TopicSummary {
    pub fn from_arn(arn: impl Into<String>) -> Self {
        let arn = arn.into();
        Self {
            name: topic_name_from_arn(&arn).to_string(),
            arn,
        }
    }
}

/// One page of topic ARNs
#[derive(Debug, Clone, Default)]
pub struct TopicPage {
    pub arns: Vec<String>,
    pub next_token: Option<String>,
}

/// Delivery protocol of a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionProtocol {
    Email,
    Sqs,
    Other(String),
}

impl SubscriptionProtocol {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionProtocol::Email => "email",
            SubscriptionProtocol::Sqs => "sqs",
            SubscriptionProtocol::Other(other) => other,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "email" => SubscriptionProtocol::Email,
            "sqs" => SubscriptionProtocol::Sqs,
            other => SubscriptionProtocol::Other(other.to_string()),
        }
    }
}

/// Request to register a delivery endpoint on a topic
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    pub protocol: SubscriptionProtocol,
    pub endpoint: String,
    pub raw_message_delivery: bool,
}

/// A subscription as reported by the pub/sub service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    /// `PendingConfirmation` until an email endpoint confirms
    pub subscription_arn: String,
    pub protocol: String,
    pub endpoint: String,
    pub topic_arn: String,
}

/// A single message to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishEntry {
    pub id: String,
    pub message: String,
    pub subject: Option<String>,
}

/// A batch entry the service accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEntry {
    pub id: String,
    pub message_id: String,
}

/// A batch entry the service rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPublish {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    pub sender_fault: bool,
}

/// Per-entry outcome of a batch publish
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishBatchReport {
    pub successful: Vec<PublishedEntry>,
    pub failed: Vec<FailedPublish>,
}
