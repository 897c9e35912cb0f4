use super::resource_name::validate_resource_name;
use crate::domain::errors::ValidationError;

/// A validated topic name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(String);

impl TopicName {
    pub const MAX_LENGTH: usize = 256;

    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_resource_name("Topic", &value, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fifo(&self) -> bool {
        self.0.ends_with(".fifo")
    }

    /// True when `arn` ends in `:<this name>`
    ///
    /// Only the whole trailing segment counts, so `order-events` does not match
    /// `...:order-events-2`.
    pub fn matches_arn(&self, arn: &str) -> bool {
        arn.rsplit(':').next() == Some(self.0.as_str())
    }
}

impl std::fmt::Display for TopicName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the topic name (last `:` segment) from an ARN
pub fn topic_name_from_arn(arn: &str) -> &str {
    arn.rsplit(':').next().unwrap_or(arn)
}
