use super::resource_name::validate_resource_name;
use crate::domain::errors::ValidationError;

/// A validated queue name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(String);

impl QueueName {
    pub const MAX_LENGTH: usize = 80;

    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_resource_name("Queue", &value, Self::MAX_LENGTH)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// FIFO queues carry the `.fifo` suffix
    pub fn is_fifo(&self) -> bool {
        self.0.ends_with(".fifo")
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
