//! In-memory adapters mirroring LocalStack's identifiers

mod in_memory_object_storage;
mod in_memory_queue_client;
mod in_memory_topic_client;

pub use in_memory_object_storage::InMemoryObjectStorage;
pub use in_memory_queue_client::InMemoryQueueClient;
pub use in_memory_topic_client::InMemoryTopicClient;

/// Account id LocalStack reports for every resource
pub(crate) const ACCOUNT_ID: &str = "000000000000";
pub(crate) const REGION: &str = "us-east-1";
