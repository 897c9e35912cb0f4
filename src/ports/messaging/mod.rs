mod queue_client;
mod topic_client;

pub use queue_client::QueueClient;
pub use topic_client::TopicClient;
