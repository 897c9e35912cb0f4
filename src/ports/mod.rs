pub mod messaging;
pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use messaging::{QueueClient, TopicClient};
pub use services::{QueueService, StorageService, TopicService};
pub use storage::ObjectStorageClient;
