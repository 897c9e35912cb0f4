mod queue_service;
mod storage_service;
mod topic_service;

pub use queue_service::QueueService;
pub use storage_service::StorageService;
pub use topic_service::TopicService;
