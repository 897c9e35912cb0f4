mod queue_service_impl;
mod storage_service_impl;
mod topic_service_impl;

pub use queue_service_impl::QueueServiceImpl;
pub use storage_service_impl::{MAX_BATCH_DELETE, StorageServiceImpl};
pub use topic_service_impl::TopicServiceImpl;
