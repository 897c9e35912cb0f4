mod bucket_name;
mod email_address;
mod object_key;
mod queue_name;
mod resource_name;
mod topic_name;

pub use bucket_name::BucketName;
pub use email_address::EmailAddress;
pub use object_key::ObjectKey;
pub use queue_name::QueueName;
pub use topic_name::{TopicName, topic_name_from_arn};
