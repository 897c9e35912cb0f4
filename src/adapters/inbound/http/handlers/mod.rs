pub mod bucket_handlers;
pub mod health_handlers;
pub mod queue_handlers;
pub mod topic_handlers;

pub use bucket_handlers::*;
pub use health_handlers::*;
pub use queue_handlers::*;
pub use topic_handlers::*;
