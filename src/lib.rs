pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    // Value objects
    BucketName,
    EmailAddress,
    // Models
    EmptyBucketReport,
    EnsureOutcome,
    ObjectKey,
    PublishBatchReport,
    PublishEntry,
    QueueDetails,
    QueueName,
    QueueSummary,
    ReceiveOptions,
    ReceivedMessage,
    // Errors
    ResourceKind,
    ServiceError,
    ServiceResult,
    SubscriptionInfo,
    TopicName,
    TopicSummary,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    // Client ports
    ObjectStorageClient,
    QueueClient,
    // Service ports
    QueueService,
    StorageService,
    TopicClient,
    TopicService,
};

// Service implementations - business logic
pub use services::{QueueServiceImpl, StorageServiceImpl, TopicServiceImpl};

// Application factory and configuration
pub use app::{
    AppBuilder, AppConfig, AppError, AppServices, BackendKind, CloudBackend,
    create_app_from_env, create_aws_app, create_in_memory_app, create_localstack_app,
};

// Adapter types - infrastructure implementations
pub use adapters::inbound::http::{AppState, create_router};
pub use adapters::outbound::{
    aws::{AwsAdapters, AwsClientConfig, S3Adapter, SnsAdapter, SqsAdapter},
    memory::{InMemoryObjectStorage, InMemoryQueueClient, InMemoryTopicClient},
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AppBuilder, AppServices, BucketName, CloudBackend, EnsureOutcome, ObjectKey,
        QueueName, QueueService, ServiceError, StorageService, TopicName, TopicService,
        create_app_from_env, create_in_memory_app, create_localstack_app,
    };
}
