use axum::Router;
use std::{str::FromStr, sync::Arc};
use tracing::info;

use crate::{
    adapters::{
        inbound::http::{AppState, create_router},
        outbound::{
            aws::{AwsAdapters, AwsClientConfig},
            memory::{InMemoryObjectStorage, InMemoryQueueClient, InMemoryTopicClient},
        },
    },
    ports::{
        messaging::QueueClient,
        services::{QueueService, StorageService, TopicService},
    },
    services::{QueueServiceImpl, StorageServiceImpl, TopicServiceImpl},
};

pub const DEFAULT_LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_REGION: &str = "us-east-1";
/// LocalStack accepts any credentials; `test` is its convention
pub const DEFAULT_LOCALSTACK_CREDENTIAL: &str = "test";

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub backend: CloudBackend,
}

/// Which cloud the services talk to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CloudBackend {
    /// Process-local emulation of S3, SQS and SNS
    #[default]
    InMemory,
    LocalStack {
        endpoint: String,
        region: String,
        access_key: String,
        secret_key: String,
    },
    Aws {
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
    },
}

/// Backend selector as given on the command line or in `CLOUD_BACKEND`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InMemory,
    LocalStack,
    Aws,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(Self::InMemory),
            "localstack" => Ok(Self::LocalStack),
            "aws" => Ok(Self::Aws),
            other => Err(AppError::Configuration {
                message: format!(
                    "unknown backend '{other}', expected one of: localstack, aws, memory"
                ),
            }),
        }
    }
}

impl CloudBackend {
    /// Assemble a backend from loosely typed settings
    ///
    /// Missing values fall back to LocalStack's defaults, including `test`
    /// for either key. For `aws`, static credentials are used only when both
    /// keys are given.
    pub fn from_settings(
        kind: BackendKind,
        endpoint: Option<String>,
        region: Option<String>,
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        let region = region.unwrap_or_else(|| DEFAULT_REGION.to_string());

        match kind {
            BackendKind::InMemory => Self::InMemory,
            BackendKind::LocalStack => Self::LocalStack {
                endpoint: endpoint.unwrap_or_else(|| DEFAULT_LOCALSTACK_ENDPOINT.to_string()),
                region,
                access_key: access_key
                    .unwrap_or_else(|| DEFAULT_LOCALSTACK_CREDENTIAL.to_string()),
                secret_key: secret_key
                    .unwrap_or_else(|| DEFAULT_LOCALSTACK_CREDENTIAL.to_string()),
            },
            BackendKind::Aws => Self::Aws {
                region,
                access_key,
                secret_key,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::LocalStack { .. } => "localstack",
            Self::Aws { .. } => "aws",
        }
    }

    /// SDK client settings; `None` for the in-memory backend
    pub fn client_config(&self) -> Option<AwsClientConfig> {
        match self {
            Self::InMemory => None,
            Self::LocalStack {
                endpoint,
                region,
                access_key,
                secret_key,
            } => Some(
                AwsClientConfig::localstack(endpoint.clone(), region.clone())
                    .with_credentials(access_key.clone(), secret_key.clone()),
            ),
            Self::Aws {
                region,
                access_key,
                secret_key,
            } => {
                let config = AwsClientConfig::aws(region.clone());
                Some(match (access_key, secret_key) {
                    (Some(access_key), Some(secret_key)) => {
                        config.with_credentials(access_key.clone(), secret_key.clone())
                    }
                    _ => config,
                })
            }
        }
    }
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub storage_service: Arc<dyn StorageService>,
    pub queue_service: Arc<dyn QueueService>,
    pub topic_service: Arc<dyn TopicService>,
}

impl AppServices {
    /// Shared state for the HTTP handlers
    pub fn app_state(&self) -> AppState {
        AppState {
            storage_service: self.storage_service.clone(),
            queue_service: self.queue_service.clone(),
            topic_service: self.topic_service.clone(),
        }
    }

    /// The fully layered HTTP router
    pub fn router(&self) -> Router {
        create_router(self.app_state())
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: CloudBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        info!(backend = self.config.backend.name(), "building application services");

        match self.config.backend.client_config() {
            None => Ok(Self::in_memory_services()),
            Some(client_config) => Ok(Self::aws_services(&client_config).await),
        }
    }

    fn in_memory_services() -> AppServices {
        let queues = Arc::new(InMemoryQueueClient::new());
        let topics = Arc::new(InMemoryTopicClient::new().with_queue_delivery(queues.clone()));

        AppServices {
            storage_service: Arc::new(StorageServiceImpl::new(Arc::new(
                InMemoryObjectStorage::new(),
            ))),
            queue_service: Arc::new(QueueServiceImpl::new(queues.clone())),
            topic_service: Arc::new(TopicServiceImpl::new(topics, queues)),
        }
    }

    async fn aws_services(client_config: &AwsClientConfig) -> AppServices {
        let adapters = AwsAdapters::connect(client_config).await;
        let queues: Arc<dyn QueueClient> = Arc::new(adapters.queues);

        AppServices {
            storage_service: Arc::new(StorageServiceImpl::new(Arc::new(adapters.storage))),
            queue_service: Arc::new(QueueServiceImpl::new(queues.clone())),
            topic_service: Arc::new(TopicServiceImpl::new(Arc::new(adapters.topics), queues)),
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(CloudBackend::InMemory)
        .build()
        .await
}

/// Create a LocalStack-backed application with the `test` credentials
pub async fn create_localstack_app(
    endpoint: String,
    region: String,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(CloudBackend::from_settings(
            BackendKind::LocalStack,
            Some(endpoint),
            Some(region),
            None,
            None,
        ))
        .build()
        .await
}

/// Create an application against real AWS
pub async fn create_aws_app(
    region: String,
    access_key: Option<String>,
    secret_key: Option<String>,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(CloudBackend::Aws {
            region,
            access_key,
            secret_key,
        })
        .build()
        .await
}

/// Resolve the backend from `CLOUD_BACKEND`, `LOCALSTACK_ENDPOINT`,
/// `AWS_REGION`, `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
pub fn backend_from_env() -> Result<CloudBackend, AppError> {
    let kind = match std::env::var("CLOUD_BACKEND") {
        Ok(value) => value.parse()?,
        Err(_) => BackendKind::LocalStack,
    };

    Ok(CloudBackend::from_settings(
        kind,
        std::env::var("LOCALSTACK_ENDPOINT").ok(),
        std::env::var("AWS_REGION").ok(),
        std::env::var("AWS_ACCESS_KEY_ID").ok(),
        std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
    ))
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_backend(backend_from_env()?)
        .build()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{BucketName, QueueName};

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::InMemory);
        assert_eq!(
            "LocalStack".parse::<BackendKind>().unwrap(),
            BackendKind::LocalStack
        );
        assert_eq!("aws".parse::<BackendKind>().unwrap(), BackendKind::Aws);
        assert!("gcp".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_localstack_defaults() {
        let backend =
            CloudBackend::from_settings(BackendKind::LocalStack, None, None, None, None);

        assert_eq!(
            backend,
            CloudBackend::LocalStack {
                endpoint: DEFAULT_LOCALSTACK_ENDPOINT.to_string(),
                region: DEFAULT_REGION.to_string(),
                access_key: "test".to_string(),
                secret_key: "test".to_string(),
            }
        );

        let config = backend.client_config().unwrap();
        assert!(config.force_path_style());
        assert_eq!(config.access_key.as_deref(), Some("test"));
    }

    #[test]
    fn test_localstack_uses_supplied_credentials() {
        let backend = CloudBackend::from_settings(
            BackendKind::LocalStack,
            Some("http://localstack:4566".to_string()),
            None,
            Some("mykey".to_string()),
            Some("mysecret".to_string()),
        );

        let config = backend.client_config().unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localstack:4566"));
        assert_eq!(config.access_key.as_deref(), Some("mykey"));
        assert_eq!(config.secret_key.as_deref(), Some("mysecret"));

        // A single key only replaces its own half of the default pair
        let backend = CloudBackend::from_settings(
            BackendKind::LocalStack,
            None,
            None,
            Some("mykey".to_string()),
            None,
        );
        let config = backend.client_config().unwrap();
        assert_eq!(config.access_key.as_deref(), Some("mykey"));
        assert_eq!(config.secret_key.as_deref(), Some("test"));
    }

    #[test]
    fn test_aws_requires_both_keys_for_static_credentials() {
        let backend = CloudBackend::from_settings(
            BackendKind::Aws,
            None,
            Some("eu-west-1".to_string()),
            Some("AKIA".to_string()),
            None,
        );

        let config = backend.client_config().unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert!(config.access_key.is_none());
        assert!(!config.force_path_style());
    }

    #[test]
    fn test_in_memory_has_no_client_config() {
        assert!(CloudBackend::InMemory.client_config().is_none());
        assert_eq!(CloudBackend::InMemory.name(), "memory");
    }

    #[tokio::test]
    async fn test_create_in_memory_app() {
        let app = create_in_memory_app().await.unwrap();

        app.storage_service.health_check().await.unwrap();
        app.queue_service.health_check().await.unwrap();
        app.topic_service.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_app_builder_shares_state_between_handles() {
        let app = AppBuilder::new().build().await.unwrap();
        let state = app.app_state();

        let bucket = BucketName::new("shared-bucket".to_string()).unwrap();
        app.storage_service.ensure_bucket_exists(&bucket).await.unwrap();
        assert!(state.storage_service.bucket_exists(&bucket).await.unwrap());

        let queue = QueueName::new("shared-queue".to_string()).unwrap();
        state.queue_service.create_queue(&queue).await.unwrap();
        assert_eq!(app.queue_service.list_queues().await.unwrap().len(), 1);
    }
}
