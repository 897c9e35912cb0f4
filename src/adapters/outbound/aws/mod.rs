//! AWS SDK adapters for S3, SQS and SNS
//!
//! The same adapters serve LocalStack and real AWS; only the SDK
//! configuration built by [`AwsClientConfig`] differs.

mod error;
mod s3_adapter;
mod sns_adapter;
mod sqs_adapter;

pub use s3_adapter::S3Adapter;
pub use sns_adapter::SnsAdapter;
pub use sqs_adapter::SqsAdapter;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tracing::{debug, info};

/// Connection settings shared by the three SDK clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsClientConfig {
    pub region: String,
    /// Custom endpoint (LocalStack); `None` uses the public AWS endpoints
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl AwsClientConfig {
    /// LocalStack at `endpoint` with its conventional `test`/`test` credentials
    pub fn localstack(endpoint: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: Some(endpoint.into()),
            access_key: Some("test".to_string()),
            secret_key: Some("test".to_string()),
        }
    }

    /// Real AWS using the default credential provider chain
    pub fn aws(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            access_key: None,
            secret_key: None,
        }
    }

    /// Use static credentials instead of the provider chain
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// S3 path-style addressing is required whenever a custom endpoint is used
    pub fn force_path_style(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Resolve the shared SDK configuration
    pub async fn load(&self) -> SdkConfig {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));

        if let Some(endpoint) = &self.endpoint {
            debug!(endpoint = %endpoint, "using custom endpoint");
            loader = loader.endpoint_url(endpoint);
        }

        // Static credentials only when both halves are present
        if let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "cloud-services-server",
            ));
        }

        let config = loader.load().await;
        info!(region = %self.region, "AWS SDK configuration loaded");
        config
    }
}

/// The three SDK-backed adapters built from one configuration
pub struct AwsAdapters {
    pub storage: S3Adapter,
    pub queues: SqsAdapter,
    pub topics: SnsAdapter,
}

impl AwsAdapters {
    pub async fn connect(config: &AwsClientConfig) -> Self {
        let sdk_config = config.load().await;

        Self {
            storage: S3Adapter::from_sdk_config(&sdk_config, config.force_path_style()),
            queues: SqsAdapter::from_sdk_config(&sdk_config),
            topics: SnsAdapter::from_sdk_config(&sdk_config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localstack_defaults() {
        let config = AwsClientConfig::localstack("http://localhost:4566", "us-east-1");

        assert_eq!(config.access_key.as_deref(), Some("test"));
        assert_eq!(config.secret_key.as_deref(), Some("test"));
        assert!(config.force_path_style());
    }

    #[test]
    fn test_aws_uses_provider_chain() {
        let config = AwsClientConfig::aws("eu-west-1");
        assert!(config.access_key.is_none());
        assert!(!config.force_path_style());

        let config = config.with_credentials("AKIA", "secret");
        assert_eq!(config.access_key.as_deref(), Some("AKIA"));
    }
}
