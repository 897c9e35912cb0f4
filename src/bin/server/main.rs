use anyhow::{Context, Result};
use clap::Parser;
use cloud_services_server::app::{AppBuilder, AppConfig, BackendKind, CloudBackend};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cloud-services-server")]
#[command(about = "REST facade over S3, SQS and SNS", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Cloud backend: localstack, aws or memory
    #[arg(long, env = "CLOUD_BACKEND", default_value = "localstack")]
    backend: String,

    /// LocalStack endpoint URL
    #[arg(long, env = "LOCALSTACK_ENDPOINT", default_value = "http://localhost:4566")]
    localstack_endpoint: String,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Static access key
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    access_key: Option<String>,

    /// Static secret key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    secret_key: Option<String>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let kind: BackendKind = self
            .backend
            .parse()
            .with_context(|| format!("Unknown cloud backend: {}", self.backend))?;

        Ok(AppConfig {
            backend: CloudBackend::from_settings(
                kind,
                Some(self.localstack_endpoint.clone()),
                Some(self.region.clone()),
                self.access_key.clone(),
                self.secret_key.clone(),
            ),
        })
    }

    fn init_logging(&self) -> Result<()> {
        let default_level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };

        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .context("Invalid log filter")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let config = cli.to_app_config()?;
    info!(backend = config.backend.name(), "Starting cloud services server");

    let app_services = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let router = app_services.router();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "cloud-services-server",
            "--port",
            "9090",
            "--backend",
            "aws",
            "--region",
            "eu-central-1",
        ]);

        assert_eq!(cli.port, 9090);
        assert_eq!(cli.backend, "aws");

        let config = cli.to_app_config().unwrap();
        assert_eq!(
            config.backend,
            CloudBackend::Aws {
                region: "eu-central-1".to_string(),
                access_key: cli.access_key.clone(),
                secret_key: cli.secret_key.clone(),
            }
        );
    }

    #[test]
    fn test_memory_config() {
        let cli = Cli::parse_from(["cloud-services-server", "--backend", "memory"]);

        let config = cli.to_app_config().unwrap();
        assert_eq!(config.backend, CloudBackend::InMemory);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let cli = Cli::parse_from(["cloud-services-server", "--backend", "azure"]);

        assert!(cli.to_app_config().is_err());
    }

    #[test]
    fn test_localstack_credential_flags() {
        let cli = Cli::parse_from([
            "cloud-services-server",
            "--backend",
            "localstack",
            "--access-key",
            "mykey",
            "--secret-key",
            "mysecret",
        ]);

        let config = cli.to_app_config().unwrap();
        let client_config = config.backend.client_config().unwrap();
        assert_eq!(client_config.access_key.as_deref(), Some("mykey"));
        assert_eq!(client_config.secret_key.as_deref(), Some("mysecret"));
    }
}
