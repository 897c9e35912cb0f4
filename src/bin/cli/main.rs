use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cloud-services-cli")]
#[command(about = "CLI for interacting with the cloud services server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "CLOUD_SERVICES_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage buckets
    Buckets {
        #[command(subcommand)]
        command: BucketCommands,
    },

    /// Manage files inside a bucket
    Files {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Manage queues and messages
    Queues {
        #[command(subcommand)]
        command: QueueCommands,
    },

    /// Manage topics, subscriptions and publishing
    Topics {
        #[command(subcommand)]
        command: TopicCommands,
    },
}

#[derive(Subcommand, Debug)]
enum BucketCommands {
    /// List buckets
    List,
    /// Create a bucket if it does not exist
    Create { name: String },
    /// Delete a bucket
    Delete {
        name: String,
        /// Empty the bucket before deleting it
        #[arg(long)]
        force: bool,
    },
    /// Delete every file in a bucket
    Empty { name: String },
}

#[derive(Subcommand, Debug)]
enum FileCommands {
    /// List files
    List {
        bucket: String,
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Upload a local file
    Upload {
        bucket: String,
        /// File path to upload
        file: PathBuf,
        /// Object key; defaults to the file name
        #[arg(short, long)]
        key: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download a file
    Download {
        bucket: String,
        key: String,
        /// Output file path; defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a file
    Delete { bucket: String, key: String },
}

#[derive(Subcommand, Debug)]
enum QueueCommands {
    /// List queues
    List,
    /// Create a queue if it does not exist
    Create { name: String },
    /// Delete a queue
    Delete { name: String },
    /// Send a message
    Send {
        name: String,
        body: String,
        #[arg(long)]
        delay: Option<i32>,
    },
    /// Receive messages
    Receive {
        name: String,
        #[arg(long, default_value = "1")]
        max: i32,
        #[arg(long, default_value = "0")]
        wait: i32,
        /// Delete each message after printing it
        #[arg(long)]
        delete: bool,
    },
    /// Purge all messages
    Purge { name: String },
}

#[derive(Subcommand, Debug)]
enum TopicCommands {
    /// List topics
    List,
    /// Create a topic if it does not exist
    Create { name: String },
    /// Delete a topic
    Delete { name: String },
    /// Publish a message
    Publish {
        name: String,
        message: String,
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// Subscribe an email address
    SubscribeEmail { name: String, email: String },
    /// Subscribe a queue
    SubscribeQueue {
        name: String,
        queue: String,
        /// Deliver the message body without the notification envelope
        #[arg(long)]
        raw: bool,
    },
}

struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Send the request and return the JSON body, failing on non-2xx
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context("Request failed")?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Invalid JSON response (status {status})"))?;

        if !status.is_success() {
            anyhow::bail!(
                "{}: {}",
                status,
                body.get("message").and_then(Value::as_str).unwrap_or("request failed")
            );
        }

        Ok(body)
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a key from {}", path.display()))
}

async fn run_buckets(client: &ApiClient, command: BucketCommands) -> Result<()> {
    let body = match command {
        BucketCommands::List => client.send(client.get("/buckets")).await?,
        BucketCommands::Create { name } => {
            client
                .send(client.post("/buckets").json(&json!({ "bucketName": name })))
                .await?
        }
        BucketCommands::Delete { name, force } => {
            client
                .send(
                    client
                        .delete(&format!("/buckets/{name}"))
                        .query(&[("force", force)]),
                )
                .await?
        }
        BucketCommands::Empty { name } => {
            client
                .send(client.delete(&format!("/buckets/{name}/files")))
                .await?
        }
    };

    print_json(&body)
}

async fn run_files(client: &ApiClient, command: FileCommands) -> Result<()> {
    match command {
        FileCommands::List { bucket, prefix } => {
            let mut request = client.get(&format!("/buckets/{bucket}/files"));
            if let Some(prefix) = prefix {
                request = request.query(&[("prefix", prefix)]);
            }
            print_json(&client.send(request).await?)
        }
        FileCommands::Upload {
            bucket,
            file,
            key,
            content_type,
        } => {
            let key = match key {
                Some(key) => key,
                None => file_name(&file)?,
            };
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let mut request = client
                .put(&format!("/buckets/{bucket}/files/{key}"))
                .body(data);
            if let Some(content_type) = content_type {
                request = request.header(reqwest::header::CONTENT_TYPE, content_type);
            }
            print_json(&client.send(request).await?)
        }
        FileCommands::Download {
            bucket,
            key,
            output,
        } => {
            let response = client
                .get(&format!("/buckets/{bucket}/files/{key}"))
                .send()
                .await
                .context("Request failed")?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("{status}: {body}");
            }
            let data = response.bytes().await.context("Failed to read body")?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &data)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Downloaded {} bytes to {}", data.len(), path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
            Ok(())
        }
        FileCommands::Delete { bucket, key } => print_json(
            &client
                .send(client.delete(&format!("/buckets/{bucket}/files/{key}")))
                .await?,
        ),
    }
}

async fn run_queues(client: &ApiClient, command: QueueCommands) -> Result<()> {
    match command {
        QueueCommands::List => print_json(&client.send(client.get("/queues")).await?),
        QueueCommands::Create { name } => print_json(
            &client
                .send(client.post("/queues").json(&json!({ "queueName": name })))
                .await?,
        ),
        QueueCommands::Delete { name } => print_json(
            &client
                .send(client.delete(&format!("/queues/{name}")))
                .await?,
        ),
        QueueCommands::Send { name, body, delay } => print_json(
            &client
                .send(
                    client
                        .post(&format!("/queues/{name}/messages"))
                        .json(&json!({ "messageBody": body, "delaySeconds": delay })),
                )
                .await?,
        ),
        QueueCommands::Receive {
            name,
            max,
            wait,
            delete,
        } => {
            let body = client
                .send(
                    client
                        .get(&format!("/queues/{name}/messages"))
                        .query(&[("maxMessages", max), ("waitTimeSeconds", wait)]),
                )
                .await?;
            print_json(&body)?;

            if delete {
                let handles = body
                    .get("messages")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(|message| message.get("receiptHandle").and_then(Value::as_str));
                for handle in handles {
                    client
                        .send(
                            client
                                .delete(&format!("/queues/{name}/messages"))
                                .json(&json!({ "receiptHandle": handle })),
                        )
                        .await?;
                }
            }
            Ok(())
        }
        QueueCommands::Purge { name } => print_json(
            &client
                .send(client.post(&format!("/queues/{name}/purge")))
                .await?,
        ),
    }
}

async fn run_topics(client: &ApiClient, command: TopicCommands) -> Result<()> {
    let body = match command {
        TopicCommands::List => client.send(client.get("/topics")).await?,
        TopicCommands::Create { name } => {
            client
                .send(client.post("/topics").json(&json!({ "topicName": name })))
                .await?
        }
        TopicCommands::Delete { name } => {
            client
                .send(client.delete(&format!("/topics/{name}")))
                .await?
        }
        TopicCommands::Publish {
            name,
            message,
            subject,
        } => {
            client
                .send(
                    client
                        .post(&format!("/topics/{name}/publish"))
                        .json(&json!({ "message": message, "subject": subject })),
                )
                .await?
        }
        TopicCommands::SubscribeEmail { name, email } => {
            client
                .send(
                    client
                        .post(&format!("/topics/{name}/subscriptions/email"))
                        .json(&json!({ "email": email })),
                )
                .await?
        }
        TopicCommands::SubscribeQueue { name, queue, raw } => {
            client
                .send(
                    client
                        .post(&format!("/topics/{name}/subscriptions/sqs"))
                        .json(&json!({ "queueName": queue, "rawMessageDelivery": raw })),
                )
                .await?
        }
    };

    print_json(&body)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.url);

    match cli.command {
        Commands::Buckets { command } => run_buckets(&client, command).await,
        Commands::Files { command } => run_files(&client, command).await,
        Commands::Queues { command } => run_queues(&client, command).await,
        Commands::Topics { command } => run_topics(&client, command).await,
    }
}
