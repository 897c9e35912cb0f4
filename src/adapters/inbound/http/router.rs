use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info_span;

use super::{
    handlers::{
        create_bucket, create_queue, create_topic, delete_all_files, delete_bucket,
        delete_file, delete_message, delete_queue, delete_topic, download_file, get_bucket,
        get_queue, get_topic, list_buckets, list_files, list_queues, list_subscriptions,
        list_topics, publish, publish_batch, purge_queue, put_file, queue_health,
        receive_messages, send_message, storage_health, subscribe_email, subscribe_queue,
        topic_health, unsubscribe, upload_file,
    },
    middleware::{REQUEST_ID_HEADER, request_id},
};
use crate::ports::services::{QueueService, StorageService, TopicService};

/// Largest accepted request body, uploads included
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub storage_service: Arc<dyn StorageService>,
    pub queue_service: Arc<dyn QueueService>,
    pub topic_service: Arc<dyn TopicService>,
}

/// Create the main application router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id,
        )
    });

    Router::new()
        .merge(create_storage_router())
        .merge(create_queue_router())
        .merge(create_topic_router())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id))
                .layer(trace)
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        // Add state for dependency injection
        .with_state(state)
}

/// Bucket and file operations
pub fn create_storage_router() -> Router<AppState> {
    Router::new()
        .route("/buckets/health", get(storage_health))
        .route("/buckets", get(list_buckets).post(create_bucket))
        .route("/buckets/{name}", get(get_bucket).delete(delete_bucket))
        .route(
            "/buckets/{name}/files",
            get(list_files).post(upload_file).delete(delete_all_files),
        )
        .route(
            "/buckets/{name}/files/{*key}",
            get(download_file).put(put_file).delete(delete_file),
        )
}

/// Queue and message operations
pub fn create_queue_router() -> Router<AppState> {
    Router::new()
        .route("/queues/health", get(queue_health))
        .route("/queues", get(list_queues).post(create_queue))
        .route("/queues/{name}", get(get_queue).delete(delete_queue))
        .route(
            "/queues/{name}/messages",
            get(receive_messages)
                .post(send_message)
                .delete(delete_message),
        )
        .route("/queues/{name}/purge", post(purge_queue))
}

/// Topic, subscription and publish operations
pub fn create_topic_router() -> Router<AppState> {
    Router::new()
        .route("/topics/health", get(topic_health))
        .route("/topics", get(list_topics).post(create_topic))
        .route("/topics/{name}", get(get_topic).delete(delete_topic))
        .route(
            "/topics/{name}/subscriptions",
            get(list_subscriptions).delete(unsubscribe),
        )
        .route("/topics/{name}/subscriptions/email", post(subscribe_email))
        .route("/topics/{name}/subscriptions/sqs", post(subscribe_queue))
        .route("/topics/{name}/publish", post(publish))
        .route("/topics/{name}/publish-batch", post(publish_batch))
}
