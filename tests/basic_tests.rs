use cloud_services_server::{
    BucketName, ObjectKey, QueueName, ReceiveOptions, ResourceKind, ServiceError, TopicName,
    create_in_memory_app,
    domain::models::{PublishEntry, PutObjectRequest, SendMessageRequest},
};

fn bucket(name: &str) -> BucketName {
    BucketName::new(name.to_string()).unwrap()
}

fn put(key: &str, data: &str) -> PutObjectRequest {
    PutObjectRequest {
        key: ObjectKey::new(key.to_string()).unwrap(),
        data: data.as_bytes().to_vec(),
        content_type: Some("text/plain".to_string()),
    }
}

#[tokio::test]
async fn basic_upload_download() {
    let services = create_in_memory_app().await.unwrap();
    let bucket = bucket("basic-bucket");

    let created = services
        .storage_service
        .ensure_bucket_exists(&bucket)
        .await
        .unwrap();
    assert!(created.is_created());

    let again = services
        .storage_service
        .ensure_bucket_exists(&bucket)
        .await
        .unwrap();
    assert!(!again.is_created());

    let uploaded = services
        .storage_service
        .upload_file(&bucket, put("docs/readme.txt", "hello world"))
        .await
        .unwrap();
    assert_eq!(uploaded.size, 11);

    let key = ObjectKey::new("docs/readme.txt".to_string()).unwrap();
    let object = services
        .storage_service
        .download_file(&bucket, &key)
        .await
        .unwrap();

    assert_eq!(object.data, b"hello world".to_vec());
    assert_eq!(object.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn basic_delete() {
    let services = create_in_memory_app().await.unwrap();
    let bucket = bucket("delete-bucket");
    services
        .storage_service
        .ensure_bucket_exists(&bucket)
        .await
        .unwrap();

    services
        .storage_service
        .upload_file(&bucket, put("a.txt", "a"))
        .await
        .unwrap();

    let key = ObjectKey::new("a.txt".to_string()).unwrap();
    services
        .storage_service
        .delete_file(&bucket, &key)
        .await
        .unwrap();

    let err = services
        .storage_service
        .delete_file(&bucket, &key)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn non_empty_bucket_requires_force() {
    let services = create_in_memory_app().await.unwrap();
    let bucket = bucket("full-bucket");
    services
        .storage_service
        .ensure_bucket_exists(&bucket)
        .await
        .unwrap();

    for i in 0..3 {
        services
            .storage_service
            .upload_file(&bucket, put(&format!("file-{i}.txt"), "x"))
            .await
            .unwrap();
    }

    let err = services
        .storage_service
        .delete_bucket(&bucket, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict { .. }));

    let report = services
        .storage_service
        .delete_bucket(&bucket, true)
        .await
        .unwrap()
        .expect("force delete reports the emptied files");
    assert_eq!(report.deleted_count, 3);
    assert!(report.failures.is_empty());

    assert!(!services.storage_service.bucket_exists(&bucket).await.unwrap());
}

#[tokio::test]
async fn delete_file_in_missing_bucket_reports_the_bucket() {
    let services = create_in_memory_app().await.unwrap();
    let key = ObjectKey::new("a.txt".to_string()).unwrap();

    let err = services
        .storage_service
        .delete_file(&bucket("no-such-bucket"), &key)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: ResourceKind::Bucket,
            ..
        }
    ));
}

#[tokio::test]
async fn delete_all_files_in_missing_bucket_is_not_found() {
    let services = create_in_memory_app().await.unwrap();

    let err = services
        .storage_service
        .delete_all_files(&bucket("missing-bucket"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn queue_send_receive_delete() {
    let services = create_in_memory_app().await.unwrap();
    let queue = QueueName::new("basic-queue".to_string()).unwrap();

    let created = services.queue_service.create_queue(&queue).await.unwrap();
    assert!(created.value().url.ends_with("/basic-queue"));

    services
        .queue_service
        .send_message(
            &queue,
            SendMessageRequest {
                body: "hello".to_string(),
                delay_seconds: None,
            },
        )
        .await
        .unwrap();

    let messages = services
        .queue_service
        .receive_messages(&queue, ReceiveOptions::default())
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body, "hello");

    services
        .queue_service
        .delete_message(&queue, &messages[0].receipt_handle)
        .await
        .unwrap();

    let details = services.queue_service.get_queue(&queue).await.unwrap();
    assert_eq!(details.approximate_message_count(), Some(0));
}

#[tokio::test]
async fn purge_twice_conflicts() {
    let services = create_in_memory_app().await.unwrap();
    let queue = QueueName::new("purged-queue".to_string()).unwrap();
    services.queue_service.create_queue(&queue).await.unwrap();

    services.queue_service.purge_queue(&queue).await.unwrap();
    let err = services.queue_service.purge_queue(&queue).await.unwrap_err();

    assert!(matches!(err, ServiceError::Conflict { .. }));
}

#[tokio::test]
async fn topic_fan_out_into_queue() {
    let services = create_in_memory_app().await.unwrap();
    let topic = TopicName::new("orders".to_string()).unwrap();
    let queue = QueueName::new("orders-audit".to_string()).unwrap();

    services.topic_service.ensure_topic_exists(&topic).await.unwrap();
    services.queue_service.create_queue(&queue).await.unwrap();

    services
        .topic_service
        .subscribe_queue(&topic, &queue, true)
        .await
        .unwrap();

    // Subscribing wires an access policy onto the queue
    let details = services.queue_service.get_queue(&queue).await.unwrap();
    assert!(details.attributes.contains_key("Policy"));

    services
        .topic_service
        .publish(&topic, "order-42", Some("created"))
        .await
        .unwrap();

    let messages = services
        .queue_service
        .receive_messages(&queue, ReceiveOptions::default())
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].body, "order-42");
}

#[tokio::test]
async fn publish_batch_size_is_validated() {
    let services = create_in_memory_app().await.unwrap();
    let topic = TopicName::new("batch-topic".to_string()).unwrap();
    services.topic_service.ensure_topic_exists(&topic).await.unwrap();

    let err = services
        .topic_service
        .publish_batch(&topic, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let entries: Vec<PublishEntry> = (0..11)
        .map(|i| PublishEntry {
            id: i.to_string(),
            message: format!("message {i}"),
            subject: None,
        })
        .collect();
    let err = services
        .topic_service
        .publish_batch(&topic, entries)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let report = services
        .topic_service
        .publish_batch(
            &topic,
            vec![PublishEntry {
                id: "only".to_string(),
                message: "one".to_string(),
                subject: None,
            }],
        )
        .await
        .unwrap();
    assert_eq!(report.successful.len(), 1);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn topic_lookup_requires_exact_name() {
    let services = create_in_memory_app().await.unwrap();
    let orders = TopicName::new("orders".to_string()).unwrap();
    services.topic_service.ensure_topic_exists(&orders).await.unwrap();

    let prefixed = TopicName::new("ord".to_string()).unwrap();
    let err = services.topic_service.get_topic(&prefixed).await.unwrap_err();
    assert!(err.is_not_found());

    let topic = services.topic_service.get_topic(&orders).await.unwrap();
    assert!(topic.arn.ends_with(":orders"));
}
