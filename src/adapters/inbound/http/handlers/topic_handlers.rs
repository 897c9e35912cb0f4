use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};

use crate::{
    adapters::inbound::http::{
        dto::{
            CreateTopicDto, EmailSubscriptionDto, EnsureResponseDto, PublishBatchDto,
            PublishBatchResponseDto, PublishDto, PublishResponseDto, SqsSubscriptionDto,
            SubscriptionCreatedDto, SubscriptionDto, SubscriptionListDto, SuccessResponseDto,
            TopicDto, TopicListDto, UnsubscribeQuery,
        },
        error::{
            HandlerError, json_rejection, query_rejection, service_error, validation_error,
        },
        router::AppState,
    },
    domain::{
        errors::ValidationError,
        models::EnsureOutcome,
        value_objects::{EmailAddress, QueueName, TopicName},
    },
};

fn topic_name(name: String) -> Result<TopicName, HandlerError> {
    TopicName::new(name).map_err(validation_error)
}

/// Handle topic listing
pub async fn list_topics(
    State(app_state): State<AppState>,
) -> Result<Json<TopicListDto>, HandlerError> {
    let topics: Vec<TopicDto> = app_state
        .topic_service
        .list_topics()
        .await
        .map_err(service_error)?
        .into_iter()
        .map(TopicDto::from)
        .collect();

    Ok(Json(TopicListDto {
        count: topics.len(),
        topics,
    }))
}

/// Handle topic creation; an existing topic is reported with 200
pub async fn create_topic(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateTopicDto>, JsonRejection>,
) -> Result<(StatusCode, Json<EnsureResponseDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = topic_name(
        dto.topic_name
            .ok_or_else(|| validation_error(ValidationError::MissingField("topicName")))?,
    )?;

    let outcome = app_state
        .topic_service
        .ensure_topic_exists(&name)
        .await
        .map_err(service_error)?;

    let (status, message) = match &outcome {
        EnsureOutcome::Created(_) => (StatusCode::CREATED, "Topic created successfully"),
        EnsureOutcome::AlreadyExists(_) => (StatusCode::OK, "Topic already exists"),
    };
    let created = outcome.is_created();
    let topic = outcome.into_inner();

    Ok((
        status,
        Json(EnsureResponseDto {
            name: topic.name,
            created,
            message: message.to_string(),
            url: None,
            arn: Some(topic.arn),
        }),
    ))
}

pub async fn get_topic(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TopicDto>, HandlerError> {
    let name = topic_name(name)?;

    let topic = app_state
        .topic_service
        .get_topic(&name)
        .await
        .map_err(service_error)?;

    Ok(Json(TopicDto::from(topic)))
}

pub async fn delete_topic(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let name = topic_name(name)?;

    app_state
        .topic_service
        .delete_topic(&name)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("Topic deleted successfully")))
}

/// Handle subscription listing
pub async fn list_subscriptions(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SubscriptionListDto>, HandlerError> {
    let name = topic_name(name)?;

    let subscriptions: Vec<SubscriptionDto> = app_state
        .topic_service
        .list_subscriptions(&name)
        .await
        .map_err(service_error)?
        .into_iter()
        .map(SubscriptionDto::from)
        .collect();

    Ok(Json(SubscriptionListDto {
        topic: name.as_str().to_string(),
        count: subscriptions.len(),
        subscriptions,
    }))
}

/// Handle email subscription
pub async fn subscribe_email(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<EmailSubscriptionDto>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionCreatedDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = topic_name(name)?;
    let email = EmailAddress::new(
        dto.email
            .ok_or_else(|| validation_error(ValidationError::MissingField("email")))?,
    )
    .map_err(validation_error)?;

    let subscription_arn = app_state
        .topic_service
        .subscribe_email(&name, &email)
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreatedDto {
            topic: name.as_str().to_string(),
            protocol: "email".to_string(),
            endpoint: email.as_str().to_string(),
            subscription_arn,
        }),
    ))
}

/// Handle queue subscription, including the queue policy wiring
pub async fn subscribe_queue(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<SqsSubscriptionDto>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionCreatedDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = topic_name(name)?;
    let queue = QueueName::new(
        dto.queue_name
            .ok_or_else(|| validation_error(ValidationError::MissingField("queueName")))?,
    )
    .map_err(validation_error)?;

    let subscription_arn = app_state
        .topic_service
        .subscribe_queue(&name, &queue, dto.raw_message_delivery.unwrap_or(false))
        .await
        .map_err(service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreatedDto {
            topic: name.as_str().to_string(),
            protocol: "sqs".to_string(),
            endpoint: queue.as_str().to_string(),
            subscription_arn,
        }),
    ))
}

/// Handle unsubscribe by `?subscriptionArn=`
pub async fn unsubscribe(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<UnsubscribeQuery>, QueryRejection>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let Query(query) = query.map_err(query_rejection)?;
    let name = topic_name(name)?;
    let subscription_arn = query
        .subscription_arn
        .ok_or_else(|| validation_error(ValidationError::MissingField("subscriptionArn")))?;

    app_state
        .topic_service
        .unsubscribe(&name, &subscription_arn)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("Unsubscribed successfully")))
}

/// Handle single publish
pub async fn publish(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<PublishDto>, JsonRejection>,
) -> Result<Json<PublishResponseDto>, HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = topic_name(name)?;
    let message = dto
        .message
        .ok_or_else(|| validation_error(ValidationError::MissingField("message")))?;

    let message_id = app_state
        .topic_service
        .publish(&name, &message, dto.subject.as_deref())
        .await
        .map_err(service_error)?;

    Ok(Json(PublishResponseDto { message_id }))
}

/// Handle batch publish of one to ten messages
pub async fn publish_batch(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<PublishBatchDto>, JsonRejection>,
) -> Result<Json<PublishBatchResponseDto>, HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = topic_name(name)?;

    let report = app_state
        .topic_service
        .publish_batch(&name, dto.into_entries())
        .await
        .map_err(service_error)?;

    Ok(Json(PublishBatchResponseDto::from(report)))
}
