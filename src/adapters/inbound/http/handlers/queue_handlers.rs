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
            CreateQueueDto, DeleteMessageDto, EnsureResponseDto, MessageDto, MessageListDto,
            QueueDetailsDto, QueueDto, QueueListDto, ReceiveMessagesQuery, SendMessageDto,
            SentMessageDto, SuccessResponseDto,
        },
        error::{
            HandlerError, json_rejection, query_rejection, service_error, validation_error,
        },
        router::AppState,
    },
    domain::{
        errors::ValidationError,
        models::{EnsureOutcome, ReceiveOptions, SendMessageRequest},
        value_objects::QueueName,
    },
};

fn queue_name(name: String) -> Result<QueueName, HandlerError> {
    QueueName::new(name).map_err(validation_error)
}

/// Handle queue listing
pub async fn list_queues(
    State(app_state): State<AppState>,
) -> Result<Json<QueueListDto>, HandlerError> {
    let queues: Vec<QueueDto> = app_state
        .queue_service
        .list_queues()
        .await
        .map_err(service_error)?
        .into_iter()
        .map(QueueDto::from)
        .collect();

    Ok(Json(QueueListDto {
        count: queues.len(),
        queues,
    }))
}

/// Handle queue creation
pub async fn create_queue(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateQueueDto>, JsonRejection>,
) -> Result<(StatusCode, Json<EnsureResponseDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = queue_name(
        dto.queue_name
            .ok_or_else(|| validation_error(ValidationError::MissingField("queueName")))?,
    )?;

    let outcome = app_state
        .queue_service
        .create_queue(&name)
        .await
        .map_err(service_error)?;

    let (status, message) = match &outcome {
        EnsureOutcome::Created(_) => (StatusCode::CREATED, "Queue created successfully"),
        EnsureOutcome::AlreadyExists(_) => (StatusCode::OK, "Queue already exists"),
    };
    let created = outcome.is_created();
    let queue = outcome.into_inner();

    Ok((
        status,
        Json(EnsureResponseDto {
            name: queue.name,
            created,
            message: message.to_string(),
            url: Some(queue.url),
            arn: None,
        }),
    ))
}

/// Handle queue details lookup
pub async fn get_queue(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<QueueDetailsDto>, HandlerError> {
    let name = queue_name(name)?;

    let details = app_state
        .queue_service
        .get_queue(&name)
        .await
        .map_err(service_error)?;

    Ok(Json(QueueDetailsDto::from(details)))
}

pub async fn delete_queue(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let name = queue_name(name)?;

    app_state
        .queue_service
        .delete_queue(&name)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("Queue deleted successfully")))
}

/// Handle message send
pub async fn send_message(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<SendMessageDto>, JsonRejection>,
) -> Result<(StatusCode, Json<SentMessageDto>), HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = queue_name(name)?;
    let body = dto
        .message_body
        .ok_or_else(|| validation_error(ValidationError::MissingField("messageBody")))?;

    let sent = app_state
        .queue_service
        .send_message(
            &name,
            SendMessageRequest {
                body,
                delay_seconds: dto.delay_seconds,
            },
        )
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(SentMessageDto::from(sent))))
}

/// Handle message receive; parameters are clamped to the service limits
pub async fn receive_messages(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<ReceiveMessagesQuery>, QueryRejection>,
) -> Result<Json<MessageListDto>, HandlerError> {
    let Query(query) = query.map_err(query_rejection)?;
    let name = queue_name(name)?;

    let options = ReceiveOptions::clamped(
        query.max_messages,
        query.wait_time_seconds,
        query.visibility_timeout,
    );

    let messages: Vec<MessageDto> = app_state
        .queue_service
        .receive_messages(&name, options)
        .await
        .map_err(service_error)?
        .into_iter()
        .map(MessageDto::from)
        .collect();

    Ok(Json(MessageListDto {
        count: messages.len(),
        messages,
    }))
}

/// Handle message acknowledgement by receipt handle
pub async fn delete_message(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<DeleteMessageDto>, JsonRejection>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let Json(dto) = payload.map_err(json_rejection)?;
    let name = queue_name(name)?;
    let receipt_handle = dto
        .receipt_handle
        .ok_or_else(|| validation_error(ValidationError::MissingField("receiptHandle")))?;

    app_state
        .queue_service
        .delete_message(&name, &receipt_handle)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("Message deleted successfully")))
}

/// Handle queue purge; 409 while a previous purge is still in progress
pub async fn purge_queue(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponseDto>, HandlerError> {
    let name = queue_name(name)?;

    app_state
        .queue_service
        .purge_queue(&name)
        .await
        .map_err(service_error)?;

    Ok(Json(SuccessResponseDto::new("Queue purged successfully")))
}
