use crate::chat;
use crate::errors::ApiError;
use crate::wire::{ChatReply, ChatRequest};
use axum::{Json, extract::rejection::JsonRejection};

pub async fn reply(
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    let (topic, reply) = chat::reply(message, &mut rand::thread_rng());
    tracing::debug!(?topic, "chat reply");

    Ok(Json(ChatReply {
        success: true,
        topic,
        reply: reply.to_string(),
    }))
}
