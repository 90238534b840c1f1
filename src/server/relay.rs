//! Webhook relay endpoint
//!
//! `POST /api/webhook` forwards one chat input to the upstream webhook and
//! returns its normalized reply. Status mapping is part of the contract:
//! invalid JSON or missing text -> 400, timeout -> 408, upstream/audio
//! failures -> 500. Every body carries the `{success, ...}` envelope.

use super::ServerAppState;
use crate::webhook::{decode_audio_data_url, WebhookError, WebhookReply};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Relay one message to the upstream webhook
pub async fn relay_handler(State(state): State<ServerAppState>, body: String) -> Response {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Relay request with invalid JSON: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON in request body");
        }
    };

    let audio_data = if payload.get("type").and_then(Value::as_str) == Some("voice") {
        payload.get("audioData").and_then(Value::as_str)
    } else {
        None
    };

    let result = match audio_data {
        Some(audio_data) => relay_voice(&state, &payload, audio_data).await,
        None => relay_text(&state, &payload).await,
    };

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            log::warn!("Relay failed: {}", e);
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, &e.to_string())
        }
    }
}

async fn relay_text(state: &ServerAppState, payload: &Value) -> Result<Value, WebhookError> {
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            WebhookError::InvalidInput("Message is required for text messages".to_string())
        })?;

    let reply = state
        .webhook
        .send_text(
            message,
            payload.get("country").and_then(Value::as_str),
            payload.get("language").and_then(Value::as_str),
        )
        .await?;

    Ok(success_body(&reply, true))
}

async fn relay_voice(
    state: &ServerAppState,
    payload: &Value,
    audio_data: &str,
) -> Result<Value, WebhookError> {
    let audio = decode_audio_data_url(audio_data)?;
    log::debug!("Decoded voice payload: {} bytes", audio.len());

    let message = payload.get("message").and_then(Value::as_str).unwrap_or("");

    let reply = state
        .webhook
        .send_voice(
            message,
            audio,
            payload.get("country").and_then(Value::as_str),
            payload.get("language").and_then(Value::as_str),
        )
        .await?;

    Ok(success_body(&reply, false))
}

fn success_body(reply: &WebhookReply, include_suggestions: bool) -> Value {
    let mut body = json!({
        "success": true,
        "message": reply.message,
        "phase": reply.phase,
        "data": reply.data,
    });
    if include_suggestions {
        body["suggestions"] = json!(reply.suggestions);
    }
    body
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
