//! Upstream webhook client
//!
//! Forwards chat input to the external workflow-automation webhook and
//! normalizes its free-form reply envelope. The reply text may arrive at
//! `output`, `output.output`, `output.message`, `message`, or `response`;
//! suggestions may arrive pre-split at `output.suggestions`.

use base64::Engine;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Error taxonomy for the relay path. `status_code` gives the
/// HTTP-equivalent status surfaced to the client.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Bad or missing input on the relay request
    #[error("{0}")]
    InvalidInput(String),

    /// Audio payload could not be decoded
    #[error("Audio processing failed: {0}")]
    Media(String),

    /// Upstream returned a non-2xx status
    #[error("Webhook request failed: {status} - {body}")]
    Upstream { status: u16, body: String },

    /// The 5-minute request budget was exceeded
    #[error("Request timed out after 5 minutes. Please try again.")]
    Timeout,

    /// Connection-level failure talking to the upstream
    #[error("{0}")]
    Transport(String),
}

impl WebhookError {
    /// HTTP-equivalent status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::InvalidInput(_) => 400,
            WebhookError::Timeout => 408,
            WebhookError::Media(_) | WebhookError::Upstream { .. } | WebhookError::Transport(_) => {
                500
            }
        }
    }
}

/// Normalized upstream reply
#[derive(Debug, Clone)]
pub struct WebhookReply {
    pub message: String,
    pub suggestions: Vec<String>,
    pub phase: Option<String>,
    /// The raw upstream envelope, passed through to clients
    pub data: Value,
}

/// JSON payload for text-mode requests
#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    message: &'a str,
    timestamp: String,
    country: &'a str,
    language: &'a str,
}

/// Client for the upstream workflow webhook
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Build a client with the shared request timeout applied to every call
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a text message. Country/language default upstream to "Unknown".
    pub async fn send_text(
        &self,
        message: &str,
        country: Option<&str>,
        language: Option<&str>,
    ) -> Result<WebhookReply, WebhookError> {
        let payload = TextPayload {
            kind: "text",
            message,
            timestamp: Utc::now().to_rfc3339(),
            country: country.unwrap_or("Unknown"),
            language: language.unwrap_or("Unknown"),
        };

        log::debug!(
            "Sending text message to webhook: {} chars, country={}, language={}",
            message.chars().count(),
            payload.country,
            payload.language
        );

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(map_send_error)?;

        let data = read_envelope(response).await?;
        Ok(parse_text_reply(data))
    }

    /// Send a voice message with its recorded clip as a multipart form
    pub async fn send_voice(
        &self,
        message: &str,
        audio: Vec<u8>,
        country: Option<&str>,
        language: Option<&str>,
    ) -> Result<WebhookReply, WebhookError> {
        log::debug!(
            "Sending voice message to webhook: {} audio bytes, country={:?}, language={:?}",
            audio.len(),
            country,
            language
        );

        let audio_part = reqwest::multipart::Part::bytes(audio)
            .file_name("voice")
            .mime_str("audio/webm")
            .map_err(|e| WebhookError::Media(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("type", "voice")
            .text("message", message.to_string())
            .text("timestamp", Utc::now().to_rfc3339());
        if let Some(country) = country {
            form = form.text("country", country.to_string());
        }
        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }
        let form = form.part("audio", audio_part);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(map_send_error)?;

        let data = read_envelope(response).await?;
        Ok(parse_voice_reply(data))
    }
}

/// Decode a base64 audio data-URL (`data:audio/webm;base64,<data>`). The
/// part after the first comma is the payload.
pub fn decode_audio_data_url(audio_data: &str) -> Result<Vec<u8>, WebhookError> {
    let encoded = audio_data
        .split_once(',')
        .map(|(_, rest)| rest)
        .ok_or_else(|| WebhookError::Media("Invalid base64 audio data".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| WebhookError::Media(format!("Invalid base64 audio data: {}", e)))
}

fn map_send_error(e: reqwest::Error) -> WebhookError {
    if e.is_timeout() {
        log::warn!("Webhook timeout after 5 minutes");
        WebhookError::Timeout
    } else {
        WebhookError::Transport(e.to_string())
    }
}

/// Read the upstream body: JSON envelopes parse as-is, anything else is
/// wrapped as `{"message": <body>}`
async fn read_envelope(response: reqwest::Response) -> Result<Value, WebhookError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let body = response.text().await.map_err(map_send_error)?;

    if !status.is_success() {
        log::warn!("Webhook response error: {} - {}", status.as_u16(), body);
        return Err(WebhookError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    if is_json {
        serde_json::from_str(&body)
            .map_err(|e| WebhookError::Transport(format!("Malformed webhook response: {}", e)))
    } else {
        Ok(serde_json::json!({ "message": body }))
    }
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

/// Normalize a text-mode reply envelope
fn parse_text_reply(data: Value) -> WebhookReply {
    let (message, suggestions) = match data.get("output") {
        Some(output) if output.is_object() => {
            let message = string_at(output, "output")
                .or_else(|| string_at(output, "message"))
                .unwrap_or_else(|| "Response received".to_string());
            let suggestions = output
                .get("suggestions")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            (message, suggestions)
        }
        _ => {
            let message = string_at(&data, "output")
                .or_else(|| string_at(&data, "message"))
                .or_else(|| string_at(&data, "response"))
                .unwrap_or_else(|| "Response received".to_string());
            (message, Vec::new())
        }
    };

    WebhookReply {
        message,
        suggestions,
        phase: string_at(&data, "phase"),
        data,
    }
}

/// Normalize a voice-mode reply envelope
fn parse_voice_reply(data: Value) -> WebhookReply {
    let message = string_at(&data, "output")
        .or_else(|| string_at(&data, "message"))
        .or_else(|| string_at(&data, "response"))
        .unwrap_or_else(|| "Voice message sent".to_string());

    WebhookReply {
        message,
        suggestions: Vec::new(),
        phase: string_at(&data, "phase"),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_reply_nested_output() {
        let reply = parse_text_reply(json!({
            "output": {
                "output": "Here you go",
                "suggestions": ["one", "two"]
            },
            "phase": "research"
        }));

        assert_eq!(reply.message, "Here you go");
        assert_eq!(reply.suggestions, vec!["one", "two"]);
        assert_eq!(reply.phase.as_deref(), Some("research"));
    }

    #[test]
    fn test_parse_text_reply_nested_message_field() {
        let reply = parse_text_reply(json!({"output": {"message": "hi"}}));
        assert_eq!(reply.message, "hi");
        assert!(reply.suggestions.is_empty());
    }

    #[test]
    fn test_parse_text_reply_flat_output() {
        let reply = parse_text_reply(json!({"output": "flat text"}));
        assert_eq!(reply.message, "flat text");
        assert!(reply.suggestions.is_empty());
    }

    #[test]
    fn test_parse_text_reply_message_and_response_fields() {
        assert_eq!(
            parse_text_reply(json!({"message": "from message"})).message,
            "from message"
        );
        assert_eq!(
            parse_text_reply(json!({"response": "from response"})).message,
            "from response"
        );
    }

    #[test]
    fn test_parse_text_reply_defaults() {
        let reply = parse_text_reply(json!({"something": "else"}));
        assert_eq!(reply.message, "Response received");
        assert!(reply.suggestions.is_empty());
        assert!(reply.phase.is_none());
    }

    #[test]
    fn test_parse_voice_reply_default() {
        let reply = parse_voice_reply(json!({}));
        assert_eq!(reply.message, "Voice message sent");
    }

    #[test]
    fn test_parse_voice_reply_prefers_output() {
        let reply = parse_voice_reply(json!({"output": "transcribed", "message": "other"}));
        assert_eq!(reply.message, "transcribed");
    }

    #[test]
    fn test_decode_audio_data_url() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let data_url = format!("data:audio/webm;base64,{}", encoded);
        assert_eq!(decode_audio_data_url(&data_url).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_audio_data_url_missing_payload() {
        let err = decode_audio_data_url("no-comma-here").unwrap_err();
        assert!(matches!(err, WebhookError::Media(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::InvalidInput("x".to_string()).status_code(),
            400
        );
        assert_eq!(WebhookError::Timeout.status_code(), 408);
        assert_eq!(
            WebhookError::Upstream {
                status: 502,
                body: "bad".to_string()
            }
            .status_code(),
            500
        );
    }
}
