// Data models shared between the HTTP surface, the pipeline, and storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a chat message author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Returns the string representation of this role
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "system" => Ok(MessageRole::System),
            _ => Err(format!(
                "Unknown message role: '{}'. Expected one of: user, assistant, system",
                s
            )),
        }
    }
}

/// A single chat message. Immutable once created; messages are only ever
/// appended to a chat, never mutated in place. Suggestions are derived from
/// `content` on demand and never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Message {
    /// Create a new message with a fresh id and the current timestamp
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            audio_url: None,
        }
    }
}

/// A persisted conversation. Messages are append-only; `title` is derived
/// from the first user message and regenerated whenever messages change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of running the suggestion extractor over one assistant message.
/// Derived and ephemeral: recomputed from stored content on every render,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub clean_content: String,
    pub suggestions: Vec<String>,
}

impl ExtractionResult {
    /// Pass-through result for content that is not subject to extraction
    pub fn passthrough(content: &str) -> Self {
        Self {
            clean_content: content.to_string(),
            suggestions: Vec::new(),
        }
    }
}

/// Request to send a text message through the relay pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub message: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Response of the send pipeline: the stored assistant reply plus its
/// derived display form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: Message,
    pub clean_content: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

/// Request to export one message body as a paginated document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocumentRequest {
    pub message_id: String,
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
}
