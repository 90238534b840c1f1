// Message send pipeline
//
// Ordering contract: the user message is appended and saved before the
// relay call, and the assistant reply is appended after it within the same
// command, so a chat's message order always matches send/receive order.

use super::lock_store;
use crate::file_storage::ChatStore;
use crate::models::{
    ExtractionResult, Message, MessageRole, SendMessageRequest, SendMessageResponse,
};
use crate::parsers;
use crate::parsers::normalize::is_valid_prompt;
use crate::webhook::WebhookClient;
use chrono::Utc;
use std::str::FromStr;
use std::sync::Mutex;

/// Send a text message through the relay pipeline: validate, append the
/// user message, call the webhook, derive suggestions, append the reply.
/// The assistant message stores the original reply text; cleaning is
/// rederived on every render.
pub async fn send_message(
    store: &Mutex<ChatStore>,
    webhook: &WebhookClient,
    request: SendMessageRequest,
) -> Result<SendMessageResponse, String> {
    let text = request.message.trim().to_string();
    if !is_valid_prompt(&text) {
        return Err("Message is required for text messages".to_string());
    }

    let chat_id = append_message(
        store,
        &request.chat_id,
        Message::new(MessageRole::User, text.clone()),
    )?;

    let reply = webhook
        .send_text(
            &text,
            request.country.as_deref(),
            request.language.as_deref(),
        )
        .await
        .map_err(|e| e.to_string())?;

    // Upstream may deliver suggestions pre-split; the extractor only runs
    // on free text
    let (clean_content, suggestions) = if reply.suggestions.is_empty() {
        let extraction = parsers::extract(&reply.message);
        (extraction.clean_content, extraction.suggestions)
    } else {
        (reply.message.clone(), reply.suggestions.clone())
    };

    let assistant = Message::new(MessageRole::Assistant, reply.message.clone());
    append_message(store, &chat_id, assistant.clone())?;

    log::debug!(
        "Stored assistant reply for chat {}: {} suggestions",
        chat_id,
        suggestions.len()
    );

    Ok(SendMessageResponse {
        message: assistant,
        clean_content,
        suggestions,
        phase: reply.phase,
    })
}

/// Rerun the extractor over stored content for the given role
pub fn extract_suggestions(role: &str, content: &str) -> Result<ExtractionResult, String> {
    let role = MessageRole::from_str(role)?;
    Ok(parsers::extract_for_role(role, content))
}

/// Append one message to a chat, creating the chat if it does not exist
/// yet. Returns the chat id actually written to.
fn append_message(
    store: &Mutex<ChatStore>,
    chat_id: &str,
    message: Message,
) -> Result<String, String> {
    let store = lock_store(store)?;

    let mut chat = match store.get_chat(chat_id) {
        Some(chat) => chat,
        None => {
            let mut chat = store.create_new_chat();
            if !chat_id.is_empty() {
                chat.id = chat_id.to_string();
            }
            chat
        }
    };

    chat.messages.push(message);
    chat.title = ChatStore::generate_chat_title(&chat.messages);
    chat.updated_at = Utc::now();
    store.save_chat(&chat)?;
    Ok(chat.id)
}
