//! Chat transcript storage
//!
//! Layout under the data directory:
//! - `chats/{id}.json`       one versioned file per chat
//! - `chats/index.json`      ordering + listing metadata (front-insert)
//! - `current-chat.json`     pointer to the active chat
//!
//! A store constructed with `ChatStore::disabled()` has no data directory;
//! every operation is a no-op returning empty/default values. This covers
//! non-interactive environments where persistence is unavailable.

use super::{ensure_dir, read_json, write_json, FileResult};
use crate::models::{Chat, Message, MessageRole};
use crate::utils::generate_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Version of the chat file format
const CHAT_FILE_VERSION: u32 = 1;

/// Version of the index file format
const INDEX_VERSION: u32 = 1;

/// Titles derived from the first user message are capped at this many
/// characters before the ellipsis
const TITLE_MAX_CHARS: usize = 50;

/// Chat file wrapper with format version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatFile {
    version: u32,
    updated_at: DateTime<Utc>,
    chat: Chat,
}

impl ChatFile {
    fn from_chat(chat: &Chat) -> Self {
        Self {
            version: CHAT_FILE_VERSION,
            updated_at: chat.updated_at,
            chat: chat.clone(),
        }
    }
}

/// Chat index entry (minimal info for listing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIndexEntry {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
}

/// Chat index file: entries in listing order, most recently created first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatIndex {
    version: u32,
    updated_at: DateTime<Utc>,
    entries: Vec<ChatIndexEntry>,
}

impl Default for ChatIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            updated_at: Utc::now(),
            entries: Vec::new(),
        }
    }
}

/// Current-chat pointer file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentChat {
    chat_id: String,
}

/// Transcript persistence surface
pub struct ChatStore {
    root: Option<PathBuf>,
}

impl ChatStore {
    /// Create a store rooted at the given data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Create a store with no backing directory; every call is a no-op
    /// returning empty/default values
    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    fn chats_dir(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("chats"))
    }

    fn chat_path(&self, chat_id: &str) -> Option<PathBuf> {
        self.chats_dir().map(|dir| dir.join(format!("{}.json", chat_id)))
    }

    fn index_path(&self) -> Option<PathBuf> {
        self.chats_dir().map(|dir| dir.join("index.json"))
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("current-chat.json"))
    }

    fn read_index(&self) -> ChatIndex {
        let Some(path) = self.index_path() else {
            return ChatIndex::default();
        };
        if !path.exists() {
            return ChatIndex::default();
        }
        match read_json::<ChatIndex>(&path) {
            Ok(index) => index,
            Err(e) => {
                log::warn!("Chat index unreadable, starting empty: {}", e);
                ChatIndex::default()
            }
        }
    }

    fn write_index(&self, entries: Vec<ChatIndexEntry>) -> FileResult<()> {
        let Some(path) = self.index_path() else {
            return Ok(());
        };
        let index = ChatIndex {
            version: INDEX_VERSION,
            updated_at: Utc::now(),
            entries,
        };
        write_json(&path, &index)
    }

    /// All chats in listing order (most recently created first)
    pub fn get_all_chats(&self) -> Vec<Chat> {
        let index = self.read_index();
        index
            .entries
            .iter()
            .filter_map(|entry| match self.get_chat(&entry.id) {
                Some(chat) => Some(chat),
                None => {
                    log::warn!("Chat {} listed in index but unreadable", entry.id);
                    None
                }
            })
            .collect()
    }

    /// Listing metadata without loading message bodies
    pub fn list_chats(&self) -> Vec<ChatIndexEntry> {
        self.read_index().entries
    }

    pub fn get_chat(&self, chat_id: &str) -> Option<Chat> {
        let path = self.chat_path(chat_id)?;
        if !path.exists() {
            return None;
        }
        match read_json::<ChatFile>(&path) {
            Ok(file) => Some(file.chat),
            Err(e) => {
                log::warn!("Failed to read chat {}: {}", chat_id, e);
                None
            }
        }
    }

    /// Upsert a chat. New ids are inserted at the front of the listing
    /// order; existing ids keep their position.
    pub fn save_chat(&self, chat: &Chat) -> FileResult<()> {
        let Some(path) = self.chat_path(&chat.id) else {
            return Ok(());
        };
        if let Some(dir) = self.chats_dir() {
            ensure_dir(&dir)?;
        }

        write_json(&path, &ChatFile::from_chat(chat))?;

        let entry = ChatIndexEntry {
            id: chat.id.clone(),
            title: chat.title.clone(),
            updated_at: chat.updated_at,
            message_count: chat.messages.len() as u32,
        };

        let mut index = self.read_index();
        match index.entries.iter_mut().find(|e| e.id == chat.id) {
            Some(existing) => *existing = entry,
            None => index.entries.insert(0, entry),
        }
        self.write_index(index.entries)
    }

    /// Delete a chat and clear the current pointer if it pointed here
    pub fn delete_chat(&self, chat_id: &str) -> FileResult<()> {
        let Some(path) = self.chat_path(chat_id) else {
            return Ok(());
        };
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| format!("Failed to delete chat {}: {}", chat_id, e))?;
        }

        let mut index = self.read_index();
        index.entries.retain(|entry| entry.id != chat_id);
        self.write_index(index.entries)?;

        if self.get_current_chat_id() == chat_id {
            self.set_current_chat_id("")?;
        }
        Ok(())
    }

    /// Create (but do not persist) a fresh chat
    pub fn create_new_chat(&self) -> Chat {
        let now = Utc::now();
        Chat {
            id: format!("chat-{}", generate_id()),
            title: "New Chat".to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive a chat title from the first user message, capped at 50
    /// characters plus an ellipsis
    pub fn generate_chat_title(messages: &[Message]) -> String {
        let Some(first_user) = messages.iter().find(|m| m.role == MessageRole::User) else {
            return "New Chat".to_string();
        };

        let content = &first_user.content;
        if content.chars().count() > TITLE_MAX_CHARS {
            let truncated: String = content.chars().take(TITLE_MAX_CHARS).collect();
            format!("{}...", truncated)
        } else {
            content.clone()
        }
    }

    /// The active chat id, or an empty string when unset/disabled
    pub fn get_current_chat_id(&self) -> String {
        let Some(path) = self.current_path() else {
            return String::new();
        };
        if !path.exists() {
            return String::new();
        }
        match read_json::<CurrentChat>(&path) {
            Ok(current) => current.chat_id,
            Err(e) => {
                log::warn!("Current-chat pointer unreadable: {}", e);
                String::new()
            }
        }
    }

    pub fn set_current_chat_id(&self, chat_id: &str) -> FileResult<()> {
        let Some(path) = self.current_path() else {
            return Ok(());
        };
        write_json(
            &path,
            &CurrentChat {
                chat_id: chat_id.to_string(),
            },
        )
    }

    /// Remove every stored chat and the current pointer
    pub fn clear_all_chats(&self) -> FileResult<()> {
        if let Some(dir) = self.chats_dir() {
            if dir.exists() {
                fs::remove_dir_all(&dir)
                    .map_err(|e| format!("Failed to clear chats: {}", e))?;
            }
        }
        if let Some(path) = self.current_path() {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| format!("Failed to clear current-chat pointer: {}", e))?;
            }
        }
        Ok(())
    }

    /// Data directory root, if the store is enabled
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }
}
