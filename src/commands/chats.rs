// Chat transcript commands

use super::lock_store;
use crate::file_storage::ChatStore;
use crate::models::Chat;
use chrono::Utc;
use std::sync::Mutex;

/// List all chats, most recently created first
pub fn get_chats(store: &Mutex<ChatStore>) -> Result<Vec<Chat>, String> {
    Ok(lock_store(store)?.get_all_chats())
}

/// Fetch one chat by id
pub fn get_chat(store: &Mutex<ChatStore>, chat_id: &str) -> Result<Option<Chat>, String> {
    Ok(lock_store(store)?.get_chat(chat_id))
}

/// Create a fresh chat, persist it, and make it current
pub fn new_chat(store: &Mutex<ChatStore>) -> Result<Chat, String> {
    let store = lock_store(store)?;
    let chat = store.create_new_chat();
    store.save_chat(&chat)?;
    store.set_current_chat_id(&chat.id)?;
    log::debug!("Created chat {}", chat.id);
    Ok(chat)
}

/// Upsert a chat. The title is rederived from the messages and
/// `updated_at` is advanced, keeping `updated_at >= created_at`.
pub fn save_chat(store: &Mutex<ChatStore>, mut chat: Chat) -> Result<Chat, String> {
    chat.title = ChatStore::generate_chat_title(&chat.messages);
    chat.updated_at = Utc::now();
    lock_store(store)?.save_chat(&chat)?;
    Ok(chat)
}

/// Delete a chat by id
pub fn delete_chat(store: &Mutex<ChatStore>, chat_id: &str) -> Result<(), String> {
    lock_store(store)?.delete_chat(chat_id)
}

/// Remove every stored chat
pub fn clear_chats(store: &Mutex<ChatStore>) -> Result<(), String> {
    lock_store(store)?.clear_all_chats()
}

/// The current chat id ("" when unset)
pub fn get_current_chat(store: &Mutex<ChatStore>) -> Result<String, String> {
    Ok(lock_store(store)?.get_current_chat_id())
}

/// Point the current-chat marker at the given id
pub fn set_current_chat(store: &Mutex<ChatStore>, chat_id: &str) -> Result<(), String> {
    lock_store(store)?.set_current_chat_id(chat_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessageRole};
    use tempfile::TempDir;

    fn store() -> (TempDir, Mutex<ChatStore>) {
        let temp_dir = TempDir::new().unwrap();
        let store = Mutex::new(ChatStore::new(temp_dir.path()));
        (temp_dir, store)
    }

    #[test]
    fn test_new_chat_becomes_current() {
        let (_tmp, store) = store();
        let chat = new_chat(&store).unwrap();
        assert_eq!(get_current_chat(&store).unwrap(), chat.id);
        assert_eq!(get_chats(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_save_chat_rederives_title_and_advances_updated_at() {
        let (_tmp, store) = store();
        let mut chat = new_chat(&store).unwrap();
        let created_at = chat.created_at;

        chat.messages
            .push(Message::new(MessageRole::User, "plan my week"));
        let saved = save_chat(&store, chat).unwrap();

        assert_eq!(saved.title, "plan my week");
        assert!(saved.updated_at >= created_at);
    }

    #[test]
    fn test_delete_and_clear() {
        let (_tmp, store) = store();
        let chat = new_chat(&store).unwrap();

        delete_chat(&store, &chat.id).unwrap();
        assert!(get_chat(&store, &chat.id).unwrap().is_none());
        assert_eq!(get_current_chat(&store).unwrap(), "");

        new_chat(&store).unwrap();
        new_chat(&store).unwrap();
        clear_chats(&store).unwrap();
        assert!(get_chats(&store).unwrap().is_empty());
    }
}
