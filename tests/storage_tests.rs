// Integration tests for transcript persistence

#[cfg(test)]
mod storage_integration_tests {
    use chat_bridge_lib::commands;
    use chat_bridge_lib::file_storage::ChatStore;
    use chat_bridge_lib::{Message, MessageRole};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[test]
    fn test_title_from_80_char_message_is_53_chars() {
        let message = Message::new(MessageRole::User, "a".repeat(80));
        let title = ChatStore::generate_chat_title(&[message]);

        assert_eq!(title.chars().count(), 53);
        assert_eq!(&title[..50], &"a".repeat(50));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_title_ignores_leading_assistant_messages() {
        let messages = vec![
            Message::new(MessageRole::Assistant, "welcome text"),
            Message::new(MessageRole::User, "actual question"),
        ];
        assert_eq!(ChatStore::generate_chat_title(&messages), "actual question");
    }

    #[test]
    fn test_chats_survive_store_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let chat_id = {
            let store = Mutex::new(ChatStore::new(temp_dir.path()));
            let mut chat = commands::new_chat(&store).unwrap();
            chat.messages
                .push(Message::new(MessageRole::User, "persist me"));
            commands::save_chat(&store, chat).unwrap().id
        };

        let reopened = ChatStore::new(temp_dir.path());
        let loaded = reopened.get_chat(&chat_id).expect("chat persisted");
        assert_eq!(loaded.title, "persist me");
        assert_eq!(reopened.get_current_chat_id(), chat_id);
    }

    #[test]
    fn test_listing_order_is_front_insert() {
        let temp_dir = TempDir::new().unwrap();
        let store = Mutex::new(ChatStore::new(temp_dir.path()));

        let first = commands::new_chat(&store).unwrap();
        let second = commands::new_chat(&store).unwrap();
        let third = commands::new_chat(&store).unwrap();

        let ids: Vec<String> = commands::get_chats(&store)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let temp_dir = TempDir::new().unwrap();
        let store = Mutex::new(ChatStore::new(temp_dir.path()));

        let mut chat = commands::new_chat(&store).unwrap();
        assert!(chat.updated_at >= chat.created_at);

        chat.messages.push(Message::new(MessageRole::User, "ping"));
        let saved = commands::save_chat(&store, chat).unwrap();
        assert!(saved.updated_at >= saved.created_at);
    }

    #[test]
    fn test_disabled_store_returns_defaults() {
        let store = Mutex::new(ChatStore::disabled());

        let chat = commands::new_chat(&store).unwrap();
        assert!(commands::get_chat(&store, &chat.id).unwrap().is_none());
        assert!(commands::get_chats(&store).unwrap().is_empty());
        assert_eq!(commands::get_current_chat(&store).unwrap(), "");
        commands::clear_chats(&store).unwrap();
    }
}
