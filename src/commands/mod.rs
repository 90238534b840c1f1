//! Command layer between the HTTP routes and the pipeline/storage
//!
//! Commands return `Result<T, String>` so the proxy can wrap any failure in
//! its error envelope without caring which layer produced it.

pub mod chats;
pub mod export;
pub mod messages;

pub use chats::*;
pub use export::*;
pub use messages::*;

use crate::file_storage::ChatStore;
use std::sync::{Mutex, MutexGuard};

/// Acquire the chat store lock, surfacing poisoning as a command error
pub(crate) fn lock_store(store: &Mutex<ChatStore>) -> Result<MutexGuard<'_, ChatStore>, String> {
    store
        .lock()
        .map_err(|e| format!("Chat store lock poisoned: {}", e))
}
