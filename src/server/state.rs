//! Server application state shared across handlers

use crate::config::ServerConfig;
use crate::file_storage::ChatStore;
use crate::shutdown::ShutdownState;
use crate::webhook::WebhookClient;
use std::sync::{Arc, Mutex};

/// Shared state for the server: configuration, the transcript store, the
/// upstream webhook client, and the shutdown flag.
#[derive(Clone)]
pub struct ServerAppState {
    /// Resolved runtime configuration
    pub config: Arc<ServerConfig>,

    /// Transcript store. All mutation goes through this lock, which keeps
    /// message appends strictly ordered per chat.
    pub chat_store: Arc<Mutex<ChatStore>>,

    /// Upstream webhook client
    pub webhook: Arc<WebhookClient>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    /// Create the server state from resolved configuration
    pub fn new(config: ServerConfig, shutdown_state: ShutdownState) -> Result<Self, String> {
        let chat_store = match &config.data_dir {
            Some(dir) => ChatStore::new(dir),
            None => {
                log::info!("No data directory configured, chat persistence is disabled");
                ChatStore::disabled()
            }
        };

        let webhook = WebhookClient::new(&config.webhook_url, config.request_timeout)?;

        Ok(Self {
            config: Arc::new(config),
            chat_store: Arc::new(Mutex::new(chat_store)),
            webhook: Arc::new(webhook),
            shutdown_state,
        })
    }
}
