use clap::Parser;
use std::path::PathBuf;

/// Chat Bridge - HTTP relay between a browser chat client and a
/// workflow-automation webhook
#[derive(Parser, Debug)]
#[command(name = "chat-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long, default_value = "3420")]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Upstream workflow webhook URL
    #[arg(long, env = "CHAT_BRIDGE_WEBHOOK_URL")]
    webhook_url: String,

    /// Data directory for chat persistence (defaults to the platform-local
    /// data directory)
    #[arg(long, env = "CHAT_BRIDGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Disable chat persistence entirely
    #[arg(long)]
    ephemeral: bool,

    /// Allowed CORS origin (repeatable; omit for permissive CORS)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::init();

    let config = chat_bridge_lib::config::ServerConfig {
        port: cli.port,
        bind: cli.bind,
        webhook_url: cli.webhook_url,
        data_dir: if cli.ephemeral {
            None
        } else {
            cli.data_dir
                .or_else(chat_bridge_lib::config::ServerConfig::default_data_dir)
        },
        cors_origins: cli.cors_origins,
        ..Default::default()
    };

    // Create the tokio runtime
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    rt.block_on(async {
        // Initialize shutdown state and wire it to process signals
        let shutdown_state = chat_bridge_lib::shutdown::ShutdownState::new();
        if let Err(e) =
            chat_bridge_lib::shutdown::register_signal_handlers(shutdown_state.clone())
        {
            log::warn!("Failed to register signal handlers: {}", e);
        }

        let state = match chat_bridge_lib::server::ServerAppState::new(config, shutdown_state) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("Failed to initialize server state: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = chat_bridge_lib::server::run_server(state).await {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
    });
}
