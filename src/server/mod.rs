//! HTTP server for browser-based access to the chat relay
//!
//! Exposes the webhook relay endpoint, the command proxy, and health/version
//! endpoints. The browser UI itself is an external collaborator; the index
//! page only shows connection instructions.

pub mod proxy;
pub mod relay;
pub mod routes;
pub mod state;

pub use proxy::invoke_handler;
pub use state::ServerAppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    version: String,
}

/// Run the HTTP server
pub async fn run_server(state: ServerAppState) -> Result<(), String> {
    // Build CORS layer
    // Must be the outermost layer so preflight OPTIONS requests are handled
    // before anything else. Explicit headers instead of Any to avoid browser
    // deprecation warnings with wildcard headers.
    let cors = if state.config.cors_origins.is_empty() {
        // Permissive CORS: allow any origin (default for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    } else {
        // Restricted CORS: only allow specified origins
        let allowed_origins: Vec<HeaderValue> = state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    };

    let app = Router::new()
        .route("/api/webhook", post(relay::relay_handler))
        .route("/api/invoke", post(proxy::invoke_handler))
        .route("/api/version", get(version_handler))
        .route("/health", get(health_handler))
        .route("/", get(index_handler))
        .layer(cors)
        .with_state(state.clone());

    let addr: SocketAddr = format!("{}:{}", state.config.bind, state.config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = if state.config.cors_origins.is_empty() {
        "*".to_string()
    } else {
        state.config.cors_origins.join(", ")
    };
    let persistence = match state.config.data_dir.as_ref() {
        Some(dir) => dir.display().to_string(),
        None => "disabled".to_string(),
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Chat Bridge Server                        ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                               ║");
    println!("║  Server URL: http://{}:{:<24}  ║", state.config.bind, state.config.port);
    println!("║                                                               ║");
    println!("║  Upstream: {:<49}║", state.webhook.url());
    println!("║  Chats: {:<52}║", persistence);
    println!("║  CORS Origins: {:<45}║", cors_display);
    println!("║                                                               ║");
    println!("║  Endpoints:                                                   ║");
    println!("║    POST /api/webhook     - Webhook relay                     ║");
    println!("║    POST /api/invoke      - Command proxy                     ║");
    println!("║    GET  /api/version     - Server version info               ║");
    println!("║    GET  /health          - Health check                      ║");
    println!("║                                                               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    // Create shutdown signal that waits for the shutdown state flag
    let shutdown_state = state.shutdown_state.clone();
    let shutdown_signal = async move {
        loop {
            if shutdown_state.is_shutdown_requested() {
                log::info!("Shutdown signal received, stopping server...");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Version endpoint - returns the server version
async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Index handler - shows connection instructions
async fn index_handler() -> axum::response::Html<&'static str> {
    axum::response::Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Chat Bridge</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }
        h1 { color: #4ade80; }
        code {
            background: #2a2a4e;
            padding: 2px 6px;
            border-radius: 4px;
            font-family: 'Monaco', 'Consolas', monospace;
        }
        .endpoint {
            background: #2a2a4e;
            padding: 10px;
            border-radius: 8px;
            margin: 10px 0;
        }
    </style>
</head>
<body>
    <h1>Chat Bridge</h1>
    <p>The relay server is running. Point the browser chat client at this address.</p>
    <h2>Endpoints</h2>
    <div class="endpoint">
        <strong>POST /api/webhook</strong><br>
        Webhook relay - send <code>{"type":"text","message":"..."}</code> or a voice payload
    </div>
    <div class="endpoint">
        <strong>POST /api/invoke</strong><br>
        Command proxy - send <code>{"cmd":"get_chats","args":{}}</code>
    </div>
    <div class="endpoint">
        <strong>GET /health</strong><br>
        Health check endpoint
    </div>
</body>
</html>"#,
    )
}
