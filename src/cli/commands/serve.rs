//! HTTP server: chat endpoint and WebSocket control channel.

use crate::agent::Resolver;
use crate::channel::{ControlSession, ServerMessage};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::tools::ToolDispatcher;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    resolver: Resolver,
    dispatcher: Arc<ToolDispatcher>,
}

impl AppState {
    pub fn new(resolver: Resolver, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/mcp", get(control_channel))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;
    let state = Arc::new(AppState::new(
        orchestrator.resolver(),
        orchestrator.dispatcher(),
    ));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Bullpen API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Control channel", "GET  /mcp (WebSocket)");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;

    info!("server stopped");
    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    match state.resolver.resolve(&req.prompt).await {
        Ok(resolution) => Json(ChatResponse {
            message: resolution.message,
        })
        .into_response(),
        Err(e) => {
            error!("chat endpoint failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn control_channel(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| run_control_session(socket, dispatcher))
}

/// Serve one control-channel connection until the peer goes away.
async fn run_control_session(socket: WebSocket, dispatcher: Arc<ToolDispatcher>) {
    let session = ControlSession::new(dispatcher);
    let (mut sender, mut receiver) = socket.split();
    info!("control channel connected");

    if let Err(e) = sender
        .send(Message::Text(session.greeting().to_json().into()))
        .await
    {
        debug!("failed to send tool list: {}", e);
        return;
    }

    while let Some(frame) = receiver.next().await {
        let reply = match frame {
            Ok(Message::Text(text)) => session.handle_text(text.as_str()).await,
            Ok(Message::Binary(_)) => ServerMessage::error("invalid_json"),
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum.
            Ok(_) => continue,
            Err(e) => {
                debug!("control channel read failed: {}", e);
                break;
            }
        };

        if let Err(e) = sender.send(Message::Text(reply.to_json().into())).await {
            debug!("control channel write failed: {}", e);
            break;
        }
    }

    info!("control channel disconnected");
}
