use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gcs_core::sketch::SketchDocument;
use serde_json::json;
use std::net::{AddrParseError, SocketAddr};
use std::sync::{Arc, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod protocol;

use protocol::{Command, ProtocolError, SolveRequest, SolveResponse};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

// Application State
struct AppState {
    document: Arc<RwLock<SketchDocument>>,
}

fn parse_addr(value: Option<&str>) -> Result<SocketAddr, AddrParseError> {
    value.unwrap_or(DEFAULT_ADDR).parse()
}

fn listen_addr() -> Result<SocketAddr, AddrParseError> {
    let configured = std::env::var("GCS_BACKEND_ADDR").ok();
    parse_addr(configured.as_deref()).or_else(|e| {
        warn!("Ignoring GCS_BACKEND_ADDR={:?} ({}), using {}", configured, e, DEFAULT_ADDR);
        parse_addr(None)
    })
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        document: Arc::new(RwLock::new(SketchDocument::default())),
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/solve", post(solve))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = listen_addr().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn root() -> &'static str {
    concat!("Constraint solver backend ", env!("CARGO_PKG_VERSION"))
}

impl IntoResponse for ProtocolError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

async fn solve(Json(request): Json<SolveRequest>) -> Result<Json<SolveResponse>, ProtocolError> {
    protocol::solve_request(request).map(Json)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Parse and run one text command against the shared document.
fn dispatch(state: &AppState, text: &str) -> String {
    let command = match Command::parse(text) {
        Ok(command) => command,
        Err(e) => {
            warn!("Rejected message: {}", e);
            return protocol::format_error(&e);
        }
    };

    let mut document = state
        .document
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    match protocol::execute(&mut document, command) {
        Ok(update) => update.to_message(),
        Err(e) => {
            warn!("Command failed: {}", e);
            protocol::format_error(&e)
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    // Send the current document so the client starts in sync
    let greeting = dispatch(&state, "GET");
    if socket.send(Message::Text(greeting)).await.is_err() {
        return;
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        match msg {
            Message::Text(text) => {
                info!("Received message: {:.64}", text);
                let reply = dispatch(&state, &text);
                if socket.send(Message::Text(reply)).await.is_err() {
                    return;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Client disconnected");
}
