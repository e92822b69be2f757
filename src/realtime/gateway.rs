use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::events::ClientEvent;
use super::registry::{ConnectionId, PresenceRegistry};
use crate::app::AppState;
use crate::auth::{IdentityVerifier, Principal};
use crate::middleware::auth::bearer_token;

/// Handshake header carrying the raw token
pub const AUTHENTICATION_HEADER: &str = "authentication";

/// GET /ws - upgrade, then authenticate from the handshake headers
pub async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = handshake_token(&headers);
    let verifier = state.verifier.clone();
    let presence = Arc::clone(&state.presence);

    ws.on_upgrade(move |socket| serve_socket(socket, token, verifier, presence))
}

/// `authentication: <token>` first, then `Authorization: Bearer <token>`
pub fn handshake_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(AUTHENTICATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match raw {
        Some(value) => Some(value.strip_prefix("Bearer ").unwrap_or(value).to_string()),
        None => bearer_token(headers).ok().map(str::to_string),
    }
}

async fn authenticate(verifier: &IdentityVerifier, token: Option<String>) -> Option<Principal> {
    let token = token?;
    match verifier.verify(&token).await {
        Ok(principal) if principal.is_active() => Some(principal),
        Ok(principal) => {
            tracing::debug!("Refusing socket for inactive user {}", principal.id());
            None
        }
        Err(err) => {
            tracing::debug!("Refusing socket: {}", err);
            None
        }
    }
}

async fn serve_socket(
    mut socket: WebSocket,
    token: Option<String>,
    verifier: IdentityVerifier,
    presence: Arc<PresenceRegistry>,
) {
    let Some(principal) = authenticate(&verifier, token).await else {
        // Failed handshakes are closed without any event
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    let connection = ConnectionId::new();
    let mut events = presence.subscribe();
    presence.register(connection, &principal).await;

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Connection {} lagged, {} events skipped", connection, skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to encode realtime event: {}", e);
                    continue;
                }
            };

            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let relay = Arc::clone(&presence);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::MessageFromClient(payload)) => {
                        relay.relay(connection, payload.message).await;
                    }
                    Err(e) => tracing::debug!("Ignoring frame from {}: {}", connection, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    presence.remove(connection).await;
}
