use serde::{Deserialize, Serialize};

use super::registry::PresenceEntry;

/// Text sent in place of an empty chat message
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "no-message!!";

/// Frames pushed to every connected socket, as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    ClientsUpdated(Vec<PresenceEntry>),
    MessageFromServer(ChatMessage),
}

/// Frames accepted from a socket after the handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    MessageFromClient(NewMessage),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub full_name: String,
    pub message: String,
}

impl ChatMessage {
    pub fn new(full_name: impl Into<String>, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| EMPTY_MESSAGE_PLACEHOLDER.to_string());

        Self {
            full_name: full_name.into(),
            message,
        }
    }
}
