use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::events::{ChatMessage, ServerEvent};
use crate::auth::Principal;

const EVENT_BUFFER: usize = 256;

/// Identifies one live socket for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub connection_id: ConnectionId,
    pub user_id: Uuid,
    pub full_name: String,
}

#[derive(Debug, Clone)]
struct Member {
    user_id: Uuid,
    full_name: String,
}

/// Live connection to user mapping for the realtime gateway.
///
/// One lock guards the map. Membership changes publish their snapshot while still holding it,
/// so subscribers see snapshots in the same order the changes happened.
pub struct PresenceRegistry {
    members: Mutex<HashMap<ConnectionId, Member>>,
    events: broadcast::Sender<ServerEvent>,
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            members: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Record `connection` as belonging to a verified principal, replacing any prior entry for
    /// the same connection, and broadcast the new membership.
    pub async fn register(&self, connection: ConnectionId, principal: &Principal) -> Vec<PresenceEntry> {
        let mut members = self.members.lock().await;
        members.insert(
            connection,
            Member {
                user_id: principal.id(),
                full_name: principal.full_name().to_string(),
            },
        );

        let current = snapshot(&members);
        self.publish(ServerEvent::ClientsUpdated(current.clone()));
        tracing::debug!("Connection {} registered for user {}", connection, principal.id());
        current
    }

    /// Forget `connection`. Unknown connections are ignored and nothing is broadcast.
    pub async fn remove(&self, connection: ConnectionId) -> Vec<PresenceEntry> {
        let mut members = self.members.lock().await;
        let removed = members.remove(&connection).is_some();

        let current = snapshot(&members);
        if removed {
            self.publish(ServerEvent::ClientsUpdated(current.clone()));
            tracing::debug!("Connection {} removed", connection);
        }
        current
    }

    pub async fn list(&self) -> Vec<PresenceEntry> {
        snapshot(&*self.members.lock().await)
    }

    pub async fn full_name_for(&self, connection: ConnectionId) -> Option<String> {
        self.members
            .lock()
            .await
            .get(&connection)
            .map(|m| m.full_name.clone())
    }

    /// Relay a chat message attributed to the sender's display name
    pub async fn relay(&self, sender: ConnectionId, message: Option<String>) -> Option<ChatMessage> {
        let Some(full_name) = self.full_name_for(sender).await else {
            tracing::warn!("Dropping message from unregistered connection {}", sender);
            return None;
        };

        let chat = ChatMessage::new(full_name, message);
        self.publish(ServerEvent::MessageFromServer(chat.clone()));
        Some(chat)
    }

    /// Drop every entry. Used when the realtime subsystem shuts down.
    pub async fn clear(&self) {
        let mut members = self.members.lock().await;
        let count = members.len();
        members.clear();
        tracing::info!("Presence registry cleared ({} connections)", count);
    }

    fn publish(&self, event: ServerEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }
}

fn snapshot(members: &HashMap<ConnectionId, Member>) -> Vec<PresenceEntry> {
    let mut entries: Vec<PresenceEntry> = members
        .iter()
        .map(|(id, m)| PresenceEntry {
            connection_id: *id,
            user_id: m.user_id,
            full_name: m.full_name.clone(),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.full_name
            .cmp(&b.full_name)
            .then_with(|| a.connection_id.0.cmp(&b.connection_id.0))
    });
    entries
}
