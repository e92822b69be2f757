pub mod events;
pub mod gateway;
pub mod registry;

pub use events::{ChatMessage, ClientEvent, NewMessage, ServerEvent};
pub use gateway::ws_handler;
pub use registry::{ConnectionId, PresenceEntry, PresenceRegistry};
