//! Real-time room broadcasts
//!
//! Mutations publish [`RoomEvent`]s on a single broadcast channel. Each socket
//! session subscribes and forwards the events whose room it has joined.
//! Nothing is buffered beyond the channel capacity, and a lagging subscriber
//! simply misses events.

pub mod socket;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1024;

/// A broadcast scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    User(Uuid),
    Workspace(Uuid),
    Project(Uuid),
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::User(id) => write!(f, "user:{}", id),
            Room::Workspace(id) => write!(f, "workspace:{}", id),
            Room::Project(id) => write!(f, "project:{}", id),
        }
    }
}

/// One event addressed to one room
#[derive(Debug, Clone, Serialize)]
pub struct RoomEvent {
    #[serde(skip)]
    pub room: Room,
    pub event: String,
    pub data: Value,
}

/// Fan-out point for room events
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<RoomEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.sender.subscribe()
    }

    /// Publish to a room. Having no subscribers is not an error.
    pub fn emit<T: Serialize>(&self, room: Room, event: &str, data: &T) {
        let data = serde_json::to_value(data).unwrap_or(Value::Null);
        trace!(room = %room, event, "Emitting room event");
        let _ = self.sender.send(RoomEvent {
            room,
            event: event.to_string(),
            data,
        });
    }

    pub fn emit_to_user<T: Serialize>(&self, user: Uuid, event: &str, data: &T) {
        self.emit(Room::User(user), event, data);
    }

    pub fn emit_to_workspace<T: Serialize>(&self, workspace: Uuid, event: &str, data: &T) {
        self.emit(Room::Workspace(workspace), event, data);
    }

    pub fn emit_to_project<T: Serialize>(&self, project: Uuid, event: &str, data: &T) {
        self.emit(Room::Project(project), event, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_names() {
        let id = Uuid::nil();
        assert_eq!(
            Room::User(id).to_string(),
            "user:00000000-0000-0000-0000-000000000000"
        );
        assert!(Room::Workspace(id).to_string().starts_with("workspace:"));
        assert!(Room::Project(id).to_string().starts_with("project:"));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let hub = EventHub::new();
        hub.emit_to_project(Uuid::new_v4(), "task-created", &json!({"title": "x"}));
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();
        let project = Uuid::new_v4();

        hub.emit_to_project(project, "task-deleted", &json!({"taskId": "abc"}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.room, Room::Project(project));
        assert_eq!(event.event, "task-deleted");
        assert_eq!(event.data["taskId"], "abc");
    }
}
