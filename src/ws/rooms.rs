use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::debug;

use crate::models::{Presence, ServerMessage};

/// Outbound queue handle for one session. Messages pushed here are drained
/// onto the session's transport by its writer task, in order.
pub type SessionSender = mpsc::UnboundedSender<ServerMessage>;

struct SessionEntry {
    tx: SessionSender,
    joined: HashSet<String>,
}

struct Member {
    presence: Presence,
    tx: SessionSender,
}

#[derive(Default)]
struct Room {
    members: HashMap<String, Member>,
}

impl Room {
    fn snapshot(&self) -> Vec<Presence> {
        self.members.values().map(|m| m.presence.clone()).collect()
    }
}

/// Tracks live sessions, the rooms they joined, and per-room presence.
///
/// The outer map lock is only held to resolve or create a room entry; all
/// membership and presence read-modify-write happens under that room's own
/// mutex, so operations on different rooms never contend.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<Room>>>>,
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a freshly accepted connection.
    pub async fn register(&self, session_id: &str, tx: SessionSender) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                tx,
                joined: HashSet::new(),
            },
        );
    }

    /// Add a session to a room, creating the room and a presence entry as
    /// needed. Joining a room twice keeps the existing presence. Returns the
    /// room's full presence snapshot including the caller, or None when the
    /// session was never registered (or already disconnected).
    pub async fn join(&self, session_id: &str, room_id: &str) -> Option<Vec<Presence>> {
        let tx = {
            let mut sessions = self.sessions.lock().await;
            let entry = sessions.get_mut(session_id)?;
            entry.joined.insert(room_id.to_string());
            entry.tx.clone()
        };

        let room = self.room_or_create(room_id).await;
        let mut room = room.lock().await;
        room.members
            .entry(session_id.to_string())
            .or_insert_with(|| Member {
                presence: Presence::new(session_id),
                tx,
            });
        Some(room.snapshot())
    }

    /// Record a cursor update. No-op (None) when the session is not a member
    /// of the room; otherwise returns the updated presence for relaying.
    pub async fn update_cursor(
        &self,
        session_id: &str,
        room_id: &str,
        cursor: serde_json::Value,
    ) -> Option<Presence> {
        let room = self.room(room_id).await?;
        let mut room = room.lock().await;
        let member = room.members.get_mut(session_id)?;
        member.presence.cursor = Some(cursor);
        Some(member.presence.clone())
    }

    /// Record a selection update. Same membership rules as cursor updates.
    pub async fn update_selection(
        &self,
        session_id: &str,
        room_id: &str,
        selection: serde_json::Value,
    ) -> Option<Presence> {
        let room = self.room(room_id).await?;
        let mut room = room.lock().await;
        let member = room.members.get_mut(session_id)?;
        member.presence.selection = Some(selection);
        Some(member.presence.clone())
    }

    /// Whether the session currently belongs to the room.
    pub async fn is_member(&self, session_id: &str, room_id: &str) -> bool {
        match self.room(room_id).await {
            Some(room) => room.lock().await.members.contains_key(session_id),
            None => false,
        }
    }

    /// Remove the session's membership and presence from one room. Idempotent.
    pub async fn leave(&self, session_id: &str, room_id: &str) {
        if let Some(room) = self.room(room_id).await {
            room.lock().await.members.remove(session_id);
        }
        let mut sessions = self.sessions.lock().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.joined.remove(room_id);
        }
    }

    /// Remove the session from every room it belongs to and drop its entry,
    /// returning the affected room ids. The session entry is removed first so
    /// no registry operation can observe a half-cleaned session.
    pub async fn leave_all(&self, session_id: &str) -> Vec<String> {
        let joined: Vec<String> = {
            let mut sessions = self.sessions.lock().await;
            match sessions.remove(session_id) {
                Some(entry) => entry.joined.into_iter().collect(),
                None => Vec::new(),
            }
        };

        let mut affected = Vec::new();
        for room_id in joined {
            if let Some(room) = self.room(&room_id).await {
                if room.lock().await.members.remove(session_id).is_some() {
                    affected.push(room_id);
                }
            }
        }
        affected
    }

    /// Current presence snapshot for a room; empty when the room is unknown.
    pub async fn presence_snapshot(&self, room_id: &str) -> Vec<Presence> {
        match self.room(room_id).await {
            Some(room) => room.lock().await.snapshot(),
            None => Vec::new(),
        }
    }

    /// Deliver a message to every member of the room except the excluded
    /// session. Best effort: a session whose queue has closed is skipped and
    /// never aborts delivery to the rest.
    pub async fn broadcast(&self, room_id: &str, msg: &ServerMessage, exclude: Option<&str>) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        for (id, member) in &room.members {
            if exclude == Some(id.as_str()) {
                continue;
            }
            if member.tx.send(msg.clone()).is_err() {
                debug!("Dropping message for closed session {} in room {}", id, room_id);
            }
        }
    }

    /// Deliver a message to a single session, if it is still registered.
    pub async fn send_to(&self, session_id: &str, msg: ServerMessage) {
        let sessions = self.sessions.lock().await;
        if let Some(entry) = sessions.get(session_id) {
            if entry.tx.send(msg).is_err() {
                debug!("Dropping message for closed session {}", session_id);
            }
        }
    }

    async fn room(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn room_or_create(&self, room_id: &str) -> Arc<Mutex<Room>> {
        // Fast path: the room already exists.
        {
            let rooms = self.rooms.read().await;
            if let Some(room) = rooms.get(room_id) {
                return room.clone();
            }
        }
        let mut rooms = self.rooms.write().await;
        rooms.entry(room_id.to_string()).or_default().clone()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentMessage, UserLeftMessage};
    use serde_json::json;

    async fn register(
        registry: &RoomRegistry,
        session_id: &str,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(session_id, tx).await;
        rx
    }

    fn text(content: &str) -> ServerMessage {
        ServerMessage::TextChange(ContentMessage {
            content: content.to_string(),
        })
    }

    #[tokio::test]
    async fn join_returns_snapshot_including_caller() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "abcdef-session").await;

        let snapshot = registry.join("abcdef-session", "doc-1").await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "abcdef-session");
        assert_eq!(snapshot[0].name, "User abcdef");
    }

    #[tokio::test]
    async fn join_requires_registered_session() {
        let registry = RoomRegistry::new();
        assert!(registry.join("ghost", "doc-1").await.is_none());
    }

    #[tokio::test]
    async fn rejoining_keeps_existing_presence() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;

        let first = registry.join("s1", "doc-1").await.unwrap();
        let second = registry.join("s1", "doc-1").await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].color, first[0].color);
    }

    #[tokio::test]
    async fn snapshot_tracks_current_membership_exactly() {
        let registry = RoomRegistry::new();
        let _rx1 = register(&registry, "s1").await;
        let _rx2 = register(&registry, "s2").await;
        let _rx3 = register(&registry, "s3").await;
        for id in ["s1", "s2", "s3"] {
            registry.join(id, "doc-1").await.unwrap();
        }

        let mut ids: Vec<String> = registry
            .presence_snapshot("doc-1")
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["s1", "s2", "s3"]);

        registry.leave("s2", "doc-1").await;
        let mut ids: Vec<String> = registry
            .presence_snapshot("doc-1")
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["s1", "s3"]);
    }

    #[tokio::test]
    async fn cursor_update_is_noop_for_non_members() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;

        // Not joined anywhere yet.
        assert!(registry
            .update_cursor("s1", "doc-1", json!(3))
            .await
            .is_none());

        registry.join("s1", "doc-1").await.unwrap();
        // Joined doc-1, but not doc-2.
        assert!(registry
            .update_cursor("s1", "doc-2", json!(3))
            .await
            .is_none());

        let presence = registry
            .update_cursor("s1", "doc-1", json!({"index": 3}))
            .await
            .unwrap();
        assert_eq!(presence.cursor, Some(json!({"index": 3})));

        let snapshot = registry.presence_snapshot("doc-1").await;
        assert_eq!(snapshot[0].cursor, Some(json!({"index": 3})));
    }

    #[tokio::test]
    async fn selection_update_mutates_presence_in_place() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;
        registry.join("s1", "doc-1").await.unwrap();

        let presence = registry
            .update_selection("s1", "doc-1", json!({"index": 0, "length": 4}))
            .await
            .unwrap();
        assert_eq!(presence.selection, Some(json!({"index": 0, "length": 4})));
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;
        registry.join("s1", "doc-1").await.unwrap();

        registry.leave("s1", "doc-1").await;
        registry.leave("s1", "doc-1").await;
        assert!(registry.presence_snapshot("doc-1").await.is_empty());
        // Leaving a room that never existed is also fine.
        registry.leave("s1", "doc-9").await;
    }

    #[tokio::test]
    async fn empty_rooms_are_retained() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;
        registry.join("s1", "doc-1").await.unwrap();
        registry.leave("s1", "doc-1").await;

        // The room entry survives with zero members; a later broadcast into
        // it simply reaches nobody.
        assert!(registry.room("doc-1").await.is_some());
        registry.broadcast("doc-1", &text("x"), None).await;
    }

    #[tokio::test]
    async fn leave_all_returns_affected_rooms_and_drops_session() {
        let registry = RoomRegistry::new();
        let _rx = register(&registry, "s1").await;
        registry.join("s1", "doc-a").await.unwrap();
        registry.join("s1", "doc-b").await.unwrap();

        let mut affected = registry.leave_all("s1").await;
        affected.sort();
        assert_eq!(affected, ["doc-a", "doc-b"]);
        assert!(registry.presence_snapshot("doc-a").await.is_empty());
        assert!(registry.presence_snapshot("doc-b").await.is_empty());

        // The session entry is gone, so further joins are refused.
        assert!(registry.join("s1", "doc-a").await.is_none());
        // And a second pass finds nothing left to clean.
        assert!(registry.leave_all("s1").await.is_empty());
    }

    #[tokio::test]
    async fn broadcast_excludes_the_sender() {
        let registry = RoomRegistry::new();
        let mut rx1 = register(&registry, "s1").await;
        let mut rx2 = register(&registry, "s2").await;
        let mut rx3 = register(&registry, "s3").await;
        for id in ["s1", "s2", "s3"] {
            registry.join(id, "doc-1").await.unwrap();
        }

        registry.broadcast("doc-1", &text("hello"), Some("s1")).await;

        assert!(rx1.try_recv().is_err());
        assert!(matches!(
            rx2.try_recv().unwrap(),
            ServerMessage::TextChange(m) if m.content == "hello"
        ));
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_survives_closed_sessions() {
        let registry = RoomRegistry::new();
        let _rx1 = register(&registry, "s1").await;
        let rx2 = register(&registry, "s2").await;
        let mut rx3 = register(&registry, "s3").await;
        for id in ["s1", "s2", "s3"] {
            registry.join(id, "doc-1").await.unwrap();
        }

        // s2's transport is gone but its membership has not been cleaned yet.
        drop(rx2);
        registry.broadcast("doc-1", &text("still here"), Some("s1")).await;
        assert!(rx3.try_recv().is_ok());
    }

    #[tokio::test]
    async fn send_to_reaches_a_single_session() {
        let registry = RoomRegistry::new();
        let mut rx1 = register(&registry, "s1").await;
        let mut rx2 = register(&registry, "s2").await;

        registry
            .send_to(
                "s1",
                ServerMessage::UserLeft(UserLeftMessage {
                    session_id: "s9".to_string(),
                }),
            )
            .await;
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn concurrent_joins_to_a_new_room_register_everyone() {
        let registry = Arc::new(RoomRegistry::new());
        let mut rxs = Vec::new();
        for i in 0..8 {
            rxs.push(register(&registry, &format!("s{}", i)).await);
        }

        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.join(&format!("s{}", i), "doc-1").await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.presence_snapshot("doc-1").await.len(), 8);
    }
}
