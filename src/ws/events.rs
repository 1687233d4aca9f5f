use tracing::{debug, error, info, warn};

use crate::models::{
    ActiveUsersMessage, ContentMessage, CursorPositionMessage, JoinDocumentMessage,
    SelectionChangeMessage, ServerMessage, TextChangeMessage, UserCursorMessage,
    UserLeftMessage, UserSelectionMessage,
};
use crate::state::AppState;
use crate::ws::bootstrap;

/// Join a document room: register membership and presence, resolve the
/// document's content for the joiner, and announce the updated presence
/// snapshot to the whole room.
pub async fn handle_join(state: &AppState, session_id: &str, msg: JoinDocumentMessage) {
    let document_id = msg.document_id;

    let Some(snapshot) = state.registry.join(session_id, &document_id).await else {
        warn!("Join from unregistered session {}", session_id);
        return;
    };
    info!("Session {} joined document {}", session_id, document_id);

    // Current content goes to the joining session only. A store failure is
    // logged and the join continues; the client just never receives content.
    match bootstrap::resolve_content(state.store.as_ref(), &document_id).await {
        Ok(content) => {
            state
                .registry
                .send_to(
                    session_id,
                    ServerMessage::DocumentContent(ContentMessage { content }),
                )
                .await;
        }
        Err(e) => {
            error!("Error fetching document {}: {}", document_id, e);
        }
    }

    // Full presence snapshot to every room member, including the joiner.
    state
        .registry
        .broadcast(
            &document_id,
            &ServerMessage::ActiveUsers(ActiveUsersMessage { users: snapshot }),
            None,
        )
        .await;
}

/// Whole-content replace: persist first, then relay to the other members.
/// Without an acknowledged write there is no broadcast.
pub async fn handle_text_change(state: &AppState, session_id: &str, msg: TextChangeMessage) {
    if !state.registry.is_member(session_id, &msg.document_id).await {
        debug!(
            "Ignoring text change for {} from non-member {}",
            msg.document_id, session_id
        );
        return;
    }

    match state
        .store
        .update_content(&msg.document_id, &msg.content)
        .await
    {
        Ok(true) => {
            state
                .registry
                .broadcast(
                    &msg.document_id,
                    &ServerMessage::TextChange(ContentMessage {
                        content: msg.content,
                    }),
                    Some(session_id),
                )
                .await;
        }
        Ok(false) => {
            warn!("Text change for unknown document {}", msg.document_id);
        }
        Err(e) => {
            // The change is dropped for propagation purposes; the sender is
            // not told.
            error!("Error updating document {}: {}", msg.document_id, e);
        }
    }
}

/// Relay a cursor move to the other room members. Stale events (session not
/// a member of the room) are ignored.
pub async fn handle_cursor(state: &AppState, session_id: &str, msg: CursorPositionMessage) {
    let Some(presence) = state
        .registry
        .update_cursor(session_id, &msg.document_id, msg.cursor.clone())
        .await
    else {
        debug!(
            "Ignoring cursor update for {} from non-member {}",
            msg.document_id, session_id
        );
        return;
    };

    state
        .registry
        .broadcast(
            &msg.document_id,
            &ServerMessage::UserCursor(UserCursorMessage {
                user_id: session_id.to_string(),
                cursor: msg.cursor,
                name: presence.name,
                color: presence.color,
            }),
            Some(session_id),
        )
        .await;
}

/// Relay a selection change to the other room members.
pub async fn handle_selection(state: &AppState, session_id: &str, msg: SelectionChangeMessage) {
    let Some(presence) = state
        .registry
        .update_selection(session_id, &msg.document_id, msg.selection.clone())
        .await
    else {
        debug!(
            "Ignoring selection update for {} from non-member {}",
            msg.document_id, session_id
        );
        return;
    };

    state
        .registry
        .broadcast(
            &msg.document_id,
            &ServerMessage::UserSelection(UserSelectionMessage {
                user_id: session_id.to_string(),
                selection: msg.selection,
                name: presence.name,
                color: presence.color,
            }),
            Some(session_id),
        )
        .await;
}

/// Transport closed: remove the session everywhere and tell each affected
/// room who left, followed by the room's updated presence snapshot.
pub async fn handle_disconnect(state: &AppState, session_id: &str) {
    let affected = state.registry.leave_all(session_id).await;
    for room_id in affected {
        state
            .registry
            .broadcast(
                &room_id,
                &ServerMessage::UserLeft(UserLeftMessage {
                    session_id: session_id.to_string(),
                }),
                None,
            )
            .await;

        let users = state.registry.presence_snapshot(&room_id).await;
        state
            .registry
            .broadcast(
                &room_id,
                &ServerMessage::ActiveUsers(ActiveUsersMessage { users }),
                None,
            )
            .await;
    }
}
