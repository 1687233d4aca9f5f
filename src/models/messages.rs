use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Presence;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinDocumentMessage {
    pub document_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TextChangeMessage {
    pub document_id: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorPositionMessage {
    pub document_id: String,
    pub cursor: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChangeMessage {
    pub document_id: String,
    pub selection: Value,
}

/// Payload for both the one-shot content delivery on join and the
/// content relays sent to other room members.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContentMessage {
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUsersMessage {
    pub users: Vec<Presence>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserCursorMessage {
    pub user_id: String,
    pub cursor: Value,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserSelectionMessage {
    pub user_id: String,
    pub selection: Value,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftMessage {
    pub session_id: String,
}

/// Events received from clients. The event names are the protocol's
/// compatibility surface.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join-document")]
    JoinDocument(JoinDocumentMessage),
    #[serde(rename = "text-change")]
    TextChange(TextChangeMessage),
    #[serde(rename = "cursor-position")]
    CursorPosition(CursorPositionMessage),
    #[serde(rename = "selection-change")]
    SelectionChange(SelectionChangeMessage),
}

/// Events sent to clients.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "document-content")]
    DocumentContent(ContentMessage),
    #[serde(rename = "text-change")]
    TextChange(ContentMessage),
    #[serde(rename = "active-users")]
    ActiveUsers(ActiveUsersMessage),
    #[serde(rename = "user-cursor")]
    UserCursor(UserCursorMessage),
    #[serde(rename = "user-selection")]
    UserSelection(UserSelectionMessage),
    #[serde(rename = "user-left")]
    UserLeft(UserLeftMessage),
}
