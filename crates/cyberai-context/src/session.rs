//! In-memory chat session store

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ContextError, ContextResult};
use crate::message::Message;

/// A titled conversation and its ordered messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub mode: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(title: impl Into<String>, mode: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            mode: mode.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }
}

/// Session history shared between the REPL and the dispatcher.
///
/// Sessions are append-only; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, ChatSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its id
    pub async fn create_session(&self, title: impl Into<String>, mode: impl Into<String>) -> String {
        let session = ChatSession::new(title, mode);
        let id = session.id.clone();
        tracing::debug!(session_id = %id, "created chat session");
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    /// Get a session by ID
    pub async fn get_session(&self, id: &str) -> ContextResult<ChatSession> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ContextError::SessionNotFound(id.to_string()))
    }

    /// Append a message to a session
    pub async fn append_message(&self, session_id: &str, message: Message) -> ContextResult<()> {
        if message.id.is_empty() {
            return Err(ContextError::InvalidMessage("message id is empty".to_string()));
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ContextError::SessionNotFound(session_id.to_string()))?;
        session.push(message);
        Ok(())
    }

    /// Snapshot of a session's messages in chronological order
    pub async fn history(&self, session_id: &str) -> ContextResult<Vec<Message>> {
        Ok(self.get_session(session_id).await?.messages)
    }

    /// Delete a session
    pub async fn delete_session(&self, id: &str) -> ContextResult<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ContextError::SessionNotFound(id.to_string()))
    }

    /// All sessions, most recently updated first
    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        let mut sessions: Vec<ChatSession> = self.sessions.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Serialize a session for export
    pub async fn export_json(&self, id: &str) -> ContextResult<String> {
        let session = self.get_session(id).await?;
        Ok(serde_json::to_string_pretty(&session)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let store = SessionStore::new();
        let id = store.create_session("New Chat", "cyber").await;
        let session = store.get_session(&id).await.unwrap();
        assert!(session.messages.is_empty());
        assert_eq!(session.mode, "cyber");
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = SessionStore::new();
        let id = store.create_session("New Chat", "normal").await;

        store.append_message(&id, Message::user("first")).await.unwrap();
        store.append_message(&id, Message::assistant("second")).await.unwrap();

        let history = store.history(&id).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let store = SessionStore::new();
        let err = store.append_message("nope", Message::user("x")).await.unwrap_err();
        assert!(matches!(err, ContextError::SessionNotFound(id) if id == "nope"));
        assert!(store.delete_session("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_empty_message_id() {
        let store = SessionStore::new();
        let id = store.create_session("t", "normal").await;
        let err = store
            .append_message(&id, Message::user("x").with_id(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::InvalidMessage(_)));
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let store = SessionStore::new();
        let a = store.create_session("a", "normal").await;
        let b = store.create_session("b", "coder").await;
        store.append_message(&a, Message::user("bump")).await.unwrap();

        let listed = store.list_sessions().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a);

        store.delete_session(&b).await.unwrap();
        assert_eq!(store.list_sessions().await.len(), 1);
    }

    #[test]
    fn test_export_json_round_trips_messages() {
        tokio_test::block_on(async {
            let store = SessionStore::new();
            let id = store.create_session("export", "research").await;
            store.append_message(&id, Message::user("hello")).await.unwrap();

            let json = store.export_json(&id).await.unwrap();
            let parsed: ChatSession = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.messages.len(), 1);
            assert_eq!(parsed.title, "export");
        });
    }
}
