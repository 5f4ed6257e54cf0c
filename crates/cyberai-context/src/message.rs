//! Chat message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Wire role used by chat-completions APIs.
    pub fn as_role(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// A single chat message. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u32>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            model: None,
            token_count: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    /// Replace the generated id with a caller-supplied opaque one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Record which model produced this message and how many tokens it used.
    pub fn with_model(mut self, model: impl Into<String>, token_count: u32) -> Self {
        self.model = Some(model.into());
        self.token_count = Some(token_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_sender_and_unique_ids() {
        let a = Message::user("hi");
        let b = Message::assistant("hello");

        assert_eq!(a.sender, Sender::User);
        assert_eq!(b.sender, Sender::Assistant);
        assert_ne!(a.id, b.id);
        assert!(a.model.is_none());
    }

    #[test]
    fn sender_maps_to_wire_role() {
        assert_eq!(Sender::User.as_role(), "user");
        assert_eq!(Sender::Assistant.as_role(), "assistant");
    }

    #[test]
    fn serializes_sender_lowercase_and_skips_empty_metadata() {
        let msg = Message::user("ping").with_id("m-1");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["id"], "m-1");
        assert_eq!(json["sender"], "user");
        assert!(json.get("model").is_none());
        assert!(json.get("token_count").is_none());
    }

    #[test]
    fn with_model_records_attribution() {
        let msg = Message::assistant("answer").with_model("Mixtral 8x7B", 42);

        assert_eq!(msg.model.as_deref(), Some("Mixtral 8x7B"));
        assert_eq!(msg.token_count, Some(42));
    }
}
