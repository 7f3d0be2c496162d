use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;

/// Sidebar entry for a conversation, as returned by the conversation list
/// endpoint. The server orders these most recently updated first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub message_count: i64,
    #[serde(default)]
    pub latest_message: Option<MessagePreview>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessagePreview {
    pub content: String,
    pub role: String,
    pub created_at: String,
}

impl Conversation {
    /// Untitled conversations get the same placeholder the backend uses
    /// before the first exchange generates a title.
    pub fn display_title(&self) -> String {
        return self
            .title
            .clone()
            .filter(|title| return !title.is_empty())
            .unwrap_or_else(|| {
                return "New Conversation".to_string();
            });
    }
}

/// A fully loaded conversation thread.
pub struct ConversationThread {
    pub id: String,
    pub title: Option<String>,
    pub messages: Vec<Message>,
}
