use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::domain::models::Author;
use crate::domain::models::Conversation;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::UserProfile;

/// Wrapper the backend puts around register, login, and chat responses.
/// Profile and list endpoints return their payloads bare. The wrapper also
/// carries `success` and `message` flags, which the client ignores: the HTTP
/// status already encodes them.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterData {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// One confirmed exchange. The response also aggregates prompt/completion
/// token usage, but the per-message `tokens_used` field is what the UI
/// renders, so the aggregate is not modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatData {
    pub conversation_id: String,
    pub user_message: ChatMessageData,
    pub assistant_message: ChatMessageData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageData {
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub tokens_used: Option<i64>,
    #[serde(default)]
    pub model_used: Option<String>,
    pub created_at: String,
}

impl From<ChatMessageData> for Message {
    fn from(data: ChatMessageData) -> Message {
        let mut msg = Message::new_with_type(
            Author::from_role(&data.role),
            MessageType::Normal,
            &data.content,
        );
        msg.id = data.id;
        msg.created_at = data.created_at;
        msg.tokens_used = data.tokens_used;
        msg.model_used = data.model_used;

        return msg;
    }
}

/// Some list endpoints are paginated by DRF and some are not, depending on
/// backend settings; both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybePaginated<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> MaybePaginated<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            MaybePaginated::Paginated { results } => return results,
            MaybePaginated::Plain(items) => return items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationDetail {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub messages: Vec<ChatMessageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageStats {
    pub username: String,
    pub total_messages: i64,
    pub total_tokens: i64,
    #[serde(default)]
    pub last_request_at: Option<String>,
}

pub type ConversationList = MaybePaginated<Conversation>;
