#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use serde_json::json;

use super::client::ApiClient;
use super::client::ApiError;
use super::types::ChatData;
use super::types::ChatMessageData;
use super::types::ChatRequest;
use super::types::ConversationDetail;
use super::types::ConversationList;
use super::types::Envelope;
use super::types::MaybePaginated;
use super::types::UsageStats;
use crate::domain::models::ChatTurn;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationThread;
use crate::domain::models::Message;

/// Conversation and message operations against the chat endpoints.
#[derive(Clone)]
pub struct ChatApi {
    client: ApiClient,
}

impl ChatApi {
    pub fn new(client: ApiClient) -> ChatApi {
        return ChatApi { client };
    }

    /// Sends one user message. Omitting the conversation id asks the server
    /// to open a new conversation, whose id comes back in the turn.
    pub async fn send_message(
        &self,
        text: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatTurn, ApiError> {
        let req = ChatRequest {
            message: text.to_string(),
            conversation_id: conversation_id.map(|id| return id.to_string()),
        };
        let res: Envelope<ChatData> = self.client.post_json("/chat/", json!(req)).await?;

        return Ok(ChatTurn {
            conversation_id: res.data.conversation_id,
            user_message: Message::from(res.data.user_message),
            assistant_message: Message::from(res.data.assistant_message),
        });
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let res: ConversationList = self.client.get_json("/chat/conversations/").await?;
        return Ok(res.into_items());
    }

    pub async fn conversation(&self, id: &str) -> Result<ConversationThread, ApiError> {
        let res: ConversationDetail = self
            .client
            .get_json(&format!("/chat/conversations/{id}/"))
            .await?;

        return Ok(ConversationThread {
            id: res.id,
            title: res.title,
            messages: res.messages.into_iter().map(Message::from).collect(),
        });
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        // The body is a bare success/message acknowledgement.
        let _: serde_json::Value = self
            .client
            .delete_json(&format!("/chat/conversations/{id}/"))
            .await?;

        return Ok(());
    }

    pub async fn history(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let res: MaybePaginated<ChatMessageData> = self
            .client
            .get_json(&format!("/chat/history/?conversation_id={conversation_id}"))
            .await?;

        return Ok(res.into_items().into_iter().map(Message::from).collect());
    }

    pub async fn stats(&self) -> Result<UsageStats, ApiError> {
        return self.client.get_json("/chat/stats/").await;
    }
}
