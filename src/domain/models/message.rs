#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
use chrono::Local;
use chrono::SecondsFormat;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

use super::Author;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Normal,
    Error,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub author: Author,
    pub text: String,
    mtype: MessageType,
    pub created_at: String,
    pub tokens_used: Option<i64>,
    pub model_used: Option<String>,
}

impl Message {
    /// Builds a client-side message with a locally generated id. Server
    /// messages come through `From<ChatMessageData>` instead and keep their
    /// backend ids.
    pub fn new(author: Author, text: &str) -> Message {
        return Message {
            id: Uuid::new_v4().to_string(),
            author,
            text: text.to_string().replace('\t', "  "),
            mtype: MessageType::Normal,
            created_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            tokens_used: None,
            model_used: None,
        };
    }

    pub fn new_with_type(author: Author, mtype: MessageType, text: &str) -> Message {
        let mut msg = Message::new(author, text);
        msg.mtype = mtype;
        return msg;
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    /// Usage footer shown under assistant bubbles when the backend reported
    /// token accounting for the reply.
    pub fn usage_footer(&self) -> Option<String> {
        let tokens = self.tokens_used?;
        let model = self.model_used.clone().unwrap_or_else(|| {
            return "unknown".to_string();
        });

        return Some(format!("tokens: {tokens} | model: {model}"));
    }

    pub fn codeblocks(&self) -> Vec<String> {
        let mut codeblocks: Vec<String> = vec![];
        let mut current_codeblock: Vec<&str> = vec![];
        let mut in_codeblock = false;

        for line in self.text.split('\n') {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                if in_codeblock {
                    codeblocks.push(current_codeblock.join("\n"));
                    current_codeblock = vec![];
                }
                in_codeblock = !in_codeblock;
                continue;
            }

            if in_codeblock {
                current_codeblock.push(line);
            }
        }

        return codeblocks;
    }
}

/// One reconciled chat exchange as confirmed by the server: the stored user
/// message and the assistant reply, plus the conversation they landed in.
pub struct ChatTurn {
    pub conversation_id: String,
    pub user_message: Message,
    pub assistant_message: Message,
}
