use super::Message;

pub enum Action {
    AbortRequest(),
    CopyMessages(Vec<Message>),
    CopyText(String),
    DeleteConversation(String),
    FetchStats(),
    LoadConversations(),
    OpenConversation(String),
    SendChat {
        text: String,
        conversation_id: Option<String>,
    },
}
