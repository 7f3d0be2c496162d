use tui_textarea::Input;

use super::ChatTurn;
use super::Conversation;
use super::ConversationThread;
use super::Message;

pub enum Event {
    AppMessage(Message),
    ChatFailure(String),
    ChatSuccess(ChatTurn),
    ConversationDeleted(String),
    ConversationOpened(ConversationThread),
    ConversationsLoaded(Vec<Conversation>),
    Copied(String),
    SessionExpired(),
    KeyboardCharInput(Input),
    KeyboardCTRLB(),
    KeyboardCTRLC(),
    KeyboardEnter(),
    KeyboardPaste(String),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
