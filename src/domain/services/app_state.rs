#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::actions::help_text;
use super::BubbleList;
use super::CodeBlocks;
use super::Scroll;
use super::Themes;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::ChatTurn;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationThread;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SlashCommand;

const NOTICE_LIFETIME: Duration = Duration::from_secs(2);

/// A transient status line, shown in the input box title and cleared by the
/// UI tick once it has been on screen for two seconds.
pub struct Notice {
    pub text: String,
    pub shown_at: Instant,
}

pub struct AppState<'a> {
    pub active_conversation: Option<String>,
    pub bubble_list: BubbleList<'a>,
    pub codeblocks: CodeBlocks,
    pub conversations: Vec<Conversation>,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub messages: Vec<Message>,
    pub notice: Option<Notice>,
    pub pending_delete: Option<String>,
    pub pending_send: Option<String>,
    pub scroll: Scroll,
    pub session_expired: bool,
    pub show_sidebar: bool,
    pub waiting_for_backend: bool,
}

impl<'a> AppState<'a> {
    pub fn new(theme_name: &str, theme_file: &str) -> Result<AppState<'a>> {
        let theme = Themes::get(theme_name, theme_file)?;

        let mut app_state = AppState {
            active_conversation: None,
            bubble_list: BubbleList::new(theme),
            codeblocks: CodeBlocks::default(),
            conversations: vec![],
            last_known_height: 0,
            last_known_width: 0,
            messages: vec![],
            notice: None,
            pending_delete: None,
            pending_send: None,
            scroll: Scroll::default(),
            session_expired: false,
            show_sidebar: true,
            waiting_for_backend: false,
        };

        // Pushed directly: the viewport size is unknown until the first
        // draw, so dependants must not sync yet.
        app_state.messages.push(Message::new(
            Author::App,
            "How can I help you today? Type a message below to start, or /help for commands.",
        ));

        return Ok(app_state);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.sync_dependants();
        self.scroll.last();
    }

    /// Starts a send: the message is echoed locally right away under a
    /// client-generated id and reconciled when the server answers. Empty
    /// input and overlapping sends are rejected without touching anything.
    pub fn submit_message(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.waiting_for_backend || text.trim().is_empty() {
            return Ok(());
        }

        let echo = Message::new(Author::User, text);
        self.pending_send = Some(echo.id.clone());
        self.waiting_for_backend = true;
        self.add_message(echo);

        tx.send(Action::SendChat {
            text: text.to_string(),
            conversation_id: self.active_conversation.clone(),
        })?;

        return Ok(());
    }

    /// Reconciles a confirmed turn: the optimistic echo goes away first, then
    /// the server's user/assistant pair lands, and the active conversation
    /// becomes whatever the server assigned.
    pub fn handle_chat_success(&mut self, turn: ChatTurn) {
        self.remove_pending_echo();
        self.messages.push(turn.user_message);
        self.messages.push(turn.assistant_message);
        self.active_conversation = Some(turn.conversation_id);
        self.waiting_for_backend = false;

        self.codeblocks.replace_from_messages(&self.messages);
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn handle_chat_failure(&mut self, detail: &str) {
        self.remove_pending_echo();
        self.waiting_for_backend = false;
        self.add_message(Message::new_with_type(
            Author::App,
            MessageType::Error,
            &format!("Failed to send message: {detail}"),
        ));
    }

    pub fn abort_send(&mut self) {
        self.remove_pending_echo();
        self.waiting_for_backend = false;
        self.add_message(Message::new(Author::App, "Request aborted."));
    }

    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
    }

    pub fn open_conversation(&mut self, thread: ConversationThread) {
        if let Some(title) = &thread.title {
            self.set_notice(&format!("Opened {title}"));
        }

        self.messages = thread.messages;
        self.active_conversation = Some(thread.id);
        self.pending_delete = None;

        self.codeblocks.replace_from_messages(&self.messages);
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn handle_conversation_deleted(&mut self, id: &str) {
        self.conversations.retain(|conversation| {
            return conversation.id != id;
        });
        if self.active_conversation.as_deref() == Some(id) {
            self.new_chat();
        }

        self.set_notice("Conversation deleted");
    }

    pub fn new_chat(&mut self) {
        self.messages = vec![];
        self.active_conversation = None;
        self.pending_delete = None;
        self.codeblocks.clear();
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    pub fn set_notice(&mut self, text: &str) {
        self.notice = Some(Notice {
            text: text.to_string(),
            shown_at: Instant::now(),
        });
    }

    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.shown_at.elapsed() >= NOTICE_LIFETIME {
                self.notice = None;
            }
        }
    }

    /// Returns (should_break, handled). A handled command ends the input
    /// round; an unhandled string is a regular chat message.
    pub fn handle_slash_commands(
        &mut self,
        input_str: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        let command = match SlashCommand::parse(input_str) {
            Some(command) => command,
            None => return Ok((false, false)),
        };

        if command.is_quit() {
            return Ok((true, true));
        }

        if command.is_new_chat() {
            self.new_chat();
            return Ok((false, true));
        }

        if command.is_list_conversations() {
            self.show_sidebar = true;
            tx.send(Action::LoadConversations())?;
            return Ok((false, true));
        }

        if command.is_open_conversation() {
            match self.resolve_conversation_target(&command.args) {
                Ok(id) => {
                    tx.send(Action::OpenConversation(id))?;
                }
                Err(err) => {
                    self.add_error(&err.to_string());
                }
            }
            return Ok((false, true));
        }

        if command.is_delete_conversation() {
            self.handle_delete_command(&command.args, tx)?;
            return Ok((false, true));
        }

        if command.is_copy_code_block() {
            match self.codeblocks.blocks_from_slash_commands(&command) {
                Ok(blocks) => {
                    tx.send(Action::CopyText(blocks))?;
                }
                Err(err) => {
                    self.add_error(&format!(
                        "There was an error trying to parse your command:\n\n{err}"
                    ));
                }
            }
            return Ok((false, true));
        }

        if command.is_copy_chat() {
            tx.send(Action::CopyMessages(self.messages.clone()))?;
            return Ok((false, true));
        }

        if command.is_stats() {
            tx.send(Action::FetchStats())?;
            return Ok((false, true));
        }

        if command.is_help() {
            self.add_message(Message::new(Author::App, &help_text()));
        }

        return Ok((false, true));
    }

    /// Destructive, so it takes asking twice: the first `/delete` arms the
    /// target, repeating the identical command dispatches it.
    fn handle_delete_command(
        &mut self,
        args: &[String],
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let id = match self.resolve_delete_target(args) {
            Ok(id) => id,
            Err(err) => {
                self.add_error(&err.to_string());
                return Ok(());
            }
        };

        if self.pending_delete.as_deref() == Some(id.as_str()) {
            self.pending_delete = None;
            tx.send(Action::DeleteConversation(id))?;
            return Ok(());
        }

        self.pending_delete = Some(id.clone());
        self.add_message(Message::new(
            Author::App,
            "Deleting a conversation cannot be undone. Repeat the same /delete command to confirm.",
        ));

        return Ok(());
    }

    fn resolve_delete_target(&self, args: &[String]) -> Result<String> {
        if args.is_empty() {
            return self
                .active_conversation
                .clone()
                .ok_or_else(|| return anyhow!("There is no active conversation to delete."));
        }

        return self.resolve_conversation_target(args);
    }

    fn resolve_conversation_target(&self, args: &[String]) -> Result<String> {
        let arg = args
            .first()
            .ok_or_else(|| return anyhow!("You must pass a conversation number or id."))?;

        if let Ok(idx) = arg.parse::<usize>() {
            if idx < 1 || idx > self.conversations.len() {
                bail!("{idx} is not a valid entry from the conversation list.");
            }
            return Ok(self.conversations[idx - 1].id.clone());
        }

        return Ok(arg.to_string());
    }

    fn add_error(&mut self, text: &str) {
        self.add_message(Message::new_with_type(
            Author::App,
            MessageType::Error,
            text,
        ));
    }

    fn remove_pending_echo(&mut self) {
        if let Some(local_id) = self.pending_send.take() {
            self.messages.retain(|message| {
                return message.id != local_id;
            });
        }
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(&self.messages, self.last_known_width as usize);

        self.scroll
            .set_state(self.bubble_list.len() as u16, self.last_known_height);

        if self.waiting_for_backend {
            self.scroll.last();
        }
    }
}
