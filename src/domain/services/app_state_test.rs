use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;
use test_utils::codeblock_fixture;
use tokio::sync::mpsc;

use super::AppState;
use super::Notice;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::ChatTurn;
use crate::domain::models::Conversation;
use crate::domain::models::ConversationThread;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::services::BubbleList;
use crate::domain::services::CodeBlocks;
use crate::domain::services::Scroll;
use crate::domain::services::Themes;

impl Default for AppState<'static> {
    fn default() -> AppState<'static> {
        let theme = Themes::get("base16-ocean.dark", "").unwrap();
        return AppState {
            active_conversation: None,
            bubble_list: BubbleList::new(theme),
            codeblocks: CodeBlocks::default(),
            conversations: vec![],
            last_known_height: 300,
            last_known_width: 100,
            messages: vec![],
            notice: None,
            pending_delete: None,
            pending_send: None,
            scroll: Scroll::default(),
            session_expired: false,
            show_sidebar: true,
            waiting_for_backend: false,
        };
    }
}

fn conversation(id: &str, title: &str) -> Conversation {
    return Conversation {
        id: id.to_string(),
        title: Some(title.to_string()),
        created_at: "2026-01-04T09:00:00Z".to_string(),
        updated_at: "2026-01-05T10:00:00Z".to_string(),
        message_count: 2,
        latest_message: None,
    };
}

fn server_message(id: &str, author: Author, text: &str) -> Message {
    let mut msg = Message::new(author, text);
    msg.id = id.to_string();
    return msg;
}

fn hello_turn() -> ChatTurn {
    return ChatTurn {
        conversation_id: "7".to_string(),
        user_message: server_message("1", Author::User, "Hello"),
        assistant_message: server_message("2", Author::Assistant, "Hi there"),
    };
}

mod submit_message {
    use super::*;

    #[test]
    fn it_rejects_empty_and_whitespace_text() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("", &tx)?;
        app_state.submit_message("   \n  ", &tx)?;

        assert!(app_state.messages.is_empty());
        assert!(!app_state.waiting_for_backend);
        assert!(rx.try_recv().is_err());
        return Ok(());
    }

    #[test]
    fn it_appends_an_optimistic_echo_and_dispatches() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Hello", &tx)?;

        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.messages[0].author, Author::User);
        assert_eq!(app_state.messages[0].text, "Hello");
        assert_eq!(
            app_state.pending_send.as_deref(),
            Some(app_state.messages[0].id.as_str())
        );
        assert!(app_state.waiting_for_backend);

        match rx.blocking_recv().unwrap() {
            Action::SendChat {
                text,
                conversation_id,
            } => {
                assert_eq!(text, "Hello");
                assert_eq!(conversation_id, None);
            }
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_rejects_a_send_while_one_is_in_flight() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Hello", &tx)?;
        app_state.submit_message("Again", &tx)?;

        assert_eq!(app_state.messages.len(), 1);
        assert!(rx.blocking_recv().is_some());
        assert!(rx.try_recv().is_err());
        return Ok(());
    }

    #[test]
    fn it_sends_the_active_conversation_id() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.active_conversation = Some("abc".to_string());

        app_state.submit_message("Hello", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::SendChat {
                conversation_id, ..
            } => assert_eq!(conversation_id.as_deref(), Some("abc")),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }
}

mod chat_reconciliation {
    use super::*;

    #[test]
    fn it_replaces_the_echo_with_the_server_pair() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Hello", &tx)?;
        app_state.handle_chat_success(hello_turn());

        assert_eq!(app_state.messages.len(), 2);
        assert_eq!(app_state.messages[0].id, "1");
        assert_eq!(app_state.messages[0].author, Author::User);
        assert_eq!(app_state.messages[0].text, "Hello");
        assert_eq!(app_state.messages[1].id, "2");
        assert_eq!(app_state.messages[1].author, Author::Assistant);
        assert_eq!(app_state.messages[1].text, "Hi there");
        assert_eq!(app_state.active_conversation.as_deref(), Some("7"));
        assert!(app_state.pending_send.is_none());
        assert!(!app_state.waiting_for_backend);
        return Ok(());
    }

    #[test]
    fn it_indexes_codeblocks_from_the_reply() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Show me code", &tx)?;
        let mut turn = hello_turn();
        turn.assistant_message = server_message("2", Author::Assistant, codeblock_fixture());
        app_state.handle_chat_success(turn);

        let command = crate::domain::models::SlashCommand::parse("/c 1").unwrap();
        let block = app_state.codeblocks.blocks_from_slash_commands(&command)?;
        assert!(block.contains("fn reverse"));
        return Ok(());
    }

    #[test]
    fn it_removes_the_echo_on_failure_without_an_assistant_reply() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Hello", &tx)?;
        app_state.handle_chat_failure("HTTP 500");

        assert!(!app_state.waiting_for_backend);
        assert!(app_state.pending_send.is_none());
        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.messages[0].author, Author::App);
        assert_eq!(app_state.messages[0].message_type(), MessageType::Error);
        assert!(!app_state
            .messages
            .iter()
            .any(|msg| return msg.author == Author::Assistant));
        return Ok(());
    }

    #[test]
    fn it_removes_the_echo_on_abort() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.submit_message("Hello", &tx)?;
        app_state.abort_send();

        assert!(!app_state.waiting_for_backend);
        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.messages[0].author, Author::App);
        return Ok(());
    }
}

mod conversations {
    use super::*;

    #[test]
    fn it_replaces_the_thread_when_opening() {
        let mut app_state = AppState::default();
        app_state.messages = vec![Message::new(Author::User, "old")];

        app_state.open_conversation(ConversationThread {
            id: "abc".to_string(),
            title: Some("Rust lifetimes".to_string()),
            messages: vec![
                server_message("1", Author::User, "Explain lifetimes"),
                server_message("2", Author::Assistant, "A lifetime is..."),
            ],
        });

        assert_eq!(app_state.messages.len(), 2);
        assert_eq!(app_state.active_conversation.as_deref(), Some("abc"));
    }

    #[test]
    fn it_resets_to_a_new_chat_when_the_active_conversation_is_deleted() {
        let mut app_state = AppState::default();
        app_state.set_conversations(vec![
            conversation("abc", "First"),
            conversation("def", "Second"),
        ]);
        app_state.active_conversation = Some("abc".to_string());
        app_state.messages = vec![Message::new(Author::User, "old")];

        app_state.handle_conversation_deleted("abc");

        assert_eq!(app_state.conversations.len(), 1);
        assert!(app_state.messages.is_empty());
        assert!(app_state.active_conversation.is_none());
    }

    #[test]
    fn it_keeps_the_thread_when_another_conversation_is_deleted() {
        let mut app_state = AppState::default();
        app_state.set_conversations(vec![
            conversation("abc", "First"),
            conversation("def", "Second"),
        ]);
        app_state.active_conversation = Some("def".to_string());
        app_state.messages = vec![Message::new(Author::User, "old")];

        app_state.handle_conversation_deleted("abc");

        assert_eq!(app_state.conversations.len(), 1);
        assert_eq!(app_state.messages.len(), 1);
        assert_eq!(app_state.active_conversation.as_deref(), Some("def"));
    }
}

mod handle_slash_commands {
    use super::*;

    #[test]
    fn it_breaks_on_quit() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        let (should_break, handled) = app_state.handle_slash_commands("/q", &tx)?;

        assert!(should_break);
        assert!(handled);
        return Ok(());
    }

    #[test]
    fn it_passes_through_regular_messages() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        let (should_break, handled) = app_state.handle_slash_commands("hello there", &tx)?;

        assert!(!should_break);
        assert!(!handled);
        return Ok(());
    }

    #[test]
    fn it_starts_a_new_chat() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.active_conversation = Some("abc".to_string());
        app_state.messages = vec![Message::new(Author::User, "old")];

        let (should_break, handled) = app_state.handle_slash_commands("/new", &tx)?;

        assert!(!should_break);
        assert!(handled);
        assert!(app_state.messages.is_empty());
        assert!(app_state.active_conversation.is_none());
        return Ok(());
    }

    #[test]
    fn it_opens_a_conversation_by_index() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.set_conversations(vec![
            conversation("abc", "First"),
            conversation("def", "Second"),
        ]);

        app_state.handle_slash_commands("/open 2", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::OpenConversation(id) => assert_eq!(id, "def"),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_rejects_an_out_of_range_open() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.set_conversations(vec![conversation("abc", "First")]);

        app_state.handle_slash_commands("/open 99", &tx)?;

        assert!(rx.try_recv().is_err());
        let last_message = app_state.messages.last().unwrap();
        assert_eq!(last_message.author, Author::App);
        assert_eq!(last_message.message_type(), MessageType::Error);
        insta::assert_snapshot!(last_message.text, @"99 is not a valid entry from the conversation list.");
        return Ok(());
    }

    #[test]
    fn it_requires_confirmation_before_deleting() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.set_conversations(vec![conversation("abc", "First")]);

        app_state.handle_slash_commands("/delete 1", &tx)?;

        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.pending_delete.as_deref(), Some("abc"));

        app_state.handle_slash_commands("/delete 1", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::DeleteConversation(id) => assert_eq!(id, "abc"),
            _ => bail!("Wrong enum"),
        }
        assert!(app_state.pending_delete.is_none());
        return Ok(());
    }

    #[test]
    fn it_defaults_delete_to_the_active_conversation() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.active_conversation = Some("abc".to_string());

        app_state.handle_slash_commands("/delete", &tx)?;
        app_state.handle_slash_commands("/delete", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::DeleteConversation(id) => assert_eq!(id, "abc"),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_rejects_delete_without_a_target() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.handle_slash_commands("/delete", &tx)?;

        assert!(rx.try_recv().is_err());
        let last_message = app_state.messages.last().unwrap();
        assert_eq!(last_message.message_type(), MessageType::Error);
        return Ok(());
    }

    #[test]
    fn it_copies_a_code_block() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state
            .codeblocks
            .replace_from_messages(&[Message::new(Author::Assistant, codeblock_fixture())]);

        app_state.handle_slash_commands("/copy 1", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::CopyText(block) => assert!(block.contains("fn reverse")),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_copies_the_chat() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.add_message(Message::new(Author::User, "Hello world"));

        app_state.handle_slash_commands("/copy", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::CopyMessages(messages) => assert_eq!(messages.len(), 1),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_returns_an_error_message_on_an_invalid_codeblock() -> Result<()> {
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state
            .codeblocks
            .replace_from_messages(&[Message::new(Author::Assistant, codeblock_fixture())]);

        app_state.handle_slash_commands("/copy 1000", &tx)?;
        let last_message = app_state.messages.last().unwrap();

        assert_eq!(last_message.author, Author::App);
        assert_eq!(last_message.message_type(), MessageType::Error);
        insta::assert_snapshot!(last_message.text, @r###"
        There was an error trying to parse your command:

        Code block index 1000 is not valid
        "###);
        return Ok(());
    }

    #[test]
    fn it_requests_the_conversation_list() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();
        app_state.show_sidebar = false;

        app_state.handle_slash_commands("/ls", &tx)?;

        assert!(app_state.show_sidebar);
        match rx.blocking_recv().unwrap() {
            Action::LoadConversations() => {}
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_requests_stats() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = AppState::default();

        app_state.handle_slash_commands("/stats", &tx)?;

        match rx.blocking_recv().unwrap() {
            Action::FetchStats() => {}
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }
}

mod notices {
    use super::*;

    #[test]
    fn it_keeps_a_fresh_notice() {
        let mut app_state = AppState::default();
        app_state.set_notice("Copied code block to clipboard");
        app_state.tick();

        assert!(app_state.notice.is_some());
    }

    #[test]
    fn it_clears_an_expired_notice() {
        let mut app_state = AppState::default();
        app_state.notice = Some(Notice {
            text: "Copied code block to clipboard".to_string(),
            shown_at: Instant::now() - Duration::from_secs(3),
        });
        app_state.tick();

        assert!(app_state.notice.is_none());
    }
}
