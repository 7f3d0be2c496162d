use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::clipboard::ClipboardService;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::infrastructure::api::types::UsageStats;
use crate::infrastructure::api::ApiError;
use crate::infrastructure::api::ChatApi;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Clears the screen and starts a new conversation. The conversation is created on the server with your first message.
- /open (/o) [NUMBER|ID] - Opens a conversation from the sidebar, by its number or id.
- /delete (/d) [NUMBER|ID?] - Deletes a conversation, defaulting to the active one. Asks you to repeat the command before anything is removed.
- /conversations (/ls) - Refreshes the sidebar conversation list.
- /copy (/c) [CODE_BLOCK_NUMBER?] - Copies the entire chat history to your clipboard. When a CODE_BLOCK_NUMBER is used, only the specified code blocks are copied. Each code block in an assistant reply is indexed with a (NUMBER) at the start of the block.
- /stats - Shows your usage statistics.
- /quit /exit (/q) - Exit TalkFlow.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+B - Show or hide the conversation sidebar.
- CTRL+C - Cancel waiting for a reply if one is in progress, otherwise exit.
        "#;

    return text.trim().to_string();
}

fn format_stats(stats: &UsageStats) -> String {
    let mut lines = vec![
        format!("Usage for {username}:", username = stats.username),
        format!("- Messages sent: {n}", n = stats.total_messages),
        format!("- Tokens used: {n}", n = stats.total_tokens),
    ];

    if let Some(last_request_at) = &stats.last_request_at {
        lines.push(format!("- Last request: {last_request_at}"));
    }

    return lines.join("\n");
}

fn copy_messages(messages: Vec<Message>, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    let payload = if messages.len() == 1 {
        messages[0].text.to_string()
    } else {
        messages
            .iter()
            .map(|message| {
                return format!("{}: {}", message.author.to_string(), message.text);
            })
            .collect::<Vec<String>>()
            .join("\n\n")
    };

    if let Err(err) = ClipboardService::set(payload) {
        worker_error(err, tx)?;
        return Ok(());
    }

    tx.send(Event::Copied("chat log".to_string()))?;
    return Ok(());
}

fn copy_text(text: String, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    if let Err(err) = ClipboardService::set(text) {
        worker_error(err, tx)?;
        return Ok(());
    }

    tx.send(Event::Copied("code block".to_string()))?;
    return Ok(());
}

fn worker_error(err: anyhow::Error, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    tx.send(Event::AppMessage(Message::new_with_type(
        Author::App,
        MessageType::Error,
        &format!("The request failed with the following error: {:?}", err),
    )))?;

    return Ok(());
}

/// Background worker owning the API layer. Chat sends run in their own task
/// so CTRL+C can abort them; everything else is quick enough to handle
/// inline. Sidebar refreshes fail silently into the log, matching the
/// background-load policy.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        chat: ChatApi,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        loop {
            let event = rx.recv().await;
            if event.is_none() {
                continue;
            }

            match event.unwrap() {
                Action::AbortRequest() => {
                    worker.abort();
                }
                Action::SendChat {
                    text,
                    conversation_id,
                } => {
                    let api = chat.clone();
                    let worker_tx = tx.clone();
                    worker = tokio::spawn(async move {
                        match api.send_message(&text, conversation_id.as_deref()).await {
                            Ok(turn) => {
                                worker_tx.send(Event::ChatSuccess(turn))?;
                                // The sidebar ordering and titles change with
                                // every exchange.
                                match api.conversations().await {
                                    Ok(conversations) => {
                                        worker_tx
                                            .send(Event::ConversationsLoaded(conversations))?;
                                    }
                                    Err(err) => {
                                        tracing::error!(err = ?err, "failed to refresh conversations");
                                    }
                                }
                            }
                            Err(ApiError::SessionExpired) => {
                                worker_tx.send(Event::SessionExpired())?;
                            }
                            Err(err) => {
                                worker_tx.send(Event::ChatFailure(err.to_string()))?;
                            }
                        }

                        return Ok(());
                    });
                }
                Action::LoadConversations() => match chat.conversations().await {
                    Ok(conversations) => {
                        tx.send(Event::ConversationsLoaded(conversations))?;
                    }
                    Err(ApiError::SessionExpired) => {
                        tx.send(Event::SessionExpired())?;
                    }
                    Err(err) => {
                        tracing::error!(err = ?err, "failed to load conversations");
                    }
                },
                Action::OpenConversation(id) => match chat.conversation(&id).await {
                    Ok(thread) => {
                        tx.send(Event::ConversationOpened(thread))?;
                    }
                    Err(ApiError::SessionExpired) => {
                        tx.send(Event::SessionExpired())?;
                    }
                    Err(err) => {
                        // The prior view stays on screen.
                        tracing::error!(err = ?err, id = id, "failed to open conversation");
                    }
                },
                Action::DeleteConversation(id) => match chat.delete_conversation(&id).await {
                    Ok(()) => {
                        tx.send(Event::ConversationDeleted(id))?;
                    }
                    Err(ApiError::SessionExpired) => {
                        tx.send(Event::SessionExpired())?;
                    }
                    Err(err) => {
                        tracing::error!(err = ?err, id = id, "failed to delete conversation");
                    }
                },
                Action::FetchStats() => match chat.stats().await {
                    Ok(stats) => {
                        tx.send(Event::AppMessage(Message::new(
                            Author::App,
                            &format_stats(&stats),
                        )))?;
                    }
                    Err(ApiError::SessionExpired) => {
                        tx.send(Event::SessionExpired())?;
                    }
                    Err(err) => {
                        worker_error(err.into(), &tx)?;
                    }
                },
                Action::CopyText(text) => {
                    copy_text(text, &tx)?;
                }
                Action::CopyMessages(messages) => {
                    copy_messages(messages, &tx)?;
                }
            }
        }
    }
}
