use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::Sidebar;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    events: &mut EventsService,
) -> Result<()> {
    let mut textarea = TextArea::default();
    let loading = Loading::default();
    let sidebar = Sidebar::default();

    #[cfg(feature = "dev")]
    {
        let test_str = "Write a function in Java that prints from 0 to 10. Return in markdown, add language to code blocks, describe the example before and after.";
        for char in test_str.chars() {
            textarea.input(tui_textarea::Input {
                key: tui_textarea::Key::Char(char),
                ctrl: false,
                alt: false,
            });
        }
    }

    loop {
        let notice = app_state.notice.as_ref().map(|notice| {
            return notice.text.to_string();
        });
        textarea.set_block(TextArea::block(notice));

        terminal.draw(|frame| {
            let mut sidebar_width = 0;
            if app_state.show_sidebar {
                sidebar_width = 34.min(frame.size().width / 3);
            }

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![
                    Constraint::Length(sidebar_width),
                    Constraint::Min(1),
                ])
                .split(frame.size());

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Min(1), Constraint::Max(4)])
                .split(columns[1]);

            if layout[0].width != app_state.last_known_width
                || layout[0].height != app_state.last_known_height
            {
                app_state.set_rect(layout[0]);
            }

            app_state
                .bubble_list
                .render(frame, layout[0], app_state.scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                layout[0].inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );

            if app_state.waiting_for_backend {
                loading.render(frame, layout[1]);
            } else {
                frame.render_widget(textarea.widget(), layout[1]);
            }

            if app_state.show_sidebar {
                sidebar.render(
                    frame,
                    columns[0],
                    &app_state.conversations,
                    app_state.active_conversation.as_deref(),
                );
            }
        })?;

        match events.next().await? {
            Event::AppMessage(message) => {
                app_state.add_message(message);
            }
            Event::ChatSuccess(turn) => {
                app_state.handle_chat_success(turn);
            }
            Event::ChatFailure(detail) => {
                app_state.handle_chat_failure(&detail);
            }
            Event::ConversationsLoaded(conversations) => {
                app_state.set_conversations(conversations);
            }
            Event::ConversationOpened(thread) => {
                app_state.open_conversation(thread);
            }
            Event::ConversationDeleted(id) => {
                app_state.handle_conversation_deleted(&id);
            }
            Event::Copied(what) => {
                app_state.set_notice(&format!("Copied {what} to clipboard"));
            }
            Event::SessionExpired() => {
                app_state.session_expired = true;
                break;
            }
            Event::KeyboardCTRLB() => {
                app_state.toggle_sidebar();
            }
            Event::KeyboardCTRLC() => {
                if app_state.waiting_for_backend {
                    tx.send(Action::AbortRequest())?;
                    app_state.abort_send();
                    continue;
                }
                break;
            }
            Event::KeyboardEnter() => {
                if app_state.waiting_for_backend {
                    continue;
                }

                let input_str = &textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }

                let (should_break, handled) = app_state.handle_slash_commands(input_str, &tx)?;
                if should_break {
                    break;
                }
                if handled {
                    textarea = TextArea::default();
                    continue;
                }

                app_state.submit_message(input_str, &tx)?;
                textarea = TextArea::default();
            }
            Event::KeyboardCharInput(input) => {
                if !app_state.waiting_for_backend {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !app_state.waiting_for_backend {
                    textarea.insert_str(&text);
                }
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UITick() => {
                app_state.tick();
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    disable_raw_mode().unwrap();
    crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .unwrap();
    crossterm::execute!(io::stdout(), cursor::Show).unwrap();
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut app_state = AppState::new(
        &Config::get(ConfigKey::Theme),
        &Config::get(ConfigKey::ThemeFile),
    )?;

    // Matches the first thing the web client does after mounting.
    tx.send(Action::LoadConversations())?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut events = EventsService::new(rx);
    let res = start_loop(&mut terminal, &mut app_state, tx, &mut events).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if app_state.session_expired {
        println!(
            "{}",
            Paint::yellow("Your session has expired. Run `talkflow login` to sign in again.")
        );
    }

    return res;
}
