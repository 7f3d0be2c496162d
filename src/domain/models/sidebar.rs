use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::Frame;

use super::Conversation;

/// Conversation list pane. Entries are numbered so `/open N` and `/delete N`
/// can refer to them without typing ids.
#[derive(Default)]
pub struct Sidebar {}

impl Sidebar {
    pub fn render<B: Backend>(
        &self,
        frame: &mut Frame<B>,
        rect: Rect,
        conversations: &[Conversation],
        active_id: Option<&str>,
    ) {
        let items = conversations
            .iter()
            .enumerate()
            .map(|(idx, conversation)| {
                let n = idx + 1;
                let mut title = conversation.display_title();
                let max_width = rect.width.saturating_sub(8) as usize;
                if title.len() > max_width {
                    title = format!("{}...", &title[..max_width.saturating_sub(3)]);
                }

                let mut style = Style::default();
                if active_id == Some(conversation.id.as_str()) {
                    style = Style::default()
                        .fg(Color::Rgb(79, 70, 229))
                        .add_modifier(Modifier::BOLD);
                }

                return ListItem::new(format!("({n}) {title}")).style(style);
            })
            .collect::<Vec<ListItem>>();

        frame.render_widget(
            List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .title("Conversations"),
            ),
            rect,
        );
    }
}
