use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn default() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(TextArea::block(None));

        return textarea;
    }

    /// The input box border, optionally carrying a transient notice in the
    /// title (for example the copied-to-clipboard confirmation).
    pub fn block(notice: Option<String>) -> Block<'a> {
        let title = notice.unwrap_or_else(|| {
            return "Message TalkFlow (/help for commands)".to_string();
        });

        return Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .title(title)
            .padding(Padding::new(1, 1, 0, 0));
    }
}
