//! Message popup for export results and errors

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const POPUP_WIDTH: u16 = 56;
const POPUP_HEIGHT: u16 = 8;

/// Bordered popup with a title, a wrapped message and a dismiss hint
pub struct MessagePopup<'a> {
    title: &'a str,
    message: &'a str,
    color: Color,
}

impl<'a> MessagePopup<'a> {
    pub fn new(title: &'a str, message: &'a str, color: Color) -> Self {
        Self {
            title,
            message,
            color,
        }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }
}

impl Widget for MessagePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.color));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Padding
            Constraint::Min(1),    // Message
            Constraint::Length(1), // Hint
        ])
        .split(inner);

        let line = Line::from(Span::styled(
            self.message,
            Style::default().fg(self.color).add_modifier(Modifier::BOLD),
        ));
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "Presiona cualquier tecla",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}
