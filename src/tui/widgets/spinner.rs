//! Loading spinner frames and the empty-state splash

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Spinner animation frames
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// App branding
const APP_NAME: &str = "cotizador";
const TAGLINE: &str = "Comparador de seguros de auto";

/// Spinner character for a frame index
pub fn spinner_char(frame: usize) -> char {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Advance to next frame, returning the new frame index
pub fn next_frame(frame: usize) -> usize {
    (frame + 1) % SPINNER_FRAMES.len()
}

/// Centered splash with a one-line message
pub struct Splash<'a> {
    message: &'a str,
    theme: Theme,
}

impl<'a> Splash<'a> {
    pub fn new(message: &'a str, theme: Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for Splash<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 35 {
            return;
        }

        // name, tagline, blank, message
        let center_y = area.y + area.height / 2;

        let name_y = center_y.saturating_sub(2);
        let name_x = area.x + (area.width.saturating_sub(APP_NAME.len() as u16)) / 2;
        buf.set_string(
            name_x,
            name_y,
            APP_NAME,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let tag_y = name_y + 1;
        let tag_x = area.x + (area.width.saturating_sub(TAGLINE.chars().count() as u16)) / 2;
        buf.set_string(tag_x, tag_y, TAGLINE, Style::default().fg(self.theme.muted()));

        let msg_y = tag_y + 2;
        let msg_x =
            area.x + (area.width.saturating_sub(self.message.chars().count() as u16)) / 2;
        buf.set_string(
            msg_x,
            msg_y,
            self.message,
            Style::default().fg(self.theme.accent()),
        );
    }
}
