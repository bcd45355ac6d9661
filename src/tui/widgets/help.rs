//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 18;

const NAVIGATION_KEYS: [(&str, &str); 5] = [
    ("1/2/3 o ←/→", "Cambiar plan"),
    ("↑/↓ o j/k", "Seleccionar aseguradora"),
    ("Enter", "Detalle de cobertura"),
    ("s", "Ordenar por precio"),
    ("h", "Ocultar no disponibles"),
];

const GENERAL_KEYS: [(&str, &str); 3] = [
    ("e", "Exportar a Excel"),
    ("q / Esc", "Salir"),
    ("?", "Mostrar/ocultar ayuda"),
];

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
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

    fn render_section(
        &self,
        chunks: &[Rect],
        buf: &mut Buffer,
        title: &str,
        keys: &[(&str, &str)],
    ) {
        let header = Line::from(vec![Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        )]);
        Paragraph::new(header)
            .alignment(Alignment::Left)
            .render(chunks[0], buf);

        let sep = "─".repeat(chunks[1].width as usize);
        buf.set_string(
            chunks[1].x,
            chunks[1].y,
            &sep,
            Style::default().fg(self.theme.muted()),
        );

        for (area, (key, desc)) in chunks[2..].iter().zip(keys) {
            render_keybinding(*area, buf, key, desc, self.theme);
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear the area first (for overlay effect)
        Clear.render(area, buf);

        let title = format!(" cotizador v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // [0] Padding
            Constraint::Length(1), // [1] Navigation header
            Constraint::Length(1), // [2] Separator
            Constraint::Length(1), // [3] plan
            Constraint::Length(1), // [4] selection
            Constraint::Length(1), // [5] Enter
            Constraint::Length(1), // [6] s
            Constraint::Length(1), // [7] h
            Constraint::Length(1), // [8] Padding
            Constraint::Length(1), // [9] General header
            Constraint::Length(1), // [10] Separator
            Constraint::Length(1), // [11] e
            Constraint::Length(1), // [12] q/Esc
            Constraint::Length(1), // [13] ?
            Constraint::Length(1), // [14] Padding
            Constraint::Length(1), // [15] Close hint
            Constraint::Min(0),    // Remaining
        ])
        .split(inner);

        self.render_section(&chunks[1..8], buf, "Navegación", &NAVIGATION_KEYS);
        self.render_section(&chunks[9..14], buf, "General", &GENERAL_KEYS);

        let hint = Line::from(vec![Span::styled(
            "Presiona ? para cerrar",
            Style::default().fg(self.theme.muted()),
        )]);
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[15], buf);
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<14}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
