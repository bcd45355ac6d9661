//! Comparison table - one row per insurer with prices for every plan

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::spinner::spinner_char;
use super::tabs::PlanTabs;
use crate::tui::theme::Theme;
use crate::types::{CoveragePlan, Insurer, PlanValues, PriceInfo, SortOrder};

/// Maximum content width (consistent with other views)
const MAX_CONTENT_WIDTH: u16 = 120;

/// Column indices
const COL_INSURER: usize = 0;
const COL_AMPLIA: usize = 1;
const COL_LIMITADA: usize = 2;
const COL_RC: usize = 3;
const COL_DEDUCTIBLE: usize = 4;
const COL_MEDICAL: usize = 5;

/// Column definitions: (label, width)
const COLUMNS: [(&str, u16); 6] = [
    ("Aseguradora", 16),    // 0: COL_INSURER (14 + 2 marker)
    ("Amplia", 14),         // 1: COL_AMPLIA
    ("Limitada", 14),       // 2: COL_LIMITADA
    ("RC", 14),             // 3: COL_RC
    ("Deducible", 12),      // 4: COL_DEDUCTIBLE
    ("Gastos Médicos", 16), // 5: COL_MEDICAL
];

/// Hide Gastos Médicos first, then Deducible
fn visible_columns(width: u16) -> Vec<usize> {
    const HIDE_ORDER: [usize; 2] = [COL_MEDICAL, COL_DEDUCTIBLE];

    let mut visible: Vec<usize> = (0..COLUMNS.len()).collect();

    for &col_idx in &HIDE_ORDER {
        let total: u16 = visible.iter().map(|&i| COLUMNS[i].1).sum();
        if total <= width {
            return visible;
        }
        visible.retain(|&i| i != col_idx);
    }

    visible
}

fn table_width_for(visible: &[usize]) -> u16 {
    visible.iter().map(|&i| COLUMNS[i].1).sum()
}

fn plan_column(plan: CoveragePlan) -> usize {
    match plan {
        CoveragePlan::Amplia => COL_AMPLIA,
        CoveragePlan::Limitada => COL_LIMITADA,
        CoveragePlan::Rc => COL_RC,
    }
}

/// Everything the comparison view shows
pub struct ComparisonData<'a> {
    pub insurers: &'a [Insurer],
    pub lowest: &'a PlanValues<Option<PriceInfo>>,
    pub summary: &'a str,
    pub status: Option<&'a str>,
}

pub struct ComparisonView<'a> {
    data: ComparisonData<'a>,
    plan: CoveragePlan,
    sort: SortOrder,
    selected: usize,
    hide_unavailable: bool,
    spinner_frame: usize,
    theme: Theme,
}

impl<'a> ComparisonView<'a> {
    pub fn new(data: ComparisonData<'a>, plan: CoveragePlan, theme: Theme) -> Self {
        Self {
            data,
            plan,
            sort: SortOrder::Default,
            selected: 0,
            hide_unavailable: false,
            spinner_frame: 0,
            theme,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_hide_unavailable(mut self, hide: bool) -> Self {
        self.hide_unavailable = hide;
        self
    }

    pub fn with_spinner_frame(mut self, frame: usize) -> Self {
        self.spinner_frame = frame;
        self
    }
}

impl Widget for ComparisonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: Top padding
            Constraint::Length(1), // 1: Plan tabs
            Constraint::Length(1), // 2: Separator
            Constraint::Length(1), // 3: Lowest price banner
            Constraint::Length(1), // 4: Vehicle / applicant
            Constraint::Length(1), // 5: Separator
            Constraint::Length(1), // 6: Header
            Constraint::Fill(1),   // 7: Insurer rows
            Constraint::Length(1), // 8: Separator
            Constraint::Length(1), // 9: Status
            Constraint::Length(1), // 10: Keybindings
        ])
        .split(centered_area);

        PlanTabs::new(self.plan, self.theme).render(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);
        self.render_banner(chunks[3], buf);

        Paragraph::new(Line::from(Span::styled(
            self.data.summary,
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        render_separator(chunks[5], buf, self.theme);

        let visible = visible_columns(centered_area.width);
        self.render_header(chunks[6], buf, &visible);
        self.render_rows(chunks[7], buf, &visible);

        render_separator(chunks[8], buf, self.theme);
        self.render_status(chunks[9], buf);
        self.render_keybindings(chunks[10], buf);
    }
}

impl ComparisonView<'_> {
    fn render_banner(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            "Mejor precio  ",
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        )];

        for &plan in CoveragePlan::all() {
            let label_style = if plan == self.plan {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };
            spans.push(Span::styled(format!("{} ", plan.label()), label_style));

            match self.data.lowest.get(plan) {
                Some(info) => {
                    spans.push(Span::styled(
                        info.price.clone(),
                        Style::default().fg(self.theme.best()),
                    ));
                    spans.push(Span::styled(
                        format!(" ({})", info.insurer),
                        Style::default().fg(self.theme.text()),
                    ));
                }
                None => spans.push(Span::styled("-", Style::default().fg(self.theme.muted()))),
            }
            spans.push(Span::raw("   "));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, visible: &[usize]) {
        let tw = table_width_for(visible);
        let offset = area.width.saturating_sub(tw) / 2;
        let selected_col = plan_column(self.plan);

        let mut spans = Vec::new();
        for &col in visible {
            let (label, width) = COLUMNS[col];
            let label = if col == selected_col {
                match self.sort {
                    SortOrder::Asc => format!("{} ↑", label),
                    SortOrder::Desc => format!("{} ↓", label),
                    SortOrder::Default => label.to_string(),
                }
            } else {
                label.to_string()
            };
            let formatted = if col == COL_INSURER {
                format!("  {:<width$}", label, width = (width as usize) - 2)
            } else {
                format!("{:>width$}", label, width = width as usize)
            };
            let mut style = Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD);
            if col == selected_col {
                style = style.fg(self.theme.accent());
            }
            spans.push(Span::styled(formatted, style));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .render(
                Rect {
                    x: area.x + offset,
                    y: area.y,
                    width: tw.min(area.width),
                    height: area.height,
                },
                buf,
            );
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer, visible: &[usize]) {
        let tw = table_width_for(visible);
        let offset = area.width.saturating_sub(tw) / 2;

        if self.data.insurers.is_empty() {
            let message = if self.hide_unavailable {
                "Ninguna aseguradora disponible (h para mostrar todas)"
            } else {
                "Sin resultados"
            };
            Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(self.theme.muted()),
            )))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let rows = area.height as usize;
        let start = self.selected.saturating_sub(rows.saturating_sub(1));

        for (i, insurer) in self.data.insurers.iter().enumerate().skip(start).take(rows) {
            let row_area = Rect {
                x: area.x + offset,
                y: area.y + (i - start) as u16,
                width: tw.min(area.width),
                height: 1,
            };
            self.render_row(row_area, buf, insurer, visible, i == self.selected);
        }
    }

    fn render_row(
        &self,
        area: Rect,
        buf: &mut Buffer,
        insurer: &Insurer,
        visible: &[usize],
        is_selected: bool,
    ) {
        let marker = if is_selected { "▸ " } else { "  " };
        let name_style = if is_selected {
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.accent())
        };
        let mut spans = vec![Span::styled(
            format!("{}{:<14}", marker, truncate_str(&insurer.name, 14)),
            name_style,
        )];

        let rest_width = area.width.saturating_sub(COLUMNS[COL_INSURER].1) as usize;

        match insurer.quoted() {
            None if insurer.is_loading() => {
                spans.push(Span::styled(
                    format!("{} Cotizando...", spinner_char(self.spinner_frame)),
                    Style::default().fg(self.theme.muted()),
                ));
            }
            None => {
                let message = insurer.error_message().unwrap_or_default();
                spans.push(Span::styled(
                    truncate_str(message, rest_width),
                    Style::default().fg(self.theme.error()),
                ));
            }
            Some(quoted) => {
                for &col in &visible[1..] {
                    let width = COLUMNS[col].1 as usize;
                    let (text, style) = match col {
                        COL_AMPLIA | COL_LIMITADA | COL_RC => {
                            let plan = match col {
                                COL_AMPLIA => CoveragePlan::Amplia,
                                COL_LIMITADA => CoveragePlan::Limitada,
                                _ => CoveragePlan::Rc,
                            };
                            (quoted.prices.get(plan).as_str(), self.price_style(insurer, plan))
                        }
                        COL_DEDUCTIBLE => (
                            quoted.deductible.as_str(),
                            Style::default().fg(self.theme.text()),
                        ),
                        _ => (
                            quoted.medical_expenses.as_str(),
                            Style::default().fg(self.theme.text()),
                        ),
                    };
                    let style = if is_selected {
                        style.add_modifier(Modifier::REVERSED)
                    } else {
                        style
                    };
                    spans.push(Span::styled(
                        format!("{:>width$}", truncate_str(text, width - 1), width = width),
                        style,
                    ));
                }
            }
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Left)
            .render(area, buf);
    }

    fn price_style(&self, insurer: &Insurer, plan: CoveragePlan) -> Style {
        if plan != self.plan {
            return Style::default().fg(self.theme.muted());
        }
        if insurer.is_highlighted {
            Style::default()
                .fg(self.theme.best())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.price())
        }
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let (text, color) = match self.data.status {
            Some(status) => (status.to_string(), self.theme.best()),
            None => {
                let filter = if self.hide_unavailable {
                    "  ·  solo disponibles"
                } else {
                    ""
                };
                (
                    format!("Orden: {}{}", self.sort.label(), filter),
                    self.theme.muted(),
                )
            }
        };
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(self.theme.accent()));
        let desc = |d: &'static str| Span::styled(d, Style::default().fg(self.theme.muted()));

        let bindings = Paragraph::new(Line::from(vec![
            key("1-3"),
            desc(": Plan"),
            Span::raw("  "),
            key("↑↓"),
            desc(": Seleccionar"),
            Span::raw("  "),
            key("Enter"),
            desc(": Detalle"),
            Span::raw("  "),
            key("s"),
            desc(": Ordenar"),
            Span::raw("  "),
            key("h"),
            desc(": Filtrar"),
            Span::raw("  "),
            key("e"),
            desc(": Excel"),
            Span::raw("  "),
            key("?"),
            desc(": Ayuda"),
        ]))
        .alignment(Alignment::Center);

        bindings.render(area, buf);
    }
}

/// Truncate a string to max chars, appending "…" if truncated
pub(super) fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars()
                .take(max_chars.saturating_sub(1))
                .collect::<String>()
        )
    }
}

pub(super) fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{normalize_results, Aggregator};
    use crate::types::RawInsurerResult;
    use serde_json::json;

    fn sample() -> Vec<Insurer> {
        let ok: RawInsurerResult = serde_json::from_value(json!({
            "insurer": "Chubb",
            "data": {"success": true, "resultado": [{"AMPLIA": {"dPrecioTotal": 8320}}]}
        }))
        .unwrap();
        let mut insurers = normalize_results(&[
            ok,
            RawInsurerResult::failure("GNP", "Código postal sin cobertura", None),
            RawInsurerResult::pending("AXA"),
        ]);
        Aggregator::highlight_lowest(&mut insurers, CoveragePlan::Amplia);
        insurers
    }

    fn render_to_string(view: ComparisonView, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_visible_columns_full_width() {
        assert_eq!(visible_columns(120), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_visible_columns_narrow() {
        // 16 + 14 * 3 + 12 = 70
        assert_eq!(visible_columns(70), vec![0, 1, 2, 3, 4]);
        assert_eq!(visible_columns(60), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Mapfre", 10), "Mapfre");
        assert_eq!(truncate_str("Aseguradora larga", 6), "Asegu…");
    }

    #[test]
    fn test_renders_rows_for_every_state() {
        let insurers = sample();
        let lowest = Aggregator::lowest_prices(&insurers);
        let data = ComparisonData {
            insurers: &insurers,
            lowest: &lowest,
            summary: "Honda - 2017 - CRV - Elegance",
            status: None,
        };
        let content = render_to_string(
            ComparisonView::new(data, CoveragePlan::Amplia, Theme::Dark),
            120,
            20,
        );

        assert!(content.contains("$8320"));
        assert!(content.contains("Código postal sin cobertura"));
        assert!(content.contains("Cotizando..."));
        assert!(content.contains("$8,320 (Chubb)"));
        assert!(content.contains("Orden: Sin orden"));
    }

    #[test]
    fn test_status_message_replaces_sort_label() {
        let insurers = sample();
        let lowest = Aggregator::lowest_prices(&insurers);
        let data = ComparisonData {
            insurers: &insurers,
            lowest: &lowest,
            summary: "",
            status: Some("Archivo generado"),
        };
        let content = render_to_string(
            ComparisonView::new(data, CoveragePlan::Amplia, Theme::Dark),
            120,
            20,
        );
        assert!(content.contains("Archivo generado"));
        assert!(!content.contains("Orden:"));
    }

    #[test]
    fn test_empty_filtered_view_message() {
        let lowest = PlanValues::default();
        let data = ComparisonData {
            insurers: &[],
            lowest: &lowest,
            summary: "",
            status: None,
        };
        let content = render_to_string(
            ComparisonView::new(data, CoveragePlan::Rc, Theme::Light).with_hide_unavailable(true),
            120,
            20,
        );
        assert!(content.contains("Ninguna aseguradora disponible"));
    }
}
