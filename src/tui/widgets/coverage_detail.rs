//! Coverage drill-down for the selected insurer and plan

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use serde_json::Value;

use crate::services::format_mxn;
use crate::services::normalizer::value_text;
use crate::tui::theme::Theme;
use crate::types::{CoverageObject, CoveragePlan, Insurer, InsurerStatus};

const POPUP_WIDTH: u16 = 60;
const POPUP_HEIGHT: u16 = 18;

pub const EMPTY_COVERAGE_MESSAGE: &str = "No hay datos disponibles para esta cobertura.";

/// Label and display value of every field shown for a coverage
pub fn detail_fields(coverage: &CoverageObject) -> Vec<(&'static str, String)> {
    let field = |key: &str| coverage.get(key);

    vec![
        (
            "Cobertura",
            field("vNombreCobertura")
                .and_then(value_text)
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Precio Total", money(field("dPrecioTotal"))),
        ("Plazo", term(field("vPlazoCobertura"))),
        ("Daños a Terceros", money(field("dDanosTerceros"))),
        ("Robo Total", included(field("iRoboTotal"))),
        ("Robo Parcial", included(field("iRoboParcial"))),
        ("Gastos Médicos", money(field("dGastosMedicos"))),
        ("Fallecimiento", death_benefit(field("dFallecimiento"))),
        ("Defensa Legal", yes_no(field("bDefensaLegal"))),
        ("Asistencia Vial", yes_no(field("bAsistencialVialCarretera"))),
        ("Daños al Vehículo", included(field("iDanoVehiculo"))),
    ]
}

/// Numeric reading of a number or numeric string
fn as_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| !n.is_nan())
}

/// Currency with two decimals ("$8,320.00"); zero or absent is "-"
fn money(value: Option<&Value>) -> String {
    match as_number(value) {
        Some(amount) if amount != 0.0 => currency(amount),
        _ => "-".to_string(),
    }
}

fn currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, format_mxn((cents / 100) as f64), cents % 100)
}

fn term(value: Option<&Value>) -> String {
    match value.and_then(value_text) {
        Some(term) if term.eq_ignore_ascii_case("ANUAL") => "1 año".to_string(),
        Some(term) => term,
        None => "-".to_string(),
    }
}

fn included(value: Option<&Value>) -> String {
    let yes = match value {
        Some(Value::Bool(b)) => *b,
        other => as_number(other).is_some_and(|n| n > 0.0),
    };
    let text = if yes { "Incluido" } else { "No incluido" };
    text.to_string()
}

/// Values under 1000 are a percentage of the insured sum
fn death_benefit(value: Option<&Value>) -> String {
    match as_number(value) {
        Some(n) if n < 1000.0 => format!("{}%", value_text(&Value::from(n)).unwrap_or_default()),
        other => money(other.map(Value::from).as_ref()),
    }
}

fn yes_no(value: Option<&Value>) -> String {
    let yes = match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    };
    let text = if yes { "Sí" } else { "No" };
    text.to_string()
}

/// Overlay with the raw coverage of one plan
pub struct CoverageDetail<'a> {
    insurer: &'a Insurer,
    plan: CoveragePlan,
    theme: Theme,
}

impl<'a> CoverageDetail<'a> {
    pub fn new(insurer: &'a Insurer, plan: CoveragePlan, theme: Theme) -> Self {
        Self {
            insurer,
            plan,
            theme,
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

    fn render_message(&self, area: Rect, buf: &mut Buffer, text: &str, style: Style) {
        Paragraph::new(Line::from(Span::styled(text.to_string(), style)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

impl Widget for CoverageDetail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(" {} · {} ", self.insurer.name, self.plan.label()))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Padding
            Constraint::Min(1),    // Fields
            Constraint::Length(1), // Hint
        ])
        .split(inner);

        match &self.insurer.status {
            InsurerStatus::Loading => self.render_message(
                chunks[1],
                buf,
                "Cotizando...",
                Style::default().fg(self.theme.muted()),
            ),
            InsurerStatus::Error { message, image_url } => {
                let mut lines = vec![Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(self.theme.error()),
                ))];
                if let Some(url) = image_url {
                    lines.push(Line::raw(""));
                    lines.push(Line::from(Span::styled(
                        url.clone(),
                        Style::default().fg(self.theme.muted()),
                    )));
                }
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(chunks[1], buf);
            }
            InsurerStatus::Quoted(quoted) => {
                let coverage = quoted.coverages_raw.get(self.plan);
                if coverage.is_empty() {
                    self.render_message(
                        chunks[1],
                        buf,
                        EMPTY_COVERAGE_MESSAGE,
                        Style::default().fg(self.theme.muted()),
                    );
                } else {
                    let lines: Vec<Line> = detail_fields(coverage)
                        .into_iter()
                        .map(|(label, value)| {
                            let value_style = match label {
                                "Precio Total" => Style::default()
                                    .fg(self.theme.best())
                                    .add_modifier(Modifier::BOLD),
                                _ => Style::default().fg(self.theme.text()),
                            };
                            Line::from(vec![
                                Span::styled(
                                    format!("  {:<20}", label),
                                    Style::default().fg(self.theme.muted()),
                                ),
                                Span::styled(value, value_style),
                            ])
                        })
                        .collect();
                    Paragraph::new(lines).render(chunks[1], buf);
                }
            }
        }

        Paragraph::new(Line::from(Span::styled(
            "Enter/Esc para cerrar",
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}
