//! Coverage plan selector bar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;
use crate::types::CoveragePlan;

/// Plan selector showing "1 Amplia  2 Limitada  3 RC"
pub struct PlanTabs {
    selected: CoveragePlan,
    theme: Theme,
}

impl PlanTabs {
    pub fn new(selected: CoveragePlan, theme: Theme) -> Self {
        Self { selected, theme }
    }

    fn display(plan: CoveragePlan, index: usize, selected: bool) -> String {
        if selected {
            format!("[{} {}]", index + 1, plan.label())
        } else {
            format!("{} {}", index + 1, plan.label())
        }
    }
}

impl Widget for PlanTabs {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let labels: Vec<String> = CoveragePlan::all()
            .iter()
            .enumerate()
            .map(|(i, plan)| Self::display(*plan, i, *plan == self.selected))
            .collect();

        let total_width: u16 = labels
            .iter()
            .map(|l| l.chars().count() as u16 + 2)
            .sum::<u16>()
            .saturating_sub(2);

        let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;

        for (plan, display) in CoveragePlan::all().iter().zip(&labels) {
            let display_len = display.chars().count() as u16;
            if x + display_len > area.x + area.width {
                break;
            }

            let style = if *plan == self.selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };

            buf.set_string(x, area.y, display, style);
            x += display_len + 2;
        }
    }
}
