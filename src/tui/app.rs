//! Application state and event loop

use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget, DefaultTerminal, Frame};

use crate::config::AppConfig;
use crate::insurers::InsurerId;
use crate::services::{
    export_comparison, normalize_results, table_view, Aggregator, QuoteDispatcher, QuoteEvent,
    QuoteStore, StoredQuote,
};
use crate::types::{
    CoveragePlan, Insurer, QuoteRequestBody, RawInsurerResult, SortOrder, UserData, VehicleData,
    EXPORT_FAILED_MESSAGE,
};

use super::theme::Theme;
use super::widgets::{
    comparison::{ComparisonData, ComparisonView},
    coverage_detail::CoverageDetail,
    help::HelpPopup,
    popup::MessagePopup,
    spinner::{next_frame, Splash},
};

/// How the TUI gets its results
pub enum Launch {
    /// Show a previously saved quote
    Stored(StoredQuote),
    /// Quote now, filling rows in as insurers answer
    Live {
        dispatcher: QuoteDispatcher,
        request: QuoteRequestBody,
        vehicle: VehicleData,
        user: UserData,
        insurers: Vec<InsurerId>,
    },
    /// Nothing to show yet
    Empty,
}

/// Modal message over the table
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

/// Main application
pub struct App {
    theme: Theme,
    vehicle: VehicleData,
    user: UserData,
    results: Vec<RawInsurerResult>,
    plan: CoveragePlan,
    sort: SortOrder,
    selected: usize,
    show_detail: bool,
    show_help: bool,
    hide_unavailable: bool,
    spinner_frame: usize,
    quoting: bool,
    status: Option<String>,
    popup: Option<Popup>,
    should_quit: bool,
    export_dir: PathBuf,
}

impl App {
    pub fn new(
        vehicle: VehicleData,
        user: UserData,
        results: Vec<RawInsurerResult>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            theme: Theme::default(),
            vehicle,
            user,
            results,
            plan: CoveragePlan::default(),
            sort: SortOrder::default(),
            selected: 0,
            show_detail: false,
            show_help: false,
            hide_unavailable: false,
            spinner_frame: 0,
            quoting: false,
            status: None,
            popup: None,
            should_quit: false,
            export_dir,
        }
    }

    /// App with one loading row per insurer
    pub fn pending(
        vehicle: VehicleData,
        user: UserData,
        insurers: &[InsurerId],
        export_dir: PathBuf,
    ) -> Self {
        let results = insurers
            .iter()
            .map(|id| RawInsurerResult::pending(id.name()))
            .collect();
        let mut app = Self::new(vehicle, user, results, export_dir);
        app.quoting = true;
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Rows as displayed: normalized, highlighted, sorted and filtered
    pub fn view(&self) -> Vec<Insurer> {
        let mut insurers = normalize_results(&self.results);
        Aggregator::highlight_lowest(&mut insurers, self.plan);
        table_view(&insurers, self.plan, self.sort, self.hide_unavailable)
    }

    /// Snapshot for the last-quote store
    pub fn stored(&self) -> StoredQuote {
        StoredQuote::new(self.vehicle.clone(), self.user.clone(), self.results.clone())
    }

    /// Apply a dispatcher event. Returns true once every insurer reported.
    pub fn apply_quote_event(&mut self, event: QuoteEvent) -> bool {
        match event {
            QuoteEvent::Completed(result) => {
                match self
                    .results
                    .iter_mut()
                    .find(|r| r.insurer == result.insurer)
                {
                    Some(slot) => *slot = result,
                    None => self.results.push(result),
                }
                self.clamp_selection();
                false
            }
            QuoteEvent::Finished => {
                self.quoting = false;
                true
            }
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Any key dismisses a popup
        if self.popup.take().is_some() {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        if self.show_detail {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.show_detail = false,
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='3') => {
                if let Some(plan) = CoveragePlan::from_number(c as u8 - b'0') {
                    self.plan = plan;
                }
            }
            KeyCode::Right | KeyCode::Tab => self.plan = self.plan.next(),
            KeyCode::Left | KeyCode::BackTab => self.plan = self.plan.prev(),
            KeyCode::Char('s') => self.sort = self.sort.next(),
            KeyCode::Char('h') => {
                self.hide_unavailable = !self.hide_unavailable;
                self.clamp_selection();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.view().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Enter => {
                if !self.view().is_empty() {
                    self.show_detail = true;
                }
            }
            KeyCode::Char('e') => self.export(Local::now().date_naive()),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    /// Write the comparison spreadsheet, reporting the outcome on screen
    fn export(&mut self, date: NaiveDate) {
        let insurers = normalize_results(&self.results);
        if !insurers.iter().any(Insurer::is_available) {
            self.popup = Some(Popup {
                title: "Exportar".to_string(),
                message: "No hay cotizaciones para exportar".to_string(),
                is_error: true,
            });
            return;
        }

        match export_comparison(&insurers, &self.vehicle, &self.user, &self.export_dir, date) {
            Ok(path) => {
                self.status = Some(format!("Archivo generado: {}", path.display()));
            }
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.popup = Some(Popup {
                    title: "Error".to_string(),
                    message: EXPORT_FAILED_MESSAGE.to_string(),
                    is_error: true,
                });
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.view().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Update spinner animation
    pub fn tick(&mut self) {
        if self.quoting {
            self.spinner_frame = next_frame(self.spinner_frame);
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.results.is_empty() {
            Splash::new(
                "Sin cotización guardada. Usa: cotizador tui --marca ... --cp ...",
                self.theme,
            )
            .render(area, buf);
            return;
        }

        let all = normalize_results(&self.results);
        let lowest = Aggregator::lowest_prices(&all);
        let view = self.view();
        let summary = format!("{}  ·  {}", self.vehicle.summary(), self.user.summary());

        let data = ComparisonData {
            insurers: &view,
            lowest: &lowest,
            summary: &summary,
            status: self.status.as_deref(),
        };
        ComparisonView::new(data, self.plan, self.theme)
            .with_sort(self.sort)
            .with_selected(self.selected)
            .with_hide_unavailable(self.hide_unavailable)
            .with_spinner_frame(self.spinner_frame)
            .render(area, buf);

        if self.show_detail {
            if let Some(insurer) = view.get(self.selected) {
                CoverageDetail::new(insurer, self.plan, self.theme)
                    .render(CoverageDetail::centered_area(area), buf);
            }
        }

        if self.show_help {
            HelpPopup::new(self.theme).render(HelpPopup::centered_area(area), buf);
        }

        if let Some(popup) = &self.popup {
            let color = if popup.is_error {
                self.theme.error()
            } else {
                self.theme.best()
            };
            MessagePopup::new(&popup.title, &popup.message, color)
                .render(MessagePopup::centered_area(area), buf);
        }
    }
}

/// Run the TUI application
pub fn run(config: &AppConfig, launch: Launch) -> anyhow::Result<()> {
    // Detect before raw mode
    let theme = Theme::detect();
    let export_dir = config.export_dir();

    let (app, receiver) = match launch {
        Launch::Stored(stored) => (
            App::new(stored.vehicle, stored.user, stored.results, export_dir),
            None,
        ),
        Launch::Live {
            dispatcher,
            request,
            vehicle,
            user,
            insurers,
        } => {
            let app = App::pending(vehicle, user, &insurers, export_dir);
            (app, Some(dispatcher.spawn(request, insurers)))
        }
        Launch::Empty => (
            App::new(
                VehicleData::default(),
                UserData::default(),
                Vec::new(),
                export_dir,
            ),
            None,
        ),
    };
    let mut app = app.with_theme(theme);

    let store = match QuoteStore::new() {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "last quote will not be saved");
            None
        }
    };

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app, receiver, store.as_ref());
    ratatui::restore();
    result
}

fn run_app(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    mut receiver: Option<mpsc::Receiver<QuoteEvent>>,
    store: Option<&QuoteStore>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Drain dispatcher events (non-blocking)
        if let Some(rx) = &receiver {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        if app.apply_quote_event(event) {
                            save_quote(app, store);
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        receiver = None;
                        break;
                    }
                }
            }
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        } else {
            app.tick();
        }
    }

    Ok(())
}

fn save_quote(app: &App, store: Option<&QuoteStore>) {
    let Some(store) = store else {
        return;
    };
    if let Err(e) = store.save(&app.stored()) {
        tracing::warn!(error = %e, "could not save last quote");
    }
}
