//! Ratatui-based terminal dashboard.
//!
//! One screen: a header with fit diagnostics, the historical chart, the
//! forecast overlay, the parameter panel, the forecast table and a status
//! footer. Every parameter change reruns fit + forecast on the UI thread.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Terminal,
};
use tracing::info;

use crate::app::pipeline::{run_pass, ForecastRun, Session};
use crate::cli::RunArgs;
use crate::domain::{calendar, Controls, ParamField, PriceSeries};
use crate::error::AppError;
use crate::model::CssBackend;
use crate::report::SUCCESS_MESSAGE;

mod plotters_chart;

use plotters_chart::{PriceChart, FORECAST_COLOR, HISTORY_COLOR};

/// Start the dashboard.
///
/// The series is loaded before the terminal is taken over, so a bad source
/// exits with its error code and a readable message.
pub fn run(args: &RunArgs) -> Result<(), AppError> {
    let mut session = Session::new(args.data.source());
    session.series()?;

    let mut app = App::new(session, CssBackend::new(args.fit_settings()), args.controls());
    app.refit()?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Info(String),
    Success(String),
    Error(String),
}

impl Status {
    fn style(&self) -> Style {
        match self {
            Status::Info(_) => Style::default().fg(Color::Yellow),
            Status::Success(_) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Status::Error(_) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    fn text(&self) -> &str {
        match self {
            Status::Info(s) | Status::Success(s) | Status::Error(s) => s,
        }
    }
}

struct App {
    session: Session,
    backend: CssBackend,
    controls: Controls,
    selected_field: usize,
    series: Option<Arc<PriceSeries>>,
    run: Option<ForecastRun>,
    status: Status,
}

impl App {
    fn new(session: Session, backend: CssBackend, controls: Controls) -> Self {
        Self {
            session,
            backend,
            controls,
            selected_field: 0,
            series: None,
            run: None,
            status: Status::Info("Loading data...".to_string()),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `Ok(true)` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < ParamField::ALL.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1)?,
            KeyCode::Right => self.adjust_field(1)?,
            KeyCode::Char('L') | KeyCode::Char('l') => {
                self.session.clear_cache();
                info!(source = %self.session.source(), "reload requested");
                self.refit()?;
            }
            _ => {}
        }
        Ok(false)
    }

    fn selected(&self) -> ParamField {
        ParamField::ALL[self.selected_field]
    }

    fn adjust_field(&mut self, delta: i64) -> Result<(), AppError> {
        let field = self.selected();
        if self.controls.adjust(field, delta) {
            self.refit()?;
        } else {
            let (lo, hi) = field.bounds();
            self.status = Status::Info(format!("{} stays within [{lo}, {hi}]", field.label()));
        }
        Ok(())
    }

    /// Run a full pass with the current controls.
    ///
    /// Fit and forecast errors land in the status line; a source error ends
    /// the session.
    fn refit(&mut self) -> Result<(), AppError> {
        let out = run_pass(
            &mut self.session,
            &self.backend,
            &self.controls.config,
            self.controls.horizon,
        )?;
        self.series = Some(out.series);
        match out.run {
            Ok(run) => {
                self.run = Some(run);
                self.status = Status::Success(SUCCESS_MESSAGE.to_string());
            }
            Err(err) => {
                self.run = None;
                self.status = Status::Error(err.to_string());
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let gray = Style::default().fg(Color::Gray);
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sarima", Style::default().fg(Color::Cyan)),
            Span::raw(" | Stock Price Forecasting with SARIMA"),
        ]));

        if let Some(series) = &self.series {
            lines.push(Line::from(Span::styled(
                format!(
                    "data: {} | n={} | {} .. {} | last close={:.2}",
                    self.session.source(),
                    series.len(),
                    series.first_date(),
                    series.last_date(),
                    series.last_close(),
                ),
                gray,
            )));
        }

        let model = self.controls.config.display();
        let diag = self
            .run
            .as_ref()
            .and_then(|r| r.diagnostics.as_ref())
            .map(|d| {
                format!(
                    " | sigma2={:.4} | aic={:.2} | iterations={}",
                    d.sigma2, d.aic, d.iterations
                )
            })
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("model: {model} | horizon: {}{diag}", self.controls.horizon),
            gray,
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(40)])
            .split(area);
        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cols[0]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(ParamField::ALL.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(cols[1]);

        self.draw_history_chart(frame, charts[0]);
        self.draw_overlay_chart(frame, charts[1]);
        self.draw_settings(frame, side[0]);
        self.draw_table(frame, side[1]);
    }

    fn draw_history_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Historical Stock Prices").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = &self.series else {
            frame.render_widget(waiting("Waiting for data..."), inner);
            return;
        };

        let history = history_points(series);
        let (x_bounds, y_bounds) = chart_bounds(&[&history]);
        self.render_chart(frame, inner, series, &history, &[], x_bounds, y_bounds);
    }

    fn draw_overlay_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let legend = Line::from(vec![
            Span::styled(" ── Historical Prices ", Style::default().fg(HISTORY_COLOR)),
            Span::styled(" ── Forecast ", Style::default().fg(FORECAST_COLOR)),
        ]);
        let block = Block::default()
            .title("Stock Price Forecast")
            .title_bottom(legend)
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = &self.series else {
            frame.render_widget(waiting("Waiting for data..."), inner);
            return;
        };
        let Some(run) = &self.run else {
            let msg = Paragraph::new(format!("No forecast: {}", self.status.text()))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(msg, inner);
            return;
        };

        let history = history_points(series);
        let forecast = forecast_points(series, run);
        let (x_bounds, y_bounds) = chart_bounds(&[&history, &forecast]);
        self.render_chart(frame, inner, series, &history, &forecast, x_bounds, y_bounds);
    }

    #[allow(clippy::too_many_arguments)]
    fn render_chart(
        &self,
        frame: &mut ratatui::Frame<'_>,
        inner: Rect,
        series: &PriceSeries,
        history: &[(f64, f64)],
        forecast: &[(f64, f64)],
        x_bounds: [f64; 2],
        y_bounds: [f64; 2],
    ) {
        let (chart_rect, insets) = chart_layout(inner);
        let widget = PriceChart {
            history,
            forecast,
            x_bounds,
            y_bounds,
            y_label: "Close Price",
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            let fmt_x = |x: f64| {
                date_at(series, x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &fmt_x);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = ParamField::ALL
            .iter()
            .map(|&field| {
                let (lo, hi) = field.bounds();
                ListItem::new(format!(
                    "{:<18} {:>3}  [{lo}-{hi}]",
                    field.label(),
                    self.controls.value(field)
                ))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("SARIMA Parameters").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecasted Values").borders(Borders::ALL);
        let Some(run) = &self.run else {
            frame.render_widget(waiting("No forecast").block(block), area);
            return;
        };

        let header = Row::new(vec![Cell::from("Date"), Cell::from("Predicted Price")])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = run.forecast.points.iter().map(|p| {
            Row::new(vec![
                Cell::from(p.date.to_string()),
                Cell::from(format!("{:>14.4}", p.price)),
            ])
        });
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Length(16)])
            .header(header)
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  L reload data  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.status.text(), self.status.style()),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn waiting(msg: &str) -> Paragraph<'_> {
    Paragraph::new(msg).style(Style::default().fg(Color::Yellow))
}

/// `(business-day index, close)` for every historical observation.
fn history_points(series: &PriceSeries) -> Vec<(f64, f64)> {
    series
        .closes()
        .iter()
        .enumerate()
        .map(|(i, &c)| (i as f64, c))
        .collect()
}

/// Forecast points on the history's index, led by the last close.
fn forecast_points(series: &PriceSeries, run: &ForecastRun) -> Vec<(f64, f64)> {
    let n = series.len();
    let mut out = Vec::with_capacity(run.forecast.len() + 1);
    out.push(((n - 1) as f64, series.last_close()));
    for (k, p) in run.forecast.points.iter().enumerate() {
        out.push(((n + k) as f64, p.price));
    }
    out
}

fn chart_bounds(series: &[&[(f64, f64)]]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in series.iter().flat_map(|s| s.iter()) {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        x_min = 0.0;
        x_max = x_max.max(0.0) + 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

/// Calendar date for a business-day index on the chart axis.
///
/// Indices past the history continue on the business-day calendar.
fn date_at(series: &PriceSeries, x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x < 0.0 {
        return None;
    }
    let idx = x.round() as usize;
    let n = series.len();
    if idx < n {
        series.dates().get(idx).copied()
    } else {
        calendar::business_days_after(series.last_date(), idx + 1 - n).last().copied()
    }
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 6,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    fmt_x: &dyn Fn(f64) -> String,
) {
    let style = Style::default().fg(Color::Gray);
    // Date labels are wide; fewer ticks on narrow charts.
    let x_ticks = if chart.width >= 70 { 5usize } else { 3 };

    for i in 0..x_ticks {
        let u = i as f64 / (x_ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_x(x_val);
        let label_len = label.chars().count() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let y_ticks = 5usize;
    for i in 0..y_ticks {
        let u = i as f64 / (y_ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("Close")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataSource, SampleSpec};
    use crate::domain::ModelConfig;
    use crate::model::FitSettings;

    fn app(days: usize) -> App {
        let session = Session::new(DataSource::Demo(SampleSpec {
            days,
            ..SampleSpec::default()
        }));
        let backend = CssBackend::new(FitSettings {
            max_iter: 200,
            ..FitSettings::default()
        });
        let controls = Controls {
            config: ModelConfig {
                p: 1,
                d: 1,
                q: 0,
                seasonal_p: 0,
                seasonal_d: 0,
                seasonal_q: 0,
                period: 5,
            },
            horizon: 5,
        };
        let mut app = App::new(session, backend, controls);
        app.refit().unwrap();
        app
    }

    #[test]
    fn initial_pass_reports_success() {
        let app = app(120);
        assert_eq!(app.status, Status::Success(SUCCESS_MESSAGE.to_string()));
        assert_eq!(app.run.as_ref().map(|r| r.forecast.len()), Some(5));
    }

    #[test]
    fn adjusting_a_field_refits() {
        let mut app = app(120);
        // Move to the horizon control and extend it.
        for _ in 0..ParamField::ALL.len() {
            app.handle_key(KeyCode::Down).unwrap();
        }
        assert_eq!(app.selected(), ParamField::Horizon);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.controls.horizon, 6);
        assert_eq!(app.run.as_ref().map(|r| r.forecast.len()), Some(6));
        assert_eq!(app.session.load_count(), 1);
    }

    #[test]
    fn clamped_adjustment_does_not_refit() {
        let mut app = app(120);
        // p starts at 1; its lower bound is 0.
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.controls.config.p, 0);
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.controls.config.p, 0);
        assert!(matches!(app.status, Status::Info(_)));
    }

    #[test]
    fn fit_failure_keeps_history_and_shows_error() {
        let mut app = app(12);
        app.controls.config = ModelConfig::default();
        app.refit().unwrap();
        assert!(app.series.is_some());
        assert!(app.run.is_none());
        assert!(matches!(app.status, Status::Error(ref m) if m.contains("diverged")));
    }

    #[test]
    fn reload_clears_the_cached_series() {
        let mut app = app(60);
        app.handle_key(KeyCode::Char('L')).unwrap();
        assert_eq!(app.session.load_count(), 2);
    }

    #[test]
    fn quit_keys() {
        let mut app = app(60);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
        assert!(!app.handle_key(KeyCode::Char('x')).unwrap());
    }

    #[test]
    fn axis_dates_continue_past_history() {
        let series =
            PriceSeries::ending_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), vec![1.0; 5]).unwrap();
        assert_eq!(date_at(&series, 0.0), NaiveDate::from_ymd_opt(2024, 3, 11));
        assert_eq!(date_at(&series, 4.0), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(date_at(&series, 5.0), NaiveDate::from_ymd_opt(2024, 3, 18));
        assert_eq!(date_at(&series, -1.0), None);
    }

    #[test]
    fn bounds_pad_flat_series() {
        let pts = [(0.0, 150.0), (1.0, 150.0)];
        let (x, y) = chart_bounds(&[&pts]);
        assert_eq!(x, [0.0, 1.0]);
        assert!(y[0] < 150.0 && y[1] > 150.0);
    }
}
