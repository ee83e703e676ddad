//! Terminal swimlane renderer.
//!
//! Draws the chart with ratatui: one row per lane with bars coloured by
//! status category, over a window of `max_time` that ends at the latest
//! request. Below the chart sit two panes fed from the diagnostic log: the
//! exceptions raised so far (with links to their detail documents) and the
//! most recent log lines.

use std::collections::VecDeque;
use std::io::Stdout;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use swimlane_core::config::ChartConfig;
use swimlane_core::diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticLog};
use swimlane_core::entities::{Item, Snapshot, StatusCategory};
use swimlane_core::framework::ChartRenderer;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Horizontal pixels per terminal cell.
const CELL_WIDTH_PX: u32 = 8;
/// Log lines kept for the log pane.
const LOG_LINES: usize = 64;
/// Exceptions kept for the exceptions pane.
const EXCEPTION_LINES: usize = 64;
const EXCEPTIONS_HEIGHT: u16 = 6;
const LOG_HEIGHT: u16 = 8;
const BAR: &str = "█";

fn category_color(category: StatusCategory) -> Color {
    match category {
        StatusCategory::Success => Color::Green,
        StatusCategory::Redirect => Color::Cyan,
        StatusCategory::ClientError => Color::Yellow,
        StatusCategory::NotFound => Color::Magenta,
        StatusCategory::ServerError => Color::Red,
        StatusCategory::Other => Color::Blue,
        StatusCategory::Unknown => Color::DarkGray,
    }
}

fn level_color(level: DiagnosticLevel) -> Color {
    match level {
        DiagnosticLevel::Info => Color::Gray,
        DiagnosticLevel::Warn => Color::Yellow,
        DiagnosticLevel::Error => Color::Red,
    }
}

/// Switches stdout to the alternate screen and back on drop.
struct AlternateScreen;

impl AlternateScreen {
    fn enter() -> std::io::Result<Self> {
        execute!(std::io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for AlternateScreen {
    fn drop(&mut self) {
        if let Err(e) = execute!(std::io::stdout(), Show, LeaveAlternateScreen) {
            tracing::warn!(error = %e, "Failed to leave alternate screen");
        }
    }
}

/// Renders the dashboard into a ratatui terminal.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    log: VecDeque<Diagnostic>,
    exceptions: VecDeque<Diagnostic>,
    seen: u64,
    frames: u64,
    // Dropped after `terminal`.
    _screen: Option<AlternateScreen>,
}

impl TerminalRenderer<CrosstermBackend<Stdout>> {
    /// Take over stdout on the alternate screen until the renderer drops.
    pub fn stdout() -> std::io::Result<Self> {
        let screen = AlternateScreen::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
        terminal.clear()?;

        let mut renderer = Self::new(terminal);
        renderer._screen = Some(screen);
        Ok(renderer)
    }
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            log: VecDeque::with_capacity(LOG_LINES),
            exceptions: VecDeque::with_capacity(EXCEPTION_LINES),
            seen: 0,
            frames: 0,
            _screen: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn draw(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>) {
        let (log, exceptions) = (&self.log, &self.exceptions);
        let result = self.terminal.draw(|frame| {
            let [header, lanes, exception_pane, log_pane] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(EXCEPTIONS_HEIGHT),
                Constraint::Length(LOG_HEIGHT),
            ])
            .areas(frame.area());

            draw_header(frame, header, chart, snapshot);
            draw_lanes(frame, lanes, chart, snapshot);
            draw_exceptions(frame, exception_pane, exceptions);
            draw_log(frame, log_pane, log);
        })
        .map(|_| ());

        match result {
            Ok(()) => self.frames += 1,
            Err(e) => tracing::warn!(error = %e, "Failed to draw chart frame"),
        }
    }
}

impl<B: Backend> ChartRenderer for TerminalRenderer<B> {
    fn mount(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>) {
        tracing::debug!(lanes = snapshot.lanes.len(), "Mounting terminal chart");
        self.draw(chart, snapshot);
    }

    fn update(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>) {
        self.draw(chart, snapshot);
    }

    fn diagnostics(&mut self, log: &DiagnosticLog) {
        for entry in log.since(self.seen) {
            if entry.link.is_some() {
                push_bounded(&mut self.exceptions, entry.clone(), EXCEPTION_LINES);
            }
            push_bounded(&mut self.log, entry.clone(), LOG_LINES);
        }
        self.seen = log.total();
    }
}

fn push_bounded(lines: &mut VecDeque<Diagnostic>, entry: Diagnostic, capacity: usize) {
    if lines.len() == capacity {
        lines.pop_front();
    }
    lines.push_back(entry);
}

// ---------------------------------------------------------------------------
// Layout pieces
// ---------------------------------------------------------------------------

fn draw_header(frame: &mut Frame<'_>, area: Rect, chart: &ChartConfig, snapshot: Snapshot<'_>) {
    let text = match snapshot.latest_end() {
        Some(end) => format!(
            " {} lanes | {} requests | last {}s up to {} ",
            snapshot.lanes.len(),
            snapshot.items.len(),
            chart.max_time.as_secs_f64(),
            end
        ),
        None => format!(" {} lanes | no requests ", snapshot.lanes.len()),
    };
    let header = Paragraph::new(text).style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn draw_lanes(frame: &mut Frame<'_>, area: Rect, chart: &ChartConfig, snapshot: Snapshot<'_>) {
    let block = Block::default().borders(Borders::ALL).title(" Lanes ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_width = ((chart.margin.left / CELL_WIDTH_PX) as usize).min(inner.width as usize / 2);
    let available = (inner.width as usize).saturating_sub(label_width + 1);
    let columns = available
        .min((chart.plot_width() / CELL_WIDTH_PX) as usize)
        .max(1);
    let window = Duration::try_from(chart.max_time).unwrap_or(Duration::MAX);

    let lines: Vec<Line<'_>> = snapshot
        .lanes
        .iter()
        .take(inner.height as usize)
        .map(|lane| {
            let cells = match snapshot.latest_end() {
                Some(end) => lane_cells(snapshot.lane_items(lane.id), end, window, columns),
                None => vec![None; columns],
            };
            let label: String = lane.label.as_str().chars().take(label_width).collect();
            let mut spans = vec![Span::styled(
                format!("{label:>label_width$}│"),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            spans.extend(bar_spans(&cells));
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_exceptions(frame: &mut Frame<'_>, area: Rect, exceptions: &VecDeque<Diagnostic>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Exceptions ({}) ", exceptions.len()));
    let visible = block.inner(area).height as usize;
    let lines: Vec<Line<'_>> = exceptions
        .iter()
        .skip(exceptions.len().saturating_sub(visible))
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.message),
                    Style::default().fg(Color::Red),
                ),
                Span::raw(entry.link.clone().unwrap_or_default()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_log(frame: &mut Frame<'_>, area: Rect, log: &VecDeque<Diagnostic>) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    let visible = block.inner(area).height as usize;
    let lines: Vec<Line<'_>> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|entry| {
            let at = entry.at.time();
            Line::from(vec![
                Span::raw(format!(
                    "{:02}:{:02}:{:02} ",
                    at.hour(),
                    at.minute(),
                    at.second()
                )),
                Span::styled(
                    format!("{:<5} ", entry.level.to_string()),
                    Style::default().fg(level_color(entry.level)),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---------------------------------------------------------------------------
// Bar placement
// ---------------------------------------------------------------------------

/// Status category per plot column for one lane, `None` where idle.
///
/// The window covers `[end - window, end]`; items that finished before it
/// are skipped and later items paint over earlier ones.
fn lane_cells<'a>(
    items: impl Iterator<Item = &'a Item>,
    end: OffsetDateTime,
    window: Duration,
    columns: usize,
) -> Vec<Option<StatusCategory>> {
    let mut cells = vec![None; columns];
    let start = end
        .checked_sub(window)
        .unwrap_or(PrimitiveDateTime::MIN.assume_utc());

    for item in items {
        let item_end = item.end.max(item.start);
        if item_end < start {
            continue;
        }
        let from = cell(item.start - start, window, columns);
        let to = cell(item_end - start, window, columns).max(from);
        for slot in &mut cells[from..=to] {
            *slot = Some(item.status_class.category());
        }
    }
    cells
}

/// Column of an offset into the window, clamped to the plot.
fn cell(offset: Duration, window: Duration, columns: usize) -> usize {
    if offset.is_negative() || window.is_zero() {
        return 0;
    }
    let fraction = offset.as_seconds_f64() / window.as_seconds_f64();
    ((fraction * columns as f64) as usize).min(columns - 1)
}

/// One span per run of equal cells.
fn bar_spans(cells: &[Option<StatusCategory>]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = cells;
    while let Some(&first) = rest.first() {
        let run = rest.iter().take_while(|&&c| c == first).count();
        spans.push(match first {
            Some(category) => Span::styled(
                BAR.repeat(run),
                Style::default().fg(category_color(category)),
            ),
            None => Span::raw(" ".repeat(run)),
        });
        rest = &rest[run..];
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use swimlane_core::config::Margin;
    use swimlane_core::entities::{ItemInsert, RequestMeta, StatusClassTable, TimelineModel};
    use swimlane_sdk::objects::{StatusCode, TaskId};

    fn chart() -> ChartConfig {
        // 8 plot columns behind a 2 column label.
        ChartConfig::builder()
            .margin(Margin {
                top: 0,
                right: 0,
                bottom: 0,
                left: 16,
            })
            .width(16 + 64)
            .max_time(8_000)
            .build()
    }

    fn add(model: &mut TimelineModel, task: &str, status: &str, from_s: i64, to_s: i64) {
        let lane_id = model.get_or_create_lane(&TaskId::new(task));
        let base = OffsetDateTime::UNIX_EPOCH;
        model.append_item(ItemInsert {
            lane_id,
            start: base + Duration::seconds(from_s),
            end: base + Duration::seconds(to_s),
            status_class: StatusClassTable::default().classify(Some(&StatusCode::new(status))),
            label: status.to_string(),
            description: String::new(),
            meta: RequestMeta::default(),
        });
    }

    fn renderer(width: u16, height: u16) -> TerminalRenderer<TestBackend> {
        TerminalRenderer::new(Terminal::new(TestBackend::new(width, height)).unwrap())
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    fn screen(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cells_as_text(cells: &[Option<StatusCategory>]) -> String {
        cells
            .iter()
            .map(|cell| match cell {
                Some(StatusCategory::Success) => '=',
                Some(StatusCategory::ServerError) => '#',
                Some(StatusCategory::NotFound) => '?',
                Some(_) => '+',
                None => ' ',
            })
            .collect()
    }

    #[test]
    fn test_bars_are_placed_in_window() {
        let mut model = TimelineModel::new();
        add(&mut model, "t1", "200", 2, 4);
        add(&mut model, "t2", "500", 7, 10);
        let snapshot = model.snapshot();
        let end = snapshot.latest_end().unwrap();

        // Window is [2s, 10s]: one column per second.
        let t1 = lane_cells(snapshot.lane_items(0), end, Duration::seconds(8), 8);
        let t2 = lane_cells(snapshot.lane_items(1), end, Duration::seconds(8), 8);
        assert_eq!(cells_as_text(&t1), "===     ");
        assert_eq!(cells_as_text(&t2), "     ###");
    }

    #[test]
    fn test_items_before_window_are_skipped() {
        let mut model = TimelineModel::new();
        add(&mut model, "t1", "404", 0, 1);
        add(&mut model, "t1", "200", 20, 20);
        let snapshot = model.snapshot();
        let end = snapshot.latest_end().unwrap();

        let cells = lane_cells(snapshot.lane_items(0), end, Duration::seconds(8), 8);
        assert_eq!(cells_as_text(&cells), "       =");
    }

    #[test]
    fn test_bar_spans_group_runs() {
        let cells = [
            Some(StatusCategory::Success),
            Some(StatusCategory::Success),
            None,
            Some(StatusCategory::ServerError),
        ];
        let spans = bar_spans(&cells);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].content, "██");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].content, " ");
        assert_eq!(spans[2].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_frame_shows_lanes_with_coloured_bars() {
        let mut model = TimelineModel::new();
        add(&mut model, "t1", "200", 2, 4);
        add(&mut model, "t2", "500", 7, 10);

        let mut renderer = renderer(60, 24);
        renderer.mount(&chart(), model.snapshot());
        assert_eq!(renderer.frames(), 1);

        let buffer = renderer.backend().buffer();
        assert!(row(buffer, 0).contains("2 lanes | 2 requests"));
        // Row 1 is the top border of the lanes block.
        assert!(row(buffer, 2).starts_with("│t1│███     "));
        assert!(row(buffer, 3).starts_with("│t2│     ███"));
        assert_eq!(buffer[(4, 2)].fg, Color::Green);
        assert_eq!(buffer[(9, 3)].fg, Color::Red);
    }

    #[test]
    fn test_frame_shows_exception_links_and_log() {
        let mut model = TimelineModel::new();
        add(&mut model, "t1", "200", 0, 1);

        let mut log = DiagnosticLog::default();
        log.info("connection open");
        log.push_link(
            DiagnosticLevel::Warn,
            "exception ValueError",
            "file:///tmp/exceptions/0001-ValueError.html",
        );
        log.warn("malformed message dropped: invalid json");

        let mut renderer = renderer(100, 24);
        renderer.diagnostics(&log);
        renderer.update(&chart(), model.snapshot());

        let text = screen(renderer.backend().buffer());
        assert!(text.contains("Exceptions (1)"));
        assert!(text.contains("exception ValueError file:///tmp/exceptions/0001-ValueError.html"));
        assert!(text.contains("connection open"));
        assert!(text.contains("malformed message dropped"));

        // Entries are taken once; a second look adds nothing.
        renderer.diagnostics(&log);
        assert_eq!(renderer.exceptions.len(), 1);
        assert_eq!(renderer.log.len(), 3);
    }

    #[tokio::test]
    async fn test_exception_from_sink_appears_on_screen() {
        use crate::notifications::HtmlDirectorySink;
        use swimlane_core::config::{MapperConfig, SchedulerConfig};
        use swimlane_core::processors::{EventMapper, RenderScheduler, Session};

        let dir = std::env::temp_dir().join(format!("swimlane-test-{}", uuid::Uuid::new_v4()));
        let sink = HtmlDirectorySink::open(&dir).unwrap();
        let scheduler =
            RenderScheduler::new(renderer(200, 24), chart(), SchedulerConfig::default());
        let mut session = Session::new(EventMapper::new(MapperConfig::default()), scheduler, sink);

        session
            .on_message(r#"{"type":"exception","name":"ValueError","data":"<pre>boom</pre>"}"#)
            .await;
        session
            .on_message(r#"{"type":"request","task":1,"data":{"status":200,"url":"/a","duration":120,"timestamp":{"iso":"2024-01-01T00:00:00Z"}}}"#)
            .await;

        let link = session.sink().written()[0].link.clone();
        let text = screen(session.renderer().backend().buffer());
        assert!(text.contains(&link), "{link} not on screen:\n{text}");

        session.sink_mut().flush().await;
        std::fs::remove_dir_all(session.sink().dir()).unwrap();
    }
}
