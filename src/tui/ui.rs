//! Full dashboard layout composition with responsive breakpoints.
//!
//! Composes the panels based on terminal width:
//! - >= 120 cols: full three-panel layout (overview | editor+results | pricing)
//! - 80-119 cols: two-panel layout (editor+results | pricing, overview hidden)
//! - < 80 cols: minimal mode (editor + results only, no chrome)
//!
//! Panel focus: Tab cycles, Ctrl+1/2/3 for direct panel selection.
//! Ctrl+Enter executes the current query from the editor.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use super::app::{AppState, FocusPanel, PipelineState, QueryState};
use super::gradient::gradient_text;
use crate::pricing::Histogram;
use crate::storage::Table;

/// Rows shown in the overview preview.
const PREVIEW_ROWS: usize = 5;

/// Shown at the bottom of the overview panel.
const CAPABILITIES: &[&str] = &[
    "CSV ingest with type inference",
    "Derived Profit and Margin % columns",
    "Margin distribution histogram",
    "Ad-hoc SQL over the table 'data'",
];

/// First rows of the dataset, one pipe-joined line per row plus the
/// header line.
fn preview_lines(table: &Table) -> Vec<String> {
    let (header, rows) = table.preview(PREVIEW_ROWS);
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(" | "));
    lines.extend(rows.into_iter().map(|row| row.join(" | ")));
    lines
}

/// Layout mode determined by terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// >= 120 columns: overview (left) | editor+results (center) | pricing (right)
    Full,
    /// 80-119 columns: editor+results (left) | pricing (right), no overview
    TwoPanel,
    /// < 80 columns: minimal (editor + results stacked, no chrome)
    Minimal,
}

/// Determine the layout mode based on terminal width.
pub fn layout_mode(width: u16) -> LayoutMode {
    if width >= 120 {
        LayoutMode::Full
    } else if width >= 80 {
        LayoutMode::TwoPanel
    } else {
        LayoutMode::Minimal
    }
}

/// Content split for the full (3-panel) layout.
/// Returns (overview_pct, main_pct, pricing_pct).
pub fn full_layout_percentages() -> (u16, u16, u16) {
    (26, 42, 32)
}

/// Content split for the two-panel layout.
/// Returns (main_pct, pricing_pct).
pub fn two_panel_percentages() -> (u16, u16) {
    (62, 38)
}

/// Editor/results vertical split within the main panel.
/// Returns (editor_pct, results_pct).
pub fn editor_results_split() -> (u16, u16) {
    (30, 70)
}

/// Render the entire UI frame, dispatching to the appropriate layout mode.
pub fn render_ui(f: &mut Frame, app: &AppState) {
    let size = f.area();

    match layout_mode(size.width) {
        LayoutMode::Full => render_full_layout(f, size, app),
        LayoutMode::TwoPanel => render_two_panel_layout(f, size, app),
        LayoutMode::Minimal => render_minimal_layout(f, size, app),
    }
}

/// Full three-panel layout: title | overview | editor+results | pricing | status
fn render_full_layout(f: &mut Frame, size: Rect, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title bar
            Constraint::Min(5),    // content area
            Constraint::Length(3), // status bar
        ])
        .split(size);

    render_title_bar(f, main_chunks[0], app);

    let (ov_pct, main_pct, pr_pct) = full_layout_percentages();
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(ov_pct),
            Constraint::Percentage(main_pct),
            Constraint::Percentage(pr_pct),
        ])
        .split(main_chunks[1]);

    render_overview_panel(f, h_chunks[0], app);

    let (ed_pct, res_pct) = editor_results_split();
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(ed_pct),
            Constraint::Percentage(res_pct),
        ])
        .split(h_chunks[1]);

    render_editor_panel(f, v_chunks[0], app);
    render_results_panel(f, v_chunks[1], app);

    render_pricing_panel(f, h_chunks[2], app);

    render_status_bar(f, main_chunks[2], app);
}

/// Two-panel layout (no overview): title | editor+results | pricing | status
fn render_two_panel_layout(f: &mut Frame, size: Rect, app: &AppState) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(size);

    render_title_bar(f, main_chunks[0], app);

    let (main_pct, pr_pct) = two_panel_percentages();
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(main_pct),
            Constraint::Percentage(pr_pct),
        ])
        .split(main_chunks[1]);

    let (ed_pct, res_pct) = editor_results_split();
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(ed_pct),
            Constraint::Percentage(res_pct),
        ])
        .split(h_chunks[0]);

    render_editor_panel(f, v_chunks[0], app);
    render_results_panel(f, v_chunks[1], app);

    render_pricing_panel(f, h_chunks[1], app);

    render_status_bar(f, main_chunks[2], app);
}

/// Minimal mode (no chrome, no pricing panels): just editor + results
fn render_minimal_layout(f: &mut Frame, size: Rect, app: &AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // compact editor
            Constraint::Min(3),    // results fill
        ])
        .split(size);

    render_editor_panel(f, v_chunks[0], app);
    render_results_panel(f, v_chunks[1], app);
}

// ---- Panel rendering helpers ----

/// Render the gradient-colored title bar.
fn render_title_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let title_text = " margin-lens  Logistics Pricing Dashboard ";
    let spans: Vec<Span> = gradient_text(title_text, &app.theme.title_gradient)
        .into_iter()
        .map(|(ch, color)| {
            Span::styled(
                ch.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.focus_border_style);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn panel_block(title: &str, focused: bool, app: &AppState) -> Block<'static> {
    let border_style = if focused {
        app.theme.focus_border_style
    } else {
        app.theme.border_style
    };
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Render the dataset overview panel: source, shape, first-rows
/// preview, missing values, the three summary facts, and the
/// capability footer.
fn render_overview_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus == FocusPanel::Overview;
    let block = panel_block("Dataset", focused, app);

    let muted = Style::default().fg(app.theme.muted);
    let text = Style::default().fg(app.theme.text);
    let accent = Style::default().fg(app.theme.accent);

    let mut lines: Vec<Line> = Vec::new();
    match &app.pipeline {
        PipelineState::Idle => {
            lines.push(Line::from(Span::styled(
                "  No data source selected.",
                muted,
            )));
            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled(
                "  Ctrl+S loads the sample dataset,",
                muted,
            )));
            lines.push(Line::from(Span::styled(
                "  or pass a CSV file on the command line.",
                muted,
            )));
        }
        PipelineState::Failed(msg) => {
            lines.push(Line::from(Span::styled(
                format!("  Load failed: {}", msg),
                Style::default().fg(app.theme.error),
            )));
        }
        PipelineState::Loaded(data) => {
            lines.push(Line::from(vec![
                Span::styled("  Source: ", muted),
                Span::styled(app.source.describe(), text),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  Shape: ", muted),
                Span::styled(
                    format!(
                        "{} rows x {} columns",
                        data.profile.row_count, data.profile.column_count
                    ),
                    text,
                ),
            ]));
            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled("  Preview", accent)));
            for row in preview_lines(&data.table) {
                lines.push(Line::from(Span::styled(format!("    {}", row), text)));
            }

            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled("  Missing values", accent)));
            if data.profile.missing.iter().all(|(_, n)| *n == 0) {
                lines.push(Line::from(Span::styled("    (none)", muted)));
            } else {
                for (name, count) in data.profile.missing.iter().filter(|(_, n)| *n > 0) {
                    lines.push(Line::from(Span::styled(
                        format!("    {}: {}", name, count),
                        text,
                    )));
                }
            }

            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled("  Summary", accent)));
            match &data.summary {
                Some(summary) => {
                    for fact in summary.render_text().lines() {
                        lines.push(Line::from(Span::styled(format!("    {}", fact), text)));
                    }
                }
                None => {
                    lines.push(Line::from(Span::styled(
                        "    (requires pricing columns)",
                        muted,
                    )));
                }
            }

            lines.push(Line::from(Span::raw("")));
            lines.push(Line::from(Span::styled("  Capabilities", accent)));
            for cap in CAPABILITIES {
                lines.push(Line::from(Span::styled(format!("    - {}", cap), muted)));
            }
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the query editor panel with syntax highlighting and cursor.
fn render_editor_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus == FocusPanel::Editor;
    let block = panel_block("Query (Ctrl+Enter to run)", focused, app);

    if app.editor_state.is_empty() && !focused {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "SELECT ... FROM data",
            Style::default().fg(app.theme.muted),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let lines = if focused {
        app.editor_state.render_lines_with_cursor()
    } else {
        app.editor_state.render_lines()
    };
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the query results panel.
fn render_results_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus == FocusPanel::Results;
    let block = panel_block("Results", focused, app);

    let muted = Style::default().fg(app.theme.muted);
    let content = match &app.query_state {
        QueryState::Idle => vec![Line::from(Span::styled(
            "  Run a query to see results here.",
            muted,
        ))],
        QueryState::Error(msg) => vec![Line::from(Span::styled(
            format!("  Error: {}", msg),
            Style::default().fg(app.theme.error),
        ))],
        QueryState::Complete => match &app.last_result {
            None => vec![Line::from(Span::styled("  (no results)", muted))],
            Some(result) => {
                let mut lines = Vec::new();
                let header = result.columns.join(" | ");
                lines.push(Line::from(Span::styled(
                    format!("  {}", header),
                    Style::default()
                        .fg(app.theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format!("  {}", "-".repeat(header.len())),
                    muted,
                )));
                let visible = area.height.saturating_sub(4) as usize;
                for row in result.rows.iter().skip(app.results_offset).take(visible) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", row.join(" | ")),
                        Style::default().fg(app.theme.text),
                    )));
                }
                lines.push(Line::from(Span::styled(
                    format!(
                        "  ({} row{})",
                        result.row_count,
                        if result.row_count == 1 { "" } else { "s" }
                    ),
                    muted,
                )));
                lines
            }
        },
    };

    f.render_widget(Paragraph::new(content).block(block), area);
}

/// Render the pricing column: derived table (top) + margin histogram (bottom).
fn render_pricing_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_pricing_table(f, v_chunks[0], app);
    render_histogram(f, v_chunks[1], app);
}

fn render_pricing_table(f: &mut Frame, area: Rect, app: &AppState) {
    let block = panel_block("Pricing", false, app);
    let muted = Style::default().fg(app.theme.muted);

    let mut lines: Vec<Line> = Vec::new();
    match app.loaded() {
        None => {
            lines.push(Line::from(Span::styled("  (no dataset)", muted)));
        }
        Some(data) => {
            if let Some(warning) = &data.pricing_warning {
                lines.push(Line::from(Span::styled(
                    format!("  {}", warning),
                    Style::default().fg(app.theme.warn),
                )));
            } else if let Some((header, rows)) = &data.pricing {
                let header_text = header.join(" | ");
                lines.push(Line::from(Span::styled(
                    format!("  {}", header_text),
                    Style::default()
                        .fg(app.theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format!("  {}", "-".repeat(header_text.len())),
                    muted,
                )));
                let visible = area.height.saturating_sub(4) as usize;
                for row in rows.iter().take(visible) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", row.join(" | ")),
                        Style::default().fg(app.theme.text),
                    )));
                }
            }
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_histogram(f: &mut Frame, area: Rect, app: &AppState) {
    let block = panel_block("Margin % Distribution", false, app);

    let Some(hist) = app.loaded().and_then(|d| d.histogram.as_ref()) else {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "  (no margin data)",
            Style::default().fg(app.theme.muted),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chart = margin_bar_chart(hist, app).block(block);
    f.render_widget(chart, area);
}

/// Build the histogram bar chart, one heat-colored bar per bin.
fn margin_bar_chart<'a>(hist: &Histogram, app: &AppState) -> BarChart<'a> {
    let labels = hist.labels();
    let denom = (hist.counts.len().saturating_sub(1)).max(1) as f32;
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (&count, label))| {
            let color = app.theme.heat.at(i as f32 / denom);
            Bar::default()
                .value(count)
                .label(Line::from(label))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(app.theme.text))
        })
        .collect();

    BarChart::default()
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
}

/// Render the status bar at the bottom.
fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = layout_mode(area.width);

    let focus_label = match app.focus {
        FocusPanel::Overview => "Dataset",
        FocusPanel::Editor => "Editor",
        FocusPanel::Results => "Results",
    };

    let shortcuts = match mode {
        LayoutMode::Full => "Tab: cycle | Ctrl+1/2/3: panel | Ctrl+Enter: run | Ctrl+S: sample",
        LayoutMode::TwoPanel => "Tab: cycle | Ctrl+Enter: run | Ctrl+S: sample",
        LayoutMode::Minimal => "Ctrl+Enter: run",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style);

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", app.status_message),
            Style::default().fg(app.theme.muted),
        ),
        Span::styled(
            format!("| {} ", focus_label),
            Style::default().fg(app.theme.accent),
        ),
        Span::styled(
            format!("| {} ", shortcuts),
            Style::default().fg(app.theme.muted),
        ),
        Span::styled(
            format!("| Theme: {} ", app.theme.name),
            Style::default().fg(app.theme.accent),
        ),
    ]))
    .block(block);

    f.render_widget(paragraph, area);
}
