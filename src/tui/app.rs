//! Application state model for the dashboard.
//!
//! Holds the data source, the loaded pipeline output (profile, pricing view,
//! histogram, summary), editor and query state, and the theme. The whole
//! pipeline is recomputed on every reload so the panels never show stale
//! derivations.

use super::editor::EditorState;
use super::themes::Theme;
use crate::io::SourceSpec;
use crate::pricing::{self, Histogram, Summary};
use crate::sql::{self, QueryResult, DEFAULT_QUERY};
use crate::storage::{Table, TableProfile};

/// Focus panel in the dashboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    /// Dataset overview and summary facts.
    Overview,
    /// SQL query editor.
    Editor,
    /// Query results display.
    Results,
}

/// Current state of query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// No query run yet.
    Idle,
    /// Query completed with result.
    Complete,
    /// Query failed with error message.
    Error(String),
}

/// Everything derived from a successfully loaded dataset.
pub struct LoadedData {
    /// The table queries run against, pricing columns already appended.
    pub table: Table,
    /// Shape and per-column missing counts.
    pub profile: TableProfile,
    /// Pricing panel rows (header, rows), absent when derivation was skipped.
    pub pricing: Option<(Vec<String>, Vec<Vec<String>>)>,
    /// Why the pricing panels are empty, shown inline.
    pub pricing_warning: Option<String>,
    /// Margin distribution for the histogram panel.
    pub histogram: Option<Histogram>,
    /// Three-fact summary.
    pub summary: Option<Summary>,
}

/// Outcome of the load-and-derive pipeline.
pub enum PipelineState {
    /// No source selected yet.
    Idle,
    /// Load failed; the message replaces the data panels.
    Failed(String),
    /// Dataset loaded and derived.
    Loaded(Box<LoadedData>),
}

/// Main application state for the dashboard.
pub struct AppState {
    /// Whether the app is running (false = quit).
    pub running: bool,
    /// Current focused panel.
    pub focus: FocusPanel,
    /// Where the dataset comes from (file and/or sample toggle).
    pub source: SourceSpec,
    /// Pipeline output for the current source.
    pub pipeline: PipelineState,
    /// Multi-line SQL editor, pre-filled with the default query.
    pub editor_state: EditorState,
    /// Query execution state.
    pub query_state: QueryState,
    /// Most recent query result.
    pub last_result: Option<QueryResult>,
    /// Query history (oldest first).
    pub history: Vec<String>,
    /// Results panel scroll offset (rows skipped from the top).
    pub results_offset: usize,
    /// Current theme.
    pub theme: Theme,
    /// Frame counter.
    pub frame_count: u64,
    /// Status bar message.
    pub status_message: String,
    /// Tick rate in milliseconds (target ~60fps = 16ms).
    pub tick_rate_ms: u64,
}

impl AppState {
    /// Create a new AppState with the given source and theme name.
    /// Call `refresh` afterwards to run the pipeline.
    pub fn new(source: SourceSpec, theme_name: &str) -> Self {
        Self {
            running: true,
            focus: FocusPanel::Editor,
            source,
            pipeline: PipelineState::Idle,
            editor_state: EditorState::with_text(DEFAULT_QUERY),
            query_state: QueryState::Idle,
            last_result: None,
            history: Vec::new(),
            results_offset: 0,
            theme: Theme::by_name(theme_name),
            frame_count: 0,
            status_message: "Ready. Ctrl+Enter runs the query, q quits.".into(),
            tick_rate_ms: 16,
        }
    }

    /// The loaded dataset, if the pipeline succeeded.
    pub fn loaded(&self) -> Option<&LoadedData> {
        match &self.pipeline {
            PipelineState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Run the full pipeline: resolve source, load CSV, derive pricing,
    /// rebuild the derived panels, and re-run the editor query.
    pub fn refresh(&mut self) {
        self.last_result = None;
        self.query_state = QueryState::Idle;
        self.results_offset = 0;

        let mut table = match self.source.resolve() {
            Ok(Some(table)) => table,
            Ok(None) => {
                self.pipeline = PipelineState::Idle;
                self.status_message =
                    "No data source. Ctrl+S loads the sample dataset.".into();
                return;
            }
            Err(e) => {
                self.pipeline = PipelineState::Failed(e.to_string());
                self.status_message = format!("Load failed: {}", e);
                return;
            }
        };

        let derived = match pricing::derive(&mut table) {
            Ok(derived) => derived,
            Err(e) => {
                self.pipeline = PipelineState::Failed(e.to_string());
                self.status_message = format!("Derivation failed: {}", e);
                return;
            }
        };

        let mut pricing_warning = None;
        let pricing_rows = if derived {
            match pricing::pricing_view(&table) {
                Ok(view) => Some(view),
                Err(e) => {
                    pricing_warning = Some(e.to_string());
                    None
                }
            }
        } else {
            pricing_warning = Some(format!(
                "Columns '{}' and '{}' not found; pricing panels skipped.",
                pricing::COST,
                pricing::PRICE
            ));
            None
        };

        let profile = table.profile();
        let histogram = pricing::margin_histogram(&table);
        let summary = pricing::summarize(&table);

        self.status_message = format!(
            "Loaded {} rows x {} columns from {}",
            profile.row_count,
            profile.column_count,
            self.source.describe()
        );

        self.pipeline = PipelineState::Loaded(Box::new(LoadedData {
            table,
            profile,
            pricing: pricing_rows,
            pricing_warning,
            histogram,
            summary,
        }));

        if !self.editor_state.is_empty() {
            self.run_query();
        }
    }

    /// Execute the SQL currently in the editor against the loaded table.
    pub fn run_query(&mut self) {
        let sql = self.editor_state.text();
        let sql = sql.trim();
        if sql.is_empty() {
            self.set_error("No query to execute".into());
            return;
        }

        let outcome = match &self.pipeline {
            PipelineState::Loaded(data) => Some(sql::execute(sql, &data.table)),
            _ => None,
        };

        match outcome {
            None => self.set_error("No dataset loaded".into()),
            Some(Err(e)) => self.set_error(e.to_string()),
            Some(Ok(result)) => {
                self.history.push(sql.to_string());
                self.status_message = format!(
                    "Query completed: {} row{}",
                    result.row_count,
                    if result.row_count == 1 { "" } else { "s" }
                );
                self.set_result(result);
            }
        }
    }

    /// Flip the sample-dataset toggle and reload. An explicit file still
    /// wins over the sample.
    pub fn toggle_sample(&mut self) {
        self.source.use_sample = !self.source.use_sample;
        self.refresh();
    }

    /// Cycle focus to the next panel.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPanel::Overview => FocusPanel::Editor,
            FocusPanel::Editor => FocusPanel::Results,
            FocusPanel::Results => FocusPanel::Overview,
        };
    }

    /// Set the query result.
    pub fn set_result(&mut self, result: QueryResult) {
        self.query_state = QueryState::Complete;
        self.results_offset = 0;
        self.last_result = Some(result);
    }

    /// Set query error.
    pub fn set_error(&mut self, msg: String) {
        self.status_message = format!("Error: {}", msg);
        self.query_state = QueryState::Error(msg);
    }

    /// Scroll the results panel down one row.
    pub fn results_scroll_down(&mut self) {
        let total = self.last_result.as_ref().map_or(0, |r| r.rows.len());
        if self.results_offset + 1 < total {
            self.results_offset += 1;
        }
    }

    /// Scroll the results panel up one row.
    pub fn results_scroll_up(&mut self) {
        self.results_offset = self.results_offset.saturating_sub(1);
    }

    /// Increment the frame counter.
    pub fn tick(&mut self) {
        self.frame_count = self.frame_count.wrapping_add(1);
    }
}
