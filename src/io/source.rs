//! Data source resolver.
//!
//! Exactly one of two sources produces the cycle's table: an explicit
//! CSV path, or the bundled sample file looked up in the current working
//! directory when the sample flag is set. With neither, the pipeline is
//! idle (a prompt, not an error). A missing sample file is fatal for the
//! cycle.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::csv::{self, CsvError};
use crate::storage::Table;

/// Fixed sample filename expected in the working directory.
pub const SAMPLE_FILE: &str = "demo_logistics_data.csv";

/// What the user asked to load. Re-resolved from scratch every cycle.
#[derive(Debug, Clone, Default)]
pub struct SourceSpec {
    /// Explicit CSV path; takes precedence over the sample flag.
    pub file: Option<PathBuf>,
    /// Fall back to [`SAMPLE_FILE`] in the working directory.
    pub use_sample: bool,
}

/// Errors that halt the cycle before any data panel renders.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("sample file '{SAMPLE_FILE}' not found in the current directory")]
    SampleMissing,
    #[error(transparent)]
    Csv(#[from] CsvError),
}

impl SourceSpec {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            use_sample: false,
        }
    }

    /// True when no source is selected (idle prompt state).
    pub fn is_idle(&self) -> bool {
        self.file.is_none() && !self.use_sample
    }

    /// Short description for the status line.
    pub fn describe(&self) -> String {
        match (&self.file, self.use_sample) {
            (Some(path), _) => path.display().to_string(),
            (None, true) => format!("{} (sample)", SAMPLE_FILE),
            (None, false) => "no source".to_string(),
        }
    }

    /// Resolve the spec into a table, with the sample file looked up in
    /// the current working directory.
    ///
    /// `Ok(None)` means idle (no source selected); errors are fatal for
    /// the cycle.
    pub fn resolve(&self) -> Result<Option<Table>, SourceError> {
        self.resolve_from(Path::new("."))
    }

    /// Like [`resolve`](Self::resolve), but with the sample file looked
    /// up under `base`. Explicit paths are used as given.
    fn resolve_from(&self, base: &Path) -> Result<Option<Table>, SourceError> {
        if let Some(path) = &self.file {
            debug!(path = %path.display(), "loading user csv");
            return Ok(Some(csv::load_table(path)?));
        }

        if self.use_sample {
            let sample = base.join(SAMPLE_FILE);
            if !sample.exists() {
                return Err(SourceError::SampleMissing);
            }
            debug!("loading sample csv");
            return Ok(Some(csv::load_table(&sample)?));
        }

        Ok(None)
    }
}
