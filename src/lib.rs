//! margin-lens: a terminal dashboard for logistics pricing data.
//!
//! Loads product data from CSV (an uploaded file or the bundled sample),
//! derives Profit and Margin % columns, and serves an interactive
//! dashboard with a profile overview, a margin histogram, and an ad-hoc
//! SQL console over the in-memory table `data`. A non-interactive CLI
//! mode runs a single query or a full text report for scripting.

pub mod cli;
pub mod io;
pub mod pricing;
pub mod sql;
pub mod storage;
pub mod tui;
