//! Three-fact insight summary.
//!
//! Mean margin (NULLs skipped, infinities propagate), count of
//! negative-profit rows, and the product at maximum profit. Only
//! reachable after pricing derivation succeeded.

use crate::storage::Table;

use super::{MARGIN, PRODUCT, PROFIT};

/// Placeholder when the `Product` column is absent.
const NO_PRODUCT: &str = "N/A";

/// Summary facts computed fresh each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Arithmetic mean of `Margin %` over non-null rows. NaN when no
    /// rows qualify; infinite when a zero-price row propagated.
    pub mean_margin: f64,
    /// Count of rows with `Profit < 0`.
    pub negative_profit: usize,
    /// `Product` at maximum `Profit`, or `N/A` without a product column.
    pub top_performer: String,
}

impl Summary {
    /// Plain-text rendering for the report output.
    pub fn render_text(&self) -> String {
        format!(
            "Average Margin: {:.2}%\nNegative Profit Products: {}\nTop Performer: {}",
            self.mean_margin, self.negative_profit, self.top_performer
        )
    }
}

/// Compute the summary facts. Returns `None` when the derived columns
/// are absent (pricing derivation was skipped this cycle).
pub fn summarize(table: &Table) -> Option<Summary> {
    let profit = table.column(PROFIT)?;
    let margin = table.column(MARGIN)?;
    let rows = table.row_count();

    let mut sum = 0.0;
    let mut count = 0usize;
    for row in 0..rows {
        if let Some(v) = margin.numeric(row) {
            sum += v;
            count += 1;
        }
    }
    let mean_margin = if count > 0 { sum / count as f64 } else { f64::NAN };

    let negative_profit = (0..rows)
        .filter(|&row| profit.numeric(row).is_some_and(|v| v < 0.0))
        .count();

    let top_row = (0..rows)
        .filter_map(|row| profit.numeric(row).map(|v| (row, v)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(row, _)| row);

    let top_performer = match (top_row, table.column(PRODUCT)) {
        (Some(row), Some(product)) => product.value(row).to_string(),
        (Some(_), None) | (None, _) => NO_PRODUCT.to_string(),
    };

    Some(Summary {
        mean_margin,
        negative_profit,
        top_performer,
    })
}
