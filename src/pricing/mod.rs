//! Pricing derivation: unit profit and margin percentage.
//!
//! Runs only when the table has both well-known columns `Cost` and
//! `Price` (exact names). Appends `Profit = Price - Cost` and
//! `Margin % = round(Profit / Price * 100, 2)` row-wise. A zero price
//! divides to IEEE infinity; NULL or non-numeric inputs degrade to NULL
//! for that row. Downstream pricing panels are skipped entirely when
//! derivation does not run.

pub mod histogram;
pub mod summary;

pub use histogram::{margin_histogram, Histogram, BIN_COUNT};
pub use summary::{summarize, Summary};

use crate::storage::{Column, DataType, Table, TableError, Value};

/// Well-known column names.
pub const PRODUCT: &str = "Product";
pub const COST: &str = "Cost";
pub const PRICE: &str = "Price";

/// Derived column names.
pub const PROFIT: &str = "Profit";
pub const MARGIN: &str = "Margin %";

/// Columns shown in the pricing panel, in order.
pub const PRICING_VIEW: &[&str] = &[PRODUCT, COST, PRICE, PROFIT, MARGIN];

/// Errors from the pricing views.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// The pricing view references a column the table does not have.
    /// Reported inline, not guarded against.
    #[error("pricing view column '{0}' not found in dataset")]
    MissingColumn(String),
}

/// Round to two decimal places, half away from zero. Non-finite values
/// pass through unchanged.
fn round2(v: f64) -> f64 {
    if v.is_finite() {
        (v * 100.0).round() / 100.0
    } else {
        v
    }
}

/// Append `Profit` and `Margin %` to the table.
///
/// Returns `Ok(false)` without touching the table when `Cost` or
/// `Price` is absent (the caller renders a warning and skips the
/// pricing panels). `Profit` stays INT64 when both inputs are INT64,
/// matching the source columns; `Margin %` is always FLOAT64. A source
/// file that already carries `Profit` or `Margin %` gets those columns
/// overwritten with the recomputed values.
pub fn derive(table: &mut Table) -> Result<bool, TableError> {
    let (cost, price) = match (table.column(COST), table.column(PRICE)) {
        (Some(c), Some(p)) => (c, p),
        _ => return Ok(false),
    };

    let rows = table.row_count();
    let int_profit =
        cost.data_type() == DataType::Int64 && price.data_type() == DataType::Int64;

    let mut profit: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut margin: Vec<Option<f64>> = Vec::with_capacity(rows);

    for row in 0..rows {
        match (cost.numeric(row), price.numeric(row)) {
            (Some(c), Some(p)) => {
                let pr = p - c;
                profit.push(Some(pr));
                // p == 0 divides to +/-Inf; 0/0 is NaN. Both propagate.
                margin.push(Some(round2(pr / p * 100.0)));
            }
            _ => {
                profit.push(None);
                margin.push(None);
            }
        }
    }

    let profit_col = if int_profit {
        Column::from_i64(PROFIT, profit.iter().map(|v| v.map(|f| f as i64)).collect())
    } else {
        Column::from_f64(PROFIT, profit)
    };
    table.upsert_column(profit_col)?;
    table.upsert_column(Column::from_f64(MARGIN, margin))?;
    Ok(true)
}

/// True when the table carries the derived columns.
pub fn is_derived(table: &Table) -> bool {
    table.has_column(PROFIT) && table.has_column(MARGIN)
}

/// Format a cell for the pricing panel: floats get two decimals, other
/// values render plainly.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Float(v) if v.is_finite() => format!("{:.2}", v),
        other => other.to_string(),
    }
}

/// The pricing table view: `Product, Cost, Price, Profit, Margin %`.
///
/// # Errors
/// Fails when any view column (notably `Product`) is missing.
pub fn pricing_view(table: &Table) -> Result<(Vec<String>, Vec<Vec<String>>), PricingError> {
    let mut columns = Vec::with_capacity(PRICING_VIEW.len());
    for &name in PRICING_VIEW {
        columns.push(
            table
                .column(name)
                .ok_or_else(|| PricingError::MissingColumn(name.to_string()))?,
        );
    }

    let header = PRICING_VIEW.iter().map(|s| s.to_string()).collect();
    let rows = (0..table.row_count())
        .map(|row| columns.iter().map(|c| format_cell(&c.value(row))).collect())
        .collect();
    Ok((header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Column;

    fn table_with(cost: Vec<Option<i64>>, price: Vec<Option<i64>>) -> Table {
        let n = cost.len();
        let mut t = Table::new();
        t.add_column(Column::from_str(
            PRODUCT,
            (0..n).map(|i| Some(format!("P{}", i))).collect(),
        ))
        .unwrap();
        t.add_column(Column::from_i64(COST, cost)).unwrap();
        t.add_column(Column::from_i64(PRICE, price)).unwrap();
        t
    }

    #[test]
    fn test_derive_basic() {
        let mut t = table_with(vec![Some(10), Some(5)], vec![Some(20), Some(5)]);
        assert!(derive(&mut t).unwrap());
        assert!(is_derived(&t));

        let profit = t.column(PROFIT).unwrap();
        assert_eq!(profit.value(0), Value::Int(10));
        assert_eq!(profit.value(1), Value::Int(0));

        let margin = t.column(MARGIN).unwrap();
        assert_eq!(margin.value(0), Value::Float(50.0));
        assert_eq!(margin.value(1), Value::Float(0.0));
    }

    #[test]
    fn test_derive_zero_price_gives_infinity() {
        let mut t = table_with(vec![Some(10)], vec![Some(0)]);
        assert!(derive(&mut t).unwrap());
        assert_eq!(t.column(PROFIT).unwrap().value(0), Value::Int(-10));
        match t.column(MARGIN).unwrap().value(0) {
            Value::Float(v) => assert!(v.is_infinite() && v < 0.0),
            other => panic!("expected Float, got {:?}", other),
        }
    }

    #[test]
    fn test_derive_skipped_without_required_columns() {
        let mut t = Table::new();
        t.add_column(Column::from_i64(COST, vec![Some(1)])).unwrap();
        assert!(!derive(&mut t).unwrap());
        assert!(!is_derived(&t));
        assert_eq!(t.num_columns(), 1);
    }

    #[test]
    fn test_derive_null_rows_degrade() {
        let mut t = table_with(vec![Some(10), None], vec![Some(20), Some(30)]);
        assert!(derive(&mut t).unwrap());
        assert!(t.column(PROFIT).unwrap().value(1).is_null());
        assert!(t.column(MARGIN).unwrap().value(1).is_null());
        // The valid row still derives
        assert_eq!(t.column(MARGIN).unwrap().value(0), Value::Float(50.0));
    }

    #[test]
    fn test_derive_overwrites_existing_derived_columns() {
        // Source files sometimes ship a stale Profit column already.
        let mut t = table_with(vec![Some(10)], vec![Some(20)]);
        t.add_column(Column::from_i64(PROFIT, vec![Some(999)])).unwrap();
        assert!(derive(&mut t).unwrap());
        assert_eq!(t.column(PROFIT).unwrap().value(0), Value::Int(10));
        assert_eq!(t.column(MARGIN).unwrap().value(0), Value::Float(50.0));
        assert_eq!(t.num_columns(), 5);
    }

    #[test]
    fn test_derive_float_inputs_give_float_profit() {
        let mut t = Table::new();
        t.add_column(Column::from_f64(COST, vec![Some(1.5)])).unwrap();
        t.add_column(Column::from_f64(PRICE, vec![Some(4.0)])).unwrap();
        assert!(derive(&mut t).unwrap());
        assert_eq!(t.column(PROFIT).unwrap().value(0), Value::Float(2.5));
        assert_eq!(t.column(MARGIN).unwrap().value(0), Value::Float(62.5));
    }

    #[test]
    fn test_margin_rounding() {
        // 1/3 margin: profit 1, price 3 -> 33.333..% -> 33.33
        let mut t = table_with(vec![Some(2)], vec![Some(3)]);
        assert!(derive(&mut t).unwrap());
        assert_eq!(t.column(MARGIN).unwrap().value(0), Value::Float(33.33));
    }

    #[test]
    fn test_pricing_view_order_and_format() {
        let mut t = table_with(vec![Some(10)], vec![Some(20)]);
        derive(&mut t).unwrap();
        let (header, rows) = pricing_view(&t).unwrap();
        assert_eq!(header, PRICING_VIEW);
        assert_eq!(rows, vec![vec!["P0", "10", "20", "10", "50.00"]]);
    }

    #[test]
    fn test_pricing_view_missing_product_is_reported() {
        let mut t = Table::new();
        t.add_column(Column::from_i64(COST, vec![Some(10)])).unwrap();
        t.add_column(Column::from_i64(PRICE, vec![Some(20)])).unwrap();
        derive(&mut t).unwrap();
        let err = pricing_view(&t).unwrap_err();
        assert!(err.to_string().contains("Product"));
    }
}
