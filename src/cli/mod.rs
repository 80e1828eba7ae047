//! CLI module: non-interactive execution and output formatting.
//!
//! Handles the full non-interactive pipeline:
//! parse args -> load CSV -> derive pricing -> execute or report -> exit.

pub mod args;

use std::io::Write;

use crate::pricing;
use crate::sql::{self, QueryResult};
use crate::storage::Table;
use args::{CliArgs, OutputFormat};

/// Format a QueryResult according to the specified output format.
pub fn format_result(result: &QueryResult, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(result),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Jsonl => format_jsonl(result),
    }
}

/// Format as ASCII table.
fn format_table(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "(empty result)".to_string();
    }

    let mut out = String::new();

    // Compute column widths
    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (i, val) in row.iter().enumerate() {
            if i < widths.len() && val.len() > widths[i] {
                widths[i] = val.len();
            }
        }
    }

    // Header
    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:>width$}", c, width = widths[i]))
        .collect();
    out.push_str(&header.join(" | "));
    out.push('\n');

    // Separator
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&sep.join("-+-"));
    out.push('\n');

    // Rows
    for row in &result.rows {
        let formatted: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let w = if i < widths.len() { widths[i] } else { v.len() };
                format!("{:>width$}", v, width = w)
            })
            .collect();
        out.push_str(&formatted.join(" | "));
        out.push('\n');
    }

    out.push_str(&format!(
        "({} row{})",
        result.row_count,
        if result.row_count == 1 { "" } else { "s" }
    ));

    out
}

/// Format as CSV.
fn format_csv(result: &QueryResult) -> String {
    let mut out = String::new();

    out.push_str(&csv_escape_row(&result.columns));
    out.push('\n');

    for row in &result.rows {
        out.push_str(&csv_escape_row(row));
        out.push('\n');
    }

    if out.ends_with('\n') {
        out.pop();
    }

    out
}

/// Escape and join a row as CSV.
fn csv_escape_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains(',') || f.contains('"') || f.contains('\n') {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Format as JSON array of objects.
fn format_json(result: &QueryResult) -> String {
    let mut out = String::from("[\n");

    for (row_idx, row) in result.rows.iter().enumerate() {
        out.push_str("  {");
        for (col_idx, val) in row.iter().enumerate() {
            if col_idx > 0 {
                out.push_str(", ");
            }
            let col_name = &result.columns[col_idx];
            out.push_str(&format!(
                "\"{}\": {}",
                json_escape(col_name),
                json_value(val)
            ));
        }
        out.push('}');
        if row_idx < result.rows.len() - 1 {
            out.push(',');
        }
        out.push('\n');
    }

    out.push(']');
    out
}

/// Format as JSONL (one JSON object per line).
fn format_jsonl(result: &QueryResult) -> String {
    let mut out = String::new();

    for row in &result.rows {
        out.push('{');
        for (col_idx, val) in row.iter().enumerate() {
            if col_idx > 0 {
                out.push_str(", ");
            }
            let col_name = &result.columns[col_idx];
            out.push_str(&format!(
                "\"{}\": {}",
                json_escape(col_name),
                json_value(val)
            ));
        }
        out.push('}');
        out.push('\n');
    }

    if out.ends_with('\n') {
        out.pop();
    }

    out
}

/// Escape a string for JSON.
fn json_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Format a value for JSON output. Attempts numeric parsing.
fn json_value(val: &str) -> String {
    if val.parse::<i64>().is_ok() {
        return val.to_string();
    }
    if val.parse::<f64>().is_ok() {
        return val.to_string();
    }
    if val == "NULL" || val.is_empty() {
        return "null".to_string();
    }
    format!("\"{}\"", json_escape(val))
}

/// Render the full text report: profile, pricing summary, margin histogram,
/// and the default top-performers query.
fn render_report(table: &Table, source: &str) -> String {
    let mut out = String::new();
    let profile = table.profile();

    out.push_str(&format!("Source: {}\n", source));
    out.push_str(&format!(
        "Shape: {} rows x {} columns\n",
        profile.row_count, profile.column_count
    ));

    out.push_str("\nColumns:\n");
    for def in &table.schema().columns {
        out.push_str(&format!("  {}: {}\n", def.name, def.data_type));
    }

    let (preview_header, preview_rows) = table.preview(5);
    let preview = QueryResult {
        row_count: preview_rows.len(),
        columns: preview_header,
        rows: preview_rows,
    };
    out.push_str("\nPreview (first 5 rows):\n");
    for line in format_table(&preview).lines() {
        out.push_str(&format!("  {}\n", line));
    }

    out.push_str("\nMissing values:\n");
    if profile.missing.iter().all(|(_, n)| *n == 0) {
        out.push_str("  (none)\n");
    } else {
        for (name, count) in profile.missing.iter().filter(|(_, n)| *n > 0) {
            out.push_str(&format!("  {}: {}\n", name, count));
        }
    }

    match pricing::summarize(table) {
        Some(summary) => {
            out.push_str("\nSummary:\n");
            for line in summary.render_text().lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        None => {
            out.push_str(&format!(
                "\nPricing columns ('{}', '{}') not found; summary skipped.\n",
                pricing::COST,
                pricing::PRICE
            ));
        }
    }

    if let Some(hist) = pricing::margin_histogram(table) {
        out.push_str("\nMargin % distribution:\n");
        let labels = hist.labels();
        let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let peak = hist.max_count().max(1);
        for (label, count) in labels.iter().zip(&hist.counts) {
            let bar = "#".repeat((count * 40 / peak) as usize);
            out.push_str(&format!("  {:>width$} | {} {}\n", label, bar, count));
        }
    }

    match sql::execute(sql::DEFAULT_QUERY, table) {
        Ok(result) => {
            out.push_str("\nTop performers:\n");
            for line in format_table(&result).lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
        Err(e) => {
            out.push_str(&format!("\nTop performers unavailable: {}\n", e));
        }
    }

    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Run the non-interactive execution path.
/// Returns the exit code.
pub fn run_non_interactive(args: &CliArgs) -> i32 {
    let spec = crate::io::SourceSpec {
        file: args.csv_file.clone(),
        use_sample: args.sample,
    };

    let mut table = match spec.resolve() {
        Ok(Some(t)) => t,
        Ok(None) => {
            eprintln!("Error: no data source. Pass a CSV file or --sample.");
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    // Pricing derivation is best-effort; a dataset without Cost/Price is
    // still queryable.
    if let Err(e) = pricing::derive(&mut table) {
        eprintln!("Error deriving pricing columns: {}", e);
        return 1;
    }

    let formatted = if args.report {
        render_report(&table, &spec.describe())
    } else {
        let sql = match args.resolve_query() {
            Ok(q) => q,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };

        let result = match sql::execute(&sql, &table) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Query error: {}", e);
                return 1;
            }
        };

        format_result(&result, &args.format)
    };

    if let Some(ref path) = args.output {
        match std::fs::write(path, &formatted) {
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error writing to '{}': {}", path.display(), e);
                return 1;
            }
        }
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = write!(handle, "{}", formatted) {
            // Broken pipe is expected when piping to head/etc
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Write error: {}", e);
                return 1;
            }
        }
        let _ = writeln!(handle);
    }

    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Column;

    fn sample_result() -> QueryResult {
        QueryResult {
            columns: vec!["Product".into(), "Profit".into()],
            rows: vec![
                vec!["Crate".into(), "80".into()],
                vec!["Strap, heavy".into(), "30".into()],
            ],
            row_count: 2,
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&sample_result());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Product,Profit");
        assert_eq!(lines[1], "Crate,80");
        assert_eq!(lines[2], "\"Strap, heavy\",30");
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&sample_result());
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
        assert!(json.contains("\"Product\": \"Crate\""));
        assert!(json.contains("\"Profit\": 80"));
    }

    #[test]
    fn test_format_jsonl() {
        let jsonl = format_jsonl(&sample_result());
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('{'));
        assert!(lines[0].contains("\"Product\": \"Crate\""));
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&sample_result());
        assert!(table.contains("Product"));
        assert!(table.contains("Crate"));
        assert!(table.contains("(2 rows)"));
    }

    #[test]
    fn test_format_empty_result() {
        let r = QueryResult {
            columns: vec![],
            rows: vec![],
            row_count: 0,
        };
        assert_eq!(format_table(&r), "(empty result)");
    }

    #[test]
    fn test_json_value_types() {
        assert_eq!(json_value("42"), "42");
        assert_eq!(json_value("3.5"), "3.5");
        assert_eq!(json_value("hello"), "\"hello\"");
        assert_eq!(json_value("NULL"), "null");
    }

    #[test]
    fn test_render_report_contains_facts() {
        let mut t = crate::storage::Table::new();
        t.add_column(Column::from_str(
            "Product",
            vec![Some("A".into()), Some("B".into())],
        ))
        .unwrap();
        t.add_column(Column::from_i64("Cost", vec![Some(10), Some(5)]))
            .unwrap();
        t.add_column(Column::from_i64("Price", vec![Some(20), Some(5)]))
            .unwrap();
        pricing::derive(&mut t).unwrap();

        let report = render_report(&t, "test.csv");
        assert!(report.contains("Shape: 2 rows x 5 columns"));
        assert!(report.contains("Product: VARCHAR"));
        assert!(report.contains("Profit: INT64"));
        assert!(report.contains("Preview (first 5 rows):"));
        assert!(report.contains("Average Margin: 25.00%"));
        assert!(report.contains("Top Performer: A"));
        assert!(report.contains("Margin % distribution:"));
        assert!(report.contains("Top performers:"));
    }

    #[test]
    fn test_render_report_without_pricing_columns() {
        let mut t = crate::storage::Table::new();
        t.add_column(Column::from_str("Product", vec![Some("A".into())]))
            .unwrap();
        pricing::derive(&mut t).unwrap();

        let report = render_report(&t, "test.csv");
        assert!(report.contains("summary skipped"));
    }
}
