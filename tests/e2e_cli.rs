//! End-to-end CLI integration tests.
//!
//! Tests the full non-interactive pipeline:
//! margin-lens <file.csv> -e "SQL" [--format csv|json|jsonl|table] [-o output]
//! and the --report text summary.
//!
//! Uses cargo binary execution via std::process::Command.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

/// Get the path to the compiled margin-lens binary.
fn margin_lens_bin() -> PathBuf {
    // cargo test puts binaries in target/debug/
    let mut path = std::env::current_exe()
        .expect("current_exe")
        .parent()
        .expect("parent")
        .parent()
        .expect("grandparent")
        .to_path_buf();
    path.push("margin-lens");
    path
}

/// Create a temp CSV with Cost/Price columns for pricing derivation.
fn make_test_csv() -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    write!(
        file,
        "Product,Cost,Price\n\
         Widget,10,20\n\
         Gadget,5,5\n\
         Gizmo,8,4\n"
    )
    .expect("write csv");
    file.flush().expect("flush csv");
    file
}

/// Run margin-lens with given args and return (stdout, stderr, exit_code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let bin = margin_lens_bin();
    let output = Command::new(&bin)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?}: {}", bin, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

// ---- Basic query tests ----

#[test]
fn test_cli_default_query_shape() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT Product, Profit FROM data ORDER BY Profit DESC LIMIT 5",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    let widget_pos = stdout.find("Widget").expect("Widget in output");
    let gizmo_pos = stdout.find("Gizmo").expect("Gizmo in output");
    assert!(
        widget_pos < gizmo_pos,
        "highest profit should come first, got: {}",
        stdout
    );
}

#[test]
fn test_cli_count_query() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[csv_path, "-e", "SELECT count(*) FROM data"]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.contains("3"),
        "should contain count=3, got: {}",
        stdout
    );
}

#[test]
fn test_cli_derived_columns_queryable() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT Product FROM data WHERE Profit < 0",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.contains("Gizmo"),
        "only Gizmo has negative profit, got: {}",
        stdout
    );
    assert!(!stdout.contains("Widget"), "Widget profit is positive");
}

// ---- Output format tests ----

#[test]
fn test_cli_format_csv() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT Product, Profit FROM data",
        "--format",
        "csv",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines[0], "Product,Profit");
    assert!(
        lines.len() == 4,
        "csv should have header + 3 rows, got: {}",
        stdout
    );
}

#[test]
fn test_cli_format_json() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT count(*) FROM data",
        "--format",
        "json",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.trim().starts_with('['),
        "json should start with [, got: {}",
        stdout
    );
    assert!(
        stdout.trim().ends_with(']'),
        "json should end with ], got: {}",
        stdout
    );
}

#[test]
fn test_cli_format_jsonl() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT Product FROM data",
        "--format",
        "jsonl",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines.len(), 3, "jsonl should have one line per row");
    for line in lines {
        assert!(
            line.starts_with('{') && line.ends_with('}'),
            "each jsonl line should be a JSON object, got: {}",
            line
        );
    }
}

#[test]
fn test_cli_format_table() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT count(*) FROM data",
        "--format",
        "table",
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.contains("---"),
        "table format should have separator, got: {}",
        stdout
    );
    assert!(
        stdout.contains("row"),
        "table format should have row count, got: {}",
        stdout
    );
}

// ---- Report tests ----

#[test]
fn test_cli_report() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (stdout, stderr, code) = run_cli(&[csv_path, "--report"]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.contains("Shape: 3 rows x 5 columns"),
        "report should include shape with derived columns, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Negative Profit Products: 1"),
        "report should count Gizmo as negative, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Top Performer: Widget"),
        "report should name the top performer, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Margin % distribution:"),
        "report should include the histogram section, got: {}",
        stdout
    );
    assert!(
        stdout.contains("Top performers:"),
        "report should include the top performers query, got: {}",
        stdout
    );
}

#[test]
fn test_cli_report_without_pricing_columns() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    write!(file, "Product,Qty\nWidget,5\n").expect("write csv");
    file.flush().expect("flush csv");

    let (stdout, stderr, code) = run_cli(&[file.path().to_str().unwrap(), "--report"]);

    assert_eq!(code, 0, "report should still succeed, stderr: {}", stderr);
    assert!(
        stdout.contains("summary skipped"),
        "report should note the skipped summary, got: {}",
        stdout
    );
}

// ---- Sample dataset tests ----

#[test]
fn test_cli_sample_from_working_directory() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("demo_logistics_data.csv"),
        "Product,Cost,Price\nCrate,10,25\n",
    )
    .expect("write sample");

    let bin = margin_lens_bin();
    let output = Command::new(&bin)
        .args(["--sample", "-e", "SELECT Product FROM data"])
        .current_dir(dir.path())
        .output()
        .expect("run with sample");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Crate"), "got: {}", stdout);
}

#[test]
fn test_cli_sample_missing() {
    let dir = TempDir::new().expect("temp dir");
    let bin = margin_lens_bin();
    let output = Command::new(&bin)
        .args(["--sample", "-e", "SELECT 1 FROM data"])
        .current_dir(dir.path())
        .output()
        .expect("run with missing sample");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_ne!(output.status.code(), Some(0));
    assert!(
        stderr.contains("demo_logistics_data.csv"),
        "should name the missing sample, got: {}",
        stderr
    );
}

// ---- Output file tests ----

#[test]
fn test_cli_output_file() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let output_file = NamedTempFile::new().expect("create temp output");
    let output_path = output_file.path().to_str().unwrap().to_string();

    let (_, stderr, code) = run_cli(&[
        csv_path,
        "-e",
        "SELECT Product FROM data",
        "--format",
        "csv",
        "-o",
        &output_path,
    ]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);

    let content = std::fs::read_to_string(&output_path).expect("read output file");
    assert!(
        content.contains("Widget"),
        "output file should contain result, got: {}",
        content
    );
}

// ---- SQL file input tests ----

#[test]
fn test_cli_sql_file_input() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();

    let mut sql_file = NamedTempFile::new().expect("create sql file");
    write!(sql_file, "SELECT count(*) FROM data").expect("write sql");
    sql_file.flush().expect("flush sql");
    let sql_path = sql_file.path().to_str().unwrap().to_string();

    let (stdout, stderr, code) = run_cli(&[csv_path, "-f", &sql_path]);

    assert_eq!(code, 0, "exit code should be 0, stderr: {}", stderr);
    assert!(
        stdout.contains("3"),
        "should contain count=3, got: {}",
        stdout
    );
}

// ---- Error handling tests ----

#[test]
fn test_cli_missing_csv_file() {
    let (_, stderr, code) = run_cli(&["/nonexistent/data.csv", "-e", "SELECT 1 FROM data"]);
    assert_ne!(code, 0, "should fail on missing file");
    assert!(
        stderr.contains("Error") || stderr.contains("error"),
        "should report error, got: {}",
        stderr
    );
}

#[test]
fn test_cli_no_source() {
    let (_, stderr, code) = run_cli(&["-e", "SELECT 1 FROM data"]);
    assert_ne!(code, 0, "should fail with no data source");
    assert!(
        stderr.contains("no data source"),
        "should explain the missing source, got: {}",
        stderr
    );
}

#[test]
fn test_cli_invalid_sql() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (_, stderr, code) = run_cli(&[csv_path, "-e", "SELEC Product FROM data"]);
    assert_ne!(code, 0, "should fail on invalid SQL");
    assert!(
        stderr.contains("error") || stderr.contains("Error"),
        "should report parse error, got: {}",
        stderr
    );
}

#[test]
fn test_cli_mutation_rejected() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();
    let (_, stderr, code) = run_cli(&[csv_path, "-e", "DELETE FROM data"]);
    assert_ne!(code, 0, "mutations should be rejected");
    assert!(
        stderr.contains("SELECT"),
        "error should say only SELECT is supported, got: {}",
        stderr
    );
}

// ---- Help and version ----

#[test]
fn test_cli_help() {
    let bin = margin_lens_bin();
    let output = Command::new(&bin)
        .arg("--help")
        .output()
        .expect("run --help");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("margin-lens"),
        "help should mention margin-lens, got: {}",
        stdout
    );
}

#[test]
fn test_cli_version() {
    let bin = margin_lens_bin();
    let output = Command::new(&bin)
        .arg("--version")
        .output()
        .expect("run --version");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("margin-lens"),
        "version should contain name, got: {}",
        stdout
    );
}

// ---- Pipe input test ----

#[test]
fn test_cli_pipe_input() {
    let csv = make_test_csv();
    let csv_path = csv.path().to_str().unwrap();

    let bin = margin_lens_bin();
    let mut child = Command::new(&bin)
        .arg(csv_path)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("spawn margin-lens");

    let stdin = child.stdin.as_mut().expect("stdin");
    write!(stdin, "SELECT count(*) FROM data").expect("write to stdin");
    drop(child.stdin.take()); // Close stdin to signal EOF

    let output = child.wait_with_output().expect("wait for output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let code = output.status.code().unwrap_or(-1);

    assert_eq!(
        code,
        0,
        "pipe input should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        stdout.contains("3"),
        "pipe query should return count=3, got: {}",
        stdout
    );
}
