//! SQL parsing and execution for margin-lens.
//!
//! Wraps `sqlparser-rs` to parse a SELECT-only SQL subset and interprets the
//! resulting logical plan against the single in-memory table, registered
//! under the fixed name `data`.
//!
//! Supported SQL subset:
//! - SELECT: columns, aggregates (COUNT, SUM, AVG, MIN, MAX), COUNT(*)
//! - FROM: the table `data` (any case)
//! - WHERE: simple predicates, compound (AND, OR)
//! - GROUP BY: column list
//! - ORDER BY: column ASC/DESC
//! - LIMIT: integer value

pub mod engine;
pub mod logical_plan;
pub mod parser;
pub mod types;

pub use engine::{execute, EngineError, QueryResult, TABLE_NAME};
pub use logical_plan::LogicalPlan;
pub use parser::{parse_query, ParseError};

/// The query pre-filled in the dashboard editor and used by `--report`.
pub const DEFAULT_QUERY: &str = "SELECT Product, Profit FROM data ORDER BY Profit DESC LIMIT 5";
