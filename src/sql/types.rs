//! Core type definitions for the SQL engine.
//!
//! These types form the intermediate representation between the sqlparser AST
//! and the logical plan. Literal values reuse `storage::Value` so query
//! results and table cells share one representation.

use std::fmt;

pub use crate::storage::Value;

/// Comparison operators for WHERE predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunc::Count => write!(f, "COUNT"),
            AggFunc::Sum => write!(f, "SUM"),
            AggFunc::Avg => write!(f, "AVG"),
            AggFunc::Min => write!(f, "MIN"),
            AggFunc::Max => write!(f, "MAX"),
        }
    }
}

/// Logical operator for compound predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// SQL expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference by name.
    Column(String),
    /// Literal value.
    Literal(Value),
    /// Binary comparison: left op right.
    BinaryOp {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    /// Compound predicate: left AND/OR right.
    Compound {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// Aggregate function call.
    Aggregate {
        func: AggFunc,
        /// The argument expression. For COUNT(*), this is `Expr::Wildcard`.
        arg: Box<Expr>,
    },
    /// Wildcard (*) in SELECT or COUNT(*).
    Wildcard,
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(Value::Str(s)) => write!(f, "'{}'", s),
            Expr::Literal(val) => write!(f, "{}", val),
            Expr::BinaryOp { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::Compound { left, op, right } => {
                let op_str = match op {
                    LogicalOp::And => "AND",
                    LogicalOp::Or => "OR",
                };
                write!(f, "({} {} {})", left, op_str, right)
            }
            Expr::Aggregate { func, arg } => write!(f, "{}({})", func, arg),
            Expr::Wildcard => write!(f, "*"),
        }
    }
}
