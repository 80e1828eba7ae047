//! Row-interpreting query engine.
//!
//! Executes a `LogicalPlan` against the single in-memory table. The engine
//! walks the plan bottom-up, materializing an intermediate frame of rows at
//! each node. Datasets here are interactive-dashboard sized, so plain row
//! iteration is the right tool.
//!
//! NULL semantics follow SQL: comparisons against NULL are false, aggregates
//! skip NULL inputs, and COUNT(*) counts rows regardless.

use std::collections::HashMap;

use crate::storage::{Table, Value};

use super::logical_plan::LogicalPlan;
use super::parser::{self, ParseError};
use super::types::{AggFunc, CompareOp, Expr, LogicalOp};

/// The fixed table name queries run against.
pub const TABLE_NAME: &str = "data";

/// Errors from query execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// FROM references something other than the fixed table.
    #[error("unknown table '{0}' (the loaded dataset is available as 'data')")]
    UnknownTable(String),
    /// A referenced column does not exist in the dataset.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    /// Plan shape the interpreter cannot evaluate.
    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// A finished query result, already rendered to strings for display.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
}

/// Intermediate rows flowing between plan nodes.
struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Case-insensitive column lookup, mirroring common SQL dialects.
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Parse and execute a SQL string against the loaded table.
pub fn execute(sql: &str, table: &Table) -> Result<QueryResult, EngineError> {
    let plan = parser::parse_query(sql)?;
    execute_plan(&plan, table)
}

/// Execute an already-parsed plan.
pub fn execute_plan(plan: &LogicalPlan, table: &Table) -> Result<QueryResult, EngineError> {
    let frame = exec_node(plan, table)?;
    let row_count = frame.rows.len();
    let rows = frame
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.to_string()).collect())
        .collect();
    Ok(QueryResult {
        columns: frame.columns,
        rows,
        row_count,
    })
}

fn exec_node(plan: &LogicalPlan, table: &Table) -> Result<Frame, EngineError> {
    match plan {
        LogicalPlan::Scan { table: name } => scan(name, table),
        LogicalPlan::Filter { predicate, input } => {
            let mut frame = exec_node(input, table)?;
            let mut kept = Vec::with_capacity(frame.rows.len());
            for row in frame.rows.drain(..) {
                if eval_predicate(predicate, &frame.columns, &row)? {
                    kept.push(row);
                }
            }
            frame.rows = kept;
            Ok(frame)
        }
        LogicalPlan::Projection { columns, input } => {
            let frame = exec_node(input, table)?;
            project(columns, frame)
        }
        LogicalPlan::Aggregate {
            group_by,
            aggregates,
            input,
        } => {
            let frame = exec_node(input, table)?;
            aggregate(group_by, aggregates, frame)
        }
        LogicalPlan::Sort { order_by, input } => {
            let mut frame = exec_node(input, table)?;
            sort(order_by, &mut frame)?;
            Ok(frame)
        }
        LogicalPlan::Limit { count, input } => {
            let mut frame = exec_node(input, table)?;
            frame.rows.truncate(*count);
            Ok(frame)
        }
    }
}

fn scan(name: &str, table: &Table) -> Result<Frame, EngineError> {
    if !name.eq_ignore_ascii_case(TABLE_NAME) {
        return Err(EngineError::UnknownTable(name.to_string()));
    }
    let columns: Vec<String> = table.columns().iter().map(|c| c.name.clone()).collect();
    let rows = (0..table.row_count())
        .map(|row| table.columns().iter().map(|c| c.value(row)).collect())
        .collect();
    Ok(Frame { columns, rows })
}

fn project(exprs: &[Expr], frame: Frame) -> Result<Frame, EngineError> {
    let mut indices = Vec::with_capacity(exprs.len());
    let mut columns = Vec::with_capacity(exprs.len());
    for expr in exprs {
        match expr {
            Expr::Column(name) => {
                let idx = frame
                    .column_index(name)
                    .ok_or_else(|| EngineError::UnknownColumn(name.clone()))?;
                indices.push(idx);
                columns.push(frame.columns[idx].clone());
            }
            other => {
                return Err(EngineError::Unsupported(format!(
                    "cannot project expression '{}'",
                    other
                )))
            }
        }
    }
    let rows = frame
        .rows
        .into_iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(Frame { columns, rows })
}

fn sort(order_by: &[(Expr, bool)], frame: &mut Frame) -> Result<(), EngineError> {
    let mut keys = Vec::with_capacity(order_by.len());
    for (expr, asc) in order_by {
        match expr {
            Expr::Column(name) => {
                let idx = frame
                    .column_index(name)
                    .ok_or_else(|| EngineError::UnknownColumn(name.clone()))?;
                keys.push((idx, *asc));
            }
            other => {
                return Err(EngineError::Unsupported(format!(
                    "cannot sort by expression '{}'",
                    other
                )))
            }
        }
    }
    frame.rows.sort_by(|a, b| {
        for &(idx, asc) in &keys {
            let ord = compare_for_sort(&a[idx], &b[idx]);
            let ord = if asc { ord } else { ord.reverse() };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
    Ok(())
}

/// Total ordering for sorting, following the sqlite convention: NULL is
/// the smallest value, then numerics by value, then strings
/// lexicographic. DESC reverses the whole ordering, so NULLs land last
/// under DESC.
fn compare_for_sort(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Str(_), _) => Ordering::Greater,
        (_, Value::Str(_)) => Ordering::Less,
        (x, y) => {
            // Both numeric at this point.
            let xf = x.as_f64().unwrap_or(f64::NAN);
            let yf = y.as_f64().unwrap_or(f64::NAN);
            xf.total_cmp(&yf)
        }
    }
}

fn eval_predicate(expr: &Expr, columns: &[String], row: &[Value]) -> Result<bool, EngineError> {
    match expr {
        Expr::Compound { left, op, right } => {
            let l = eval_predicate(left, columns, row)?;
            let r = eval_predicate(right, columns, row)?;
            Ok(match op {
                LogicalOp::And => l && r,
                LogicalOp::Or => l || r,
            })
        }
        Expr::BinaryOp { left, op, right } => {
            let l = eval_scalar(left, columns, row)?;
            let r = eval_scalar(right, columns, row)?;
            Ok(compare_values(&l, *op, &r))
        }
        other => Err(EngineError::Unsupported(format!(
            "predicate must be a comparison, got '{}'",
            other
        ))),
    }
}

fn eval_scalar(expr: &Expr, columns: &[String], row: &[Value]) -> Result<Value, EngineError> {
    match expr {
        Expr::Column(name) => {
            let idx = columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .ok_or_else(|| EngineError::UnknownColumn(name.clone()))?;
            Ok(row[idx].clone())
        }
        Expr::Literal(v) => Ok(v.clone()),
        other => Err(EngineError::Unsupported(format!(
            "cannot evaluate expression '{}'",
            other
        ))),
    }
}

/// Three-valued comparison collapsed to bool: NULL on either side is false.
/// Numerics compare by value with int/float coercion. Strings compare
/// lexicographically. A string against a number never matches.
fn compare_values(left: &Value, op: CompareOp, right: &Value) -> bool {
    use std::cmp::Ordering;
    let ord = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return false,
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Str(_), _) | (_, Value::Str(_)) => return false,
        (a, b) => {
            let (Some(af), Some(bf)) = (a.as_f64(), b.as_f64()) else {
                return false;
            };
            match af.partial_cmp(&bf) {
                Some(ord) => ord,
                None => return false, // NaN
            }
        }
    };
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Ne => ord != Ordering::Equal,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Le => ord != Ordering::Greater,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Ge => ord != Ordering::Less,
    }
}

/// Running state for one aggregate expression within one group.
#[derive(Debug, Clone)]
struct AggState {
    count: u64,
    sum: f64,
    sum_is_int: bool,
    int_sum: i64,
    min: Option<Value>,
    max: Option<Value>,
}

impl AggState {
    fn new() -> Self {
        AggState {
            count: 0,
            sum: 0.0,
            sum_is_int: true,
            int_sum: 0,
            min: None,
            max: None,
        }
    }

    fn update(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        self.count += 1;
        match value {
            Value::Int(n) => {
                self.sum += *n as f64;
                self.int_sum = self.int_sum.wrapping_add(*n);
            }
            Value::Float(f) => {
                self.sum += f;
                self.sum_is_int = false;
            }
            _ => self.sum_is_int = false,
        }
        let better_min = self
            .min
            .as_ref()
            .is_none_or(|m| compare_for_sort(value, m).is_lt());
        if better_min {
            self.min = Some(value.clone());
        }
        let better_max = self
            .max
            .as_ref()
            .is_none_or(|m| compare_for_sort(value, m).is_gt());
        if better_max {
            self.max = Some(value.clone());
        }
    }

    fn finish(&self, func: AggFunc) -> Value {
        match func {
            AggFunc::Count => Value::Int(self.count as i64),
            AggFunc::Sum => {
                if self.count == 0 {
                    Value::Null
                } else if self.sum_is_int {
                    Value::Int(self.int_sum)
                } else {
                    Value::Float(self.sum)
                }
            }
            AggFunc::Avg => {
                if self.count == 0 {
                    Value::Null
                } else {
                    Value::Float(self.sum / self.count as f64)
                }
            }
            AggFunc::Min => self.min.clone().unwrap_or(Value::Null),
            AggFunc::Max => self.max.clone().unwrap_or(Value::Null),
        }
    }
}

fn aggregate(
    group_by: &[Expr],
    aggregates: &[(AggFunc, Expr)],
    frame: Frame,
) -> Result<Frame, EngineError> {
    let mut group_indices = Vec::with_capacity(group_by.len());
    let mut columns = Vec::new();
    for expr in group_by {
        match expr {
            Expr::Column(name) => {
                let idx = frame
                    .column_index(name)
                    .ok_or_else(|| EngineError::UnknownColumn(name.clone()))?;
                group_indices.push(idx);
                columns.push(frame.columns[idx].clone());
            }
            other => {
                return Err(EngineError::Unsupported(format!(
                    "GROUP BY expression '{}' not supported",
                    other
                )))
            }
        }
    }
    for (func, arg) in aggregates {
        columns.push(
            Expr::Aggregate {
                func: *func,
                arg: Box::new(arg.clone()),
            }
            .to_string(),
        );
        // Validate argument columns up front.
        if let Expr::Column(name) = arg {
            if frame.column_index(name).is_none() {
                return Err(EngineError::UnknownColumn(name.clone()));
            }
        }
    }

    // Groups keyed by rendered group values, first-seen order preserved.
    let mut order: Vec<Vec<Value>> = Vec::new();
    let mut groups: HashMap<Vec<String>, usize> = HashMap::new();
    let mut states: Vec<Vec<AggState>> = Vec::new();

    for row in &frame.rows {
        let key_values: Vec<Value> = group_indices.iter().map(|&i| row[i].clone()).collect();
        let key: Vec<String> = key_values.iter().map(|v| v.to_string()).collect();
        let slot = *groups.entry(key).or_insert_with(|| {
            order.push(key_values);
            states.push(vec![AggState::new(); aggregates.len()]);
            states.len() - 1
        });
        for (state, (func, arg)) in states[slot].iter_mut().zip(aggregates) {
            match arg {
                Expr::Wildcard => {
                    // COUNT(*) counts the row itself.
                    if *func == AggFunc::Count {
                        state.count += 1;
                    }
                }
                _ => {
                    let value = eval_scalar(arg, &frame.columns, row)?;
                    state.update(&value);
                }
            }
        }
    }

    // A grand aggregate over zero rows still yields one output row.
    if group_by.is_empty() && order.is_empty() {
        order.push(Vec::new());
        states.push(vec![AggState::new(); aggregates.len()]);
    }

    let rows = order
        .into_iter()
        .zip(states)
        .map(|(mut key_values, group_states)| {
            for (state, (func, _)) in group_states.iter().zip(aggregates) {
                key_values.push(state.finish(*func));
            }
            key_values
        })
        .collect();

    Ok(Frame { columns, rows })
}
