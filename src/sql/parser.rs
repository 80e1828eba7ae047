//! SQL parser wrapping `sqlparser-rs` for the supported SELECT subset.
//!
//! Converts a SQL string into our `LogicalPlan` representation. Only a subset
//! of SQL is supported -- see the module-level doc for `sql`.

use sqlparser::ast::{
    self as sp, Expr as SpExpr, FunctionArg, FunctionArgExpr, GroupByExpr, SelectItem, SetExpr,
    Statement, TableFactor,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::logical_plan::LogicalPlan;
use super::types::{AggFunc, CompareOp, Expr, LogicalOp, Value};

/// Errors that can occur during SQL parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// sqlparser returned an error.
    #[error("SQL parse error: {0}")]
    SqlParser(String),
    /// The SQL statement is not a SELECT query.
    #[error("only SELECT statements are supported")]
    NotASelect,
    /// Unsupported SQL feature.
    #[error("unsupported SQL: {0}")]
    Unsupported(String),
    /// Missing FROM clause.
    #[error("missing FROM clause")]
    MissingFrom,
}

/// Parse a SQL query string into a LogicalPlan.
///
/// Only SELECT statements are supported. The parser handles:
/// - Column references and wildcards
/// - Aggregate functions: COUNT, SUM, AVG, MIN, MAX (including COUNT(*))
/// - WHERE with comparison predicates and AND/OR compounds
/// - GROUP BY column list
/// - ORDER BY column ASC/DESC
/// - LIMIT integer
pub fn parse_query(sql: &str) -> Result<LogicalPlan, ParseError> {
    let dialect = GenericDialect {};
    let statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| ParseError::SqlParser(e.to_string()))?;

    if statements.len() != 1 {
        return Err(ParseError::Unsupported(format!(
            "expected exactly one statement, got {}",
            statements.len()
        )));
    }

    let statement = &statements[0];
    match statement {
        Statement::Query(query) => convert_query(query),
        _ => Err(ParseError::NotASelect),
    }
}

/// Convert a sqlparser Query to our LogicalPlan.
fn convert_query(query: &sp::Query) -> Result<LogicalPlan, ParseError> {
    let body = query.body.as_ref();

    let select = match body {
        SetExpr::Select(select) => select.as_ref(),
        _ => {
            return Err(ParseError::Unsupported(
                "only simple SELECT queries are supported (no UNION, INTERSECT, etc.)".into(),
            ))
        }
    };

    // 1. FROM clause -> Scan node
    let table_name = extract_table_name(select)?;
    let mut plan = LogicalPlan::Scan { table: table_name };

    // 2. WHERE clause -> Filter node
    if let Some(selection) = &select.selection {
        let predicate = convert_expr(selection)?;
        plan = LogicalPlan::Filter {
            predicate,
            input: Box::new(plan),
        };
    }

    // 3. Analyze SELECT items for aggregates and column references
    let (select_exprs, has_aggregates) = convert_select_items(&select.projection)?;

    // 4. GROUP BY -> Aggregate node (or implicit aggregation if agg functions present)
    let group_by_exprs = convert_group_by(&select.group_by)?;

    if has_aggregates || !group_by_exprs.is_empty() {
        let mut aggregates = Vec::new();
        for expr in &select_exprs {
            collect_aggregates(expr, &mut aggregates);
        }

        plan = LogicalPlan::Aggregate {
            group_by: group_by_exprs,
            aggregates,
            input: Box::new(plan),
        };
    } else {
        // Non-aggregate query: add Projection if not just *
        let has_wildcard = select_exprs.iter().any(|e| matches!(e, Expr::Wildcard));
        if !has_wildcard {
            plan = LogicalPlan::Projection {
                columns: select_exprs.clone(),
                input: Box::new(plan),
            };
        }
    }

    // 5. ORDER BY -> Sort node
    if let Some(order_by) = &query.order_by {
        let sp::OrderBy { exprs, .. } = order_by;
        if !exprs.is_empty() {
            let order_exprs = exprs
                .iter()
                .map(|o| {
                    let expr = convert_expr(&o.expr)?;
                    let asc = o.asc.unwrap_or(true);
                    Ok((expr, asc))
                })
                .collect::<Result<Vec<_>, _>>()?;

            plan = LogicalPlan::Sort {
                order_by: order_exprs,
                input: Box::new(plan),
            };
        }
    }

    // 6. LIMIT -> Limit node
    if let Some(limit_expr) = &query.limit {
        let count = extract_limit_value(limit_expr)?;
        plan = LogicalPlan::Limit {
            count,
            input: Box::new(plan),
        };
    }

    Ok(plan)
}

/// Extract the single table name from the FROM clause.
fn extract_table_name(select: &sp::Select) -> Result<String, ParseError> {
    if select.from.is_empty() {
        return Err(ParseError::MissingFrom);
    }
    if select.from.len() > 1 {
        return Err(ParseError::Unsupported(
            "multiple FROM tables (joins) not supported".into(),
        ));
    }

    let table_with_joins = &select.from[0];
    if !table_with_joins.joins.is_empty() {
        return Err(ParseError::Unsupported("JOINs not supported".into()));
    }

    match &table_with_joins.relation {
        TableFactor::Table { name, .. } => {
            let parts: Vec<String> = name.0.iter().map(|ident| ident.value.clone()).collect();
            Ok(parts.join("."))
        }
        _ => Err(ParseError::Unsupported(
            "only simple table references are supported in FROM".into(),
        )),
    }
}

/// Convert SELECT items to our Expr types, also detecting if aggregates are present.
fn convert_select_items(items: &[SelectItem]) -> Result<(Vec<Expr>, bool), ParseError> {
    let mut exprs = Vec::new();
    let mut has_aggregates = false;

    for item in items {
        match item {
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                let converted = convert_expr(expr)?;
                if contains_aggregate(&converted) {
                    has_aggregates = true;
                }
                exprs.push(converted);
            }
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _) => {
                exprs.push(Expr::Wildcard);
            }
        }
    }

    Ok((exprs, has_aggregates))
}

/// Check if an expression contains any aggregate function calls.
fn contains_aggregate(expr: &Expr) -> bool {
    match expr {
        Expr::Aggregate { .. } => true,
        Expr::BinaryOp { left, right, .. } => contains_aggregate(left) || contains_aggregate(right),
        Expr::Compound { left, right, .. } => contains_aggregate(left) || contains_aggregate(right),
        _ => false,
    }
}

/// Collect (AggFunc, arg) pairs from an expression tree.
fn collect_aggregates(expr: &Expr, out: &mut Vec<(AggFunc, Expr)>) {
    match expr {
        Expr::Aggregate { func, arg } => {
            out.push((*func, arg.as_ref().clone()));
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_aggregates(left, out);
            collect_aggregates(right, out);
        }
        Expr::Compound { left, right, .. } => {
            collect_aggregates(left, out);
            collect_aggregates(right, out);
        }
        _ => {}
    }
}

/// Convert GROUP BY clause to our Expr types.
fn convert_group_by(group_by: &GroupByExpr) -> Result<Vec<Expr>, ParseError> {
    match group_by {
        GroupByExpr::All(_) => Err(ParseError::Unsupported("GROUP BY ALL not supported".into())),
        GroupByExpr::Expressions(exprs, _modifiers) => exprs.iter().map(convert_expr).collect(),
    }
}

/// Convert a sqlparser expression to our Expr type.
fn convert_expr(expr: &SpExpr) -> Result<Expr, ParseError> {
    match expr {
        SpExpr::Identifier(ident) => Ok(Expr::Column(ident.value.clone())),

        // Compound identifier (e.g., data.col): use the last part
        SpExpr::CompoundIdentifier(parts) => {
            let name = parts
                .last()
                .map(|i| i.value.clone())
                .ok_or_else(|| ParseError::Unsupported("empty compound identifier".into()))?;
            Ok(Expr::Column(name))
        }

        SpExpr::Value(val) => convert_value(val),

        // Unary minus (negative numbers)
        SpExpr::UnaryOp {
            op: sp::UnaryOperator::Minus,
            expr: inner,
        } => {
            let inner_val = convert_expr(inner)?;
            match inner_val {
                Expr::Literal(Value::Int(n)) => Ok(Expr::Literal(Value::Int(-n))),
                Expr::Literal(Value::Float(n)) => Ok(Expr::Literal(Value::Float(-n))),
                _ => Err(ParseError::Unsupported(
                    "unary minus only supported on numeric literals".into(),
                )),
            }
        }

        SpExpr::BinaryOp { left, op, right } => match op {
            sp::BinaryOperator::And => {
                let l = convert_expr(left)?;
                let r = convert_expr(right)?;
                Ok(Expr::Compound {
                    left: Box::new(l),
                    op: LogicalOp::And,
                    right: Box::new(r),
                })
            }
            sp::BinaryOperator::Or => {
                let l = convert_expr(left)?;
                let r = convert_expr(right)?;
                Ok(Expr::Compound {
                    left: Box::new(l),
                    op: LogicalOp::Or,
                    right: Box::new(r),
                })
            }
            _ => {
                let compare_op = convert_binop(op)?;
                let l = convert_expr(left)?;
                let r = convert_expr(right)?;
                Ok(Expr::BinaryOp {
                    left: Box::new(l),
                    op: compare_op,
                    right: Box::new(r),
                })
            }
        },

        SpExpr::Function(func) => convert_function(func),

        SpExpr::Nested(inner) => convert_expr(inner),

        _ => Err(ParseError::Unsupported(format!(
            "expression type not supported: {:?}",
            std::mem::discriminant(expr)
        ))),
    }
}

/// Convert a sqlparser Value to our Value type.
fn convert_value(val: &sp::Value) -> Result<Expr, ParseError> {
    match val {
        sp::Value::Number(s, _) => {
            if let Ok(i) = s.parse::<i64>() {
                Ok(Expr::Literal(Value::Int(i)))
            } else if let Ok(f) = s.parse::<f64>() {
                Ok(Expr::Literal(Value::Float(f)))
            } else {
                Err(ParseError::Unsupported(format!(
                    "cannot parse number: {}",
                    s
                )))
            }
        }
        sp::Value::SingleQuotedString(s) => Ok(Expr::Literal(Value::Str(s.clone()))),
        sp::Value::DoubleQuotedString(s) => Ok(Expr::Literal(Value::Str(s.clone()))),
        sp::Value::Null => Ok(Expr::Literal(Value::Null)),
        sp::Value::Boolean(b) => Ok(Expr::Literal(Value::Int(if *b { 1 } else { 0 }))),
        _ => Err(ParseError::Unsupported(format!(
            "value type not supported: {:?}",
            val
        ))),
    }
}

/// Convert a sqlparser binary operator to our CompareOp.
fn convert_binop(op: &sp::BinaryOperator) -> Result<CompareOp, ParseError> {
    match op {
        sp::BinaryOperator::Eq => Ok(CompareOp::Eq),
        sp::BinaryOperator::NotEq => Ok(CompareOp::Ne),
        sp::BinaryOperator::Lt => Ok(CompareOp::Lt),
        sp::BinaryOperator::LtEq => Ok(CompareOp::Le),
        sp::BinaryOperator::Gt => Ok(CompareOp::Gt),
        sp::BinaryOperator::GtEq => Ok(CompareOp::Ge),
        _ => Err(ParseError::Unsupported(format!(
            "binary operator not supported: {:?}",
            op
        ))),
    }
}

/// Convert a sqlparser Function to our aggregate Expr.
fn convert_function(func: &sp::Function) -> Result<Expr, ParseError> {
    let name = func
        .name
        .0
        .iter()
        .map(|i| i.value.to_uppercase())
        .collect::<Vec<_>>()
        .join(".");

    let agg_func = match name.as_str() {
        "COUNT" => AggFunc::Count,
        "SUM" => AggFunc::Sum,
        "AVG" => AggFunc::Avg,
        "MIN" => AggFunc::Min,
        "MAX" => AggFunc::Max,
        _ => {
            return Err(ParseError::Unsupported(format!(
                "function not supported: {}",
                name
            )))
        }
    };

    let args = match &func.args {
        sp::FunctionArguments::None => vec![],
        sp::FunctionArguments::Subquery(_) => {
            return Err(ParseError::Unsupported(
                "subquery arguments not supported".into(),
            ));
        }
        sp::FunctionArguments::List(arg_list) => arg_list.args.clone(),
    };

    let arg_expr = if args.is_empty() {
        // COUNT() with no args -> treat as COUNT(*)
        Expr::Wildcard
    } else if args.len() == 1 {
        match &args[0] {
            FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => Expr::Wildcard,
            FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => convert_expr(expr)?,
            FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(_)) => Expr::Wildcard,
            FunctionArg::Named { arg, .. } => match arg {
                FunctionArgExpr::Wildcard => Expr::Wildcard,
                FunctionArgExpr::Expr(expr) => convert_expr(expr)?,
                FunctionArgExpr::QualifiedWildcard(_) => Expr::Wildcard,
            },
        }
    } else {
        return Err(ParseError::Unsupported(format!(
            "aggregate function with {} arguments not supported",
            args.len()
        )));
    };

    Ok(Expr::Aggregate {
        func: agg_func,
        arg: Box::new(arg_expr),
    })
}

/// Extract a LIMIT value from a sqlparser expression.
fn extract_limit_value(expr: &SpExpr) -> Result<usize, ParseError> {
    match expr {
        SpExpr::Value(sp::Value::Number(s, _)) => s
            .parse::<usize>()
            .map_err(|_| ParseError::Unsupported(format!("invalid LIMIT value: {}", s))),
        _ => Err(ParseError::Unsupported(
            "LIMIT must be a literal integer".into(),
        )),
    }
}
