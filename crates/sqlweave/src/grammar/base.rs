//! Dialect-neutral clause translations.

use super::{Fragment, Translator};
use crate::condition::{Condition, ConditionNode, Operator};
use crate::error::{WeaveError, WeaveResult};
use crate::parts::{Clause, Direction, Join, JoinCondition, JoinOn, Parts, Row};
use crate::value::{Operand, Value};

/// Conflict-target sentinel selecting `ON CONFLICT ON CONSTRAINT <name>`.
pub const CONSTRAINT: &str = "CONSTRAINT";

/// Base translator for `clause`.
pub fn translator(clause: Clause) -> Translator {
    match clause {
        Clause::Insert => |p: &Parts| Ok(Fragment::text(insert(p.insert.as_deref().unwrap_or_default()))),
        Clause::Delete => |p: &Parts| Ok(Fragment::text(delete(&p.delete))),
        Clause::Update => |p: &Parts| Ok(Fragment::text(update(&p.update))),
        Clause::Select => |p: &Parts| Ok(Fragment::text(select(&p.select))),
        Clause::Values => |p: &Parts| values(&p.values),
        Clause::Conflict => |p: &Parts| conflict(p.conflict.as_deref().unwrap_or_default()).map(Fragment::text),
        Clause::Do => |p: &Parts| Ok(Fragment::text(do_action(p.do_update.unwrap_or(true)))),
        Clause::Using => |p: &Parts| Ok(Fragment::text(using(&p.using))),
        Clause::Set => |p: &Parts| set(&p.set),
        Clause::From => |p: &Parts| Ok(Fragment::text(from(&p.from))),
        Clause::Join => |p: &Parts| join(&p.join).map(Fragment::text),
        Clause::Where => |p: &Parts| where_clause(&p.conditions),
        Clause::GroupBy => |p: &Parts| Ok(Fragment::text(group_by(&p.group_by))),
        Clause::Having => |p: &Parts| having(&p.having),
        Clause::OrderBy => |p: &Parts| Ok(Fragment::text(order_by(&p.order_by))),
        Clause::Limit => |p: &Parts| limit(p.limit.unwrap_or_default()),
        Clause::Offset => |p: &Parts| offset(p.offset.unwrap_or_default()),
        Clause::Returning => |p: &Parts| Ok(Fragment::text(returning(&p.returning))),
    }
}

pub fn insert(table: &str) -> String {
    format!("INSERT INTO {table}")
}

pub fn delete(tables: &[String]) -> String {
    format!("DELETE {}", tables.join(", "))
}

pub fn update(tables: &[String]) -> String {
    format!("UPDATE {}", tables.join(", "))
}

pub fn select(fields: &[String]) -> String {
    format!("SELECT {}", fields.join(", "))
}

/// `(a, b) VALUES (?, ?), (?, ?)`
///
/// Columns come from the first row; every other row must have exactly the
/// same column set. Rows iterate their columns lexicographically, so the
/// placeholders of each row line up with the column list.
pub fn values(rows: &[Row]) -> WeaveResult<Fragment> {
    let Some(first) = rows.first() else {
        return Err(WeaveError::invalid_clause("values", "no rows to insert"));
    };
    if first.is_empty() {
        return Err(WeaveError::invalid_clause("values", "row 0 has no columns"));
    }

    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let mut out = Fragment::text(format!("({}) VALUES ", columns.join(", ")));

    for (index, row) in rows.iter().enumerate() {
        if !row.keys().eq(first.keys()) {
            let found: Vec<&str> = row.keys().map(String::as_str).collect();
            return Err(WeaveError::invalid_clause(
                "values",
                format!(
                    "row {index} has columns ({}) but row 0 has ({})",
                    found.join(", "),
                    columns.join(", ")
                ),
            ));
        }

        if index > 0 {
            out.push_str(", ");
        }
        out.push_str("(");
        for (i, (column, cell)) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match cell {
                Operand::Value(value) => {
                    out.push_bind(value.clone());
                }
                Operand::Raw(raw) => {
                    out.push_str(raw.as_str());
                }
                Operand::List(_) => {
                    return Err(WeaveError::invalid_clause(
                        "values",
                        format!("column '{column}' holds a list; only scalars can be inserted"),
                    ));
                }
            }
        }
        out.push_str(")");
    }

    Ok(out)
}

/// `ON CONFLICT`, `ON CONFLICT (a, b)` or `ON CONFLICT ON CONSTRAINT name`.
///
/// Empty strings in the target are ignored, so `[""]` is a bare conflict.
pub fn conflict(target: &[String]) -> WeaveResult<String> {
    let target: Vec<&str> = target
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();

    if target.is_empty() {
        return Ok("ON CONFLICT".to_string());
    }

    if target.iter().any(|t| t.eq_ignore_ascii_case(CONSTRAINT)) {
        let names: Vec<&str> = target
            .iter()
            .copied()
            .filter(|t| !t.eq_ignore_ascii_case(CONSTRAINT))
            .collect();
        return match names.as_slice() {
            [name] => Ok(format!("ON CONFLICT ON CONSTRAINT {name}")),
            [] => Err(WeaveError::invalid_clause(
                "conflict",
                "constraint target is missing the constraint name",
            )),
            _ => Err(WeaveError::invalid_clause(
                "conflict",
                format!("constraint target expects one name, got ({})", names.join(", ")),
            )),
        };
    }

    Ok(format!("ON CONFLICT ({})", target.join(", ")))
}

pub fn do_action(update: bool) -> String {
    if update {
        "DO UPDATE".to_string()
    } else {
        "DO NOTHING".to_string()
    }
}

pub fn using(tables: &[String]) -> String {
    format!("USING {}", tables.join(", "))
}

/// `SET a = ?, b = <raw>`
pub fn set(assignments: &[(String, Operand)]) -> WeaveResult<Fragment> {
    let mut out = Fragment::text("SET ");
    for (i, (field, value)) in assignments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(field).push_str(" = ");
        match value {
            Operand::Value(value) => {
                out.push_bind(value.clone());
            }
            Operand::Raw(raw) => {
                out.push_str(raw.as_str());
            }
            Operand::List(_) => {
                return Err(WeaveError::invalid_clause(
                    "set",
                    format!("field '{field}' is assigned a list"),
                ));
            }
        }
    }
    Ok(out)
}

pub fn from(tables: &[String]) -> String {
    format!("FROM {}", tables.join(", "))
}

/// `INNER JOIN t ON a = b LEFT JOIN u ON c = d AND e = f`
pub fn join(joins: &[Join]) -> WeaveResult<String> {
    let mut statement = Vec::with_capacity(joins.len());
    for join in joins {
        let on = match &join.on {
            JoinOn::Fragment(sql) => sql.clone(),
            JoinOn::Compare(cond) => join_condition(cond)?,
            JoinOn::All(conds) => {
                if conds.is_empty() {
                    return Err(WeaveError::invalid_clause(
                        "join",
                        format!("join on '{}' has no conditions", join.table),
                    ));
                }
                let rendered = conds
                    .iter()
                    .map(join_condition)
                    .collect::<WeaveResult<Vec<_>>>()?;
                rendered.join(" AND ")
            }
        };
        statement.push(format!("{} JOIN {} ON {}", join.kind.as_str(), join.table, on));
    }
    Ok(statement.join(" "))
}

fn join_condition(cond: &JoinCondition) -> WeaveResult<String> {
    if cond.op == Operator::In {
        return Err(WeaveError::invalid_clause(
            "join",
            format!("IN cannot compare columns '{}' and '{}'", cond.left, cond.right),
        ));
    }
    Ok(format!("{} {} {}", cond.left, cond.op, cond.right))
}

pub fn where_clause(nodes: &[ConditionNode]) -> WeaveResult<Fragment> {
    prefixed("where", "WHERE ", nodes)
}

pub fn having(nodes: &[ConditionNode]) -> WeaveResult<Fragment> {
    prefixed("having", "HAVING ", nodes)
}

fn prefixed(clause: &'static str, keyword: &str, nodes: &[ConditionNode]) -> WeaveResult<Fragment> {
    if nodes.is_empty() {
        return Err(WeaveError::invalid_clause(clause, "no conditions"));
    }
    let mut out = Fragment::text(keyword);
    conditions(clause, nodes, &mut out)?;
    Ok(out)
}

/// Render a condition list without keyword.
///
/// Child groups recurse and are wrapped in parentheses; their parameters are
/// appended in the order their placeholders appear.
pub fn conditions(
    clause: &'static str,
    nodes: &[ConditionNode],
    out: &mut Fragment,
) -> WeaveResult<()> {
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            out.push_str(" ").push_str(node.connector.as_str()).push_str(" ");
        }

        match &node.condition {
            Condition::Group(children) => {
                if children.is_empty() {
                    return Err(WeaveError::invalid_clause(clause, "empty condition group"));
                }
                out.push_str("(");
                conditions(clause, children, out)?;
                out.push_str(")");
            }
            Condition::Fragment(sql) => {
                out.push_str(sql);
            }
            Condition::Compare { left, op, right } => {
                compare(clause, left, *op, right, out)?;
            }
        }
    }
    Ok(())
}

fn compare(
    clause: &'static str,
    left: &str,
    op: Operator,
    right: &Operand,
    out: &mut Fragment,
) -> WeaveResult<()> {
    out.push_str(left).push_str(" ").push_str(op.as_str()).push_str(" ");

    match (op, right) {
        (_, Operand::Raw(raw)) => {
            out.push_str(raw.as_str());
        }
        (Operator::In, Operand::List(values)) => {
            if values.is_empty() {
                return Err(WeaveError::invalid_clause(
                    clause,
                    format!("IN list for '{left}' is empty"),
                ));
            }
            out.push_str("(").push_bind_list(values).push_str(")");
        }
        (Operator::In, Operand::Value(_)) => {
            return Err(WeaveError::invalid_clause(
                clause,
                format!("IN for '{left}' requires a list"),
            ));
        }
        (op, Operand::List(_)) => {
            return Err(WeaveError::invalid_clause(
                clause,
                format!("operator {op} for '{left}' cannot take a list"),
            ));
        }
        (_, Operand::Value(value)) => {
            out.push_bind(value.clone());
        }
    }
    Ok(())
}

pub fn group_by(fields: &[String]) -> String {
    format!("GROUP BY {}", fields.join(", "))
}

pub fn order_by(fields: &[(String, Direction)]) -> String {
    let statement: Vec<String> = fields
        .iter()
        .map(|(field, direction)| format!("{field} {}", direction.as_str()))
        .collect();
    format!("ORDER BY {}", statement.join(", "))
}

/// Always bound, never inlined.
pub fn limit(limit: u64) -> WeaveResult<Fragment> {
    Ok(Fragment::new("LIMIT ?", vec![row_count("limit", limit)?]))
}

/// Always bound, never inlined.
pub fn offset(offset: u64) -> WeaveResult<Fragment> {
    Ok(Fragment::new("OFFSET ?", vec![row_count("offset", offset)?]))
}

fn row_count(clause: &'static str, n: u64) -> WeaveResult<Value> {
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| WeaveError::invalid_clause(clause, format!("{n} exceeds the bigint range")))
}

pub fn returning(fields: &[String]) -> String {
    format!("RETURNING {}", fields.join(", "))
}
