//! Fluent statement builder.
//!
//! A [`Builder`] accumulates clause data in [`Parts`] and compiles it with the
//! grammar of its connection's dialect. Calling `insert`/`delete`/`update`/
//! `select` also switches the statement kind; only the clauses registered for
//! the final kind are emitted.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::{Connection, Direction, Operator};
//!
//! let mut query = conn.create_query();
//! query
//!     .select(["id", "name"])
//!     .from(["users"])
//!     .where_("status", Operator::Eq, "active")
//!     .or_where("role", Operator::In, vec!["admin", "owner"])
//!     .order_by("id", Direction::Desc)
//!     .limit(20);
//!
//! let stmt = query.compile()?;
//! // SELECT id, name FROM users WHERE status = ? OR role IN (?, ?) ORDER BY id DESC LIMIT ?
//! let result = query.execute().await?;
//! ```

#[cfg(test)]
mod tests;

use crate::condition::{Connector, ConditionNode, Operator};
use crate::connection::{Connection, count_placeholders};
use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::grammar::base::CONSTRAINT;
use crate::grammar::Grammar;
use crate::parts::{Direction, Join, JoinKind, JoinOn, Parts, Row, StatementKind};
use crate::result::QueryResult;
use crate::value::{Operand, Value};

/// Output of compilation: SQL text with `?` placeholders and the values they
/// bind to, in textual order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl CompiledStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of `?` placeholders in the SQL text, ignoring quoted text,
    /// comments and `??` escapes.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Statement builder bound to one connection.
///
/// Setters take `&mut self`, so a builder can only be mutated from one place at
/// a time. Compilation never consumes or alters the accumulated parts.
pub struct Builder<'c, C: Connection> {
    conn: &'c C,
    dialect: Dialect,
    grammar: Grammar,
    kind: StatementKind,
    parts: Parts,
}

impl<'c, C: Connection> Builder<'c, C> {
    /// Create a SELECT builder using the connection's dialect.
    pub fn new(conn: &'c C) -> Self {
        let dialect = conn.dialect();
        Self {
            conn,
            dialect,
            grammar: dialect.grammar(),
            kind: StatementKind::default(),
            parts: Parts::default(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// `INSERT INTO table`; replaces any previous target.
    pub fn insert(&mut self, table: impl Into<String>) -> &mut Self {
        self.kind = StatementKind::Insert;
        self.parts.insert = Some(table.into());
        self
    }

    pub fn delete<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = StatementKind::Delete;
        self.parts.delete.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn update<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = StatementKind::Update;
        self.parts.update.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = StatementKind::Select;
        self.parts.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Append one row of column → value pairs.
    pub fn values<I, K, V>(&mut self, row: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        self.parts.values.push(collect_row(row));
        self
    }

    /// Append several rows. Every row must have the same columns.
    pub fn values_many<R, I, K, V>(&mut self, rows: R) -> &mut Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        self.parts.values.extend(rows.into_iter().map(collect_row));
        self
    }

    /// Set the conflict target, replacing any previous one.
    ///
    /// An empty target renders a bare `ON CONFLICT`; `["CONSTRAINT", name]`
    /// renders `ON CONFLICT ON CONSTRAINT name`; anything else is a column list.
    pub fn conflict<I, S>(&mut self, target: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.conflict = Some(target.into_iter().map(Into::into).collect());
        self
    }

    /// `ON CONFLICT ON CONSTRAINT name`
    pub fn on_constraint(&mut self, name: impl Into<String>) -> &mut Self {
        self.parts.conflict = Some(vec![CONSTRAINT.to_string(), name.into()]);
        self
    }

    /// `DO UPDATE` when `update` is true, `DO NOTHING` otherwise.
    pub fn do_action(&mut self, update: bool) -> &mut Self {
        self.parts.do_update = Some(update);
        self
    }

    pub fn do_update(&mut self) -> &mut Self {
        self.do_action(true)
    }

    pub fn do_nothing(&mut self) -> &mut Self {
        self.do_action(false)
    }

    pub fn using<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.using.extend(tables.into_iter().map(Into::into));
        self
    }

    /// `field = ?`, or `field = <raw>` for a [`Raw`](crate::Raw) value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Operand>) -> &mut Self {
        self.parts.set.push((field.into(), value.into()));
        self
    }

    pub fn set_many<I, K, V>(&mut self, assignments: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        self.parts.set.extend(
            assignments
                .into_iter()
                .map(|(field, value)| (field.into(), value.into())),
        );
        self
    }

    pub fn from<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.from.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn join(
        &mut self,
        table: impl Into<String>,
        on: impl Into<JoinOn>,
        kind: JoinKind,
    ) -> &mut Self {
        self.parts.join.push(Join {
            table: table.into(),
            on: on.into(),
            kind,
        });
        self
    }

    pub fn inner_join(&mut self, table: impl Into<String>, on: impl Into<JoinOn>) -> &mut Self {
        self.join(table, on, JoinKind::Inner)
    }

    pub fn left_join(&mut self, table: impl Into<String>, on: impl Into<JoinOn>) -> &mut Self {
        self.join(table, on, JoinKind::Left)
    }

    pub fn right_join(&mut self, table: impl Into<String>, on: impl Into<JoinOn>) -> &mut Self {
        self.join(table, on, JoinKind::Right)
    }

    // ==================== WHERE ====================

    /// `AND left op right`
    pub fn where_(
        &mut self,
        left: impl Into<String>,
        op: Operator,
        right: impl Into<Operand>,
    ) -> &mut Self {
        self.where_node(ConditionNode::compare(left, op, right))
    }

    /// `OR left op right`
    pub fn or_where(
        &mut self,
        left: impl Into<String>,
        op: Operator,
        right: impl Into<Operand>,
    ) -> &mut Self {
        self.where_node(ConditionNode::compare(left, op, right).or())
    }

    /// `AND <fragment>`, rendered verbatim.
    pub fn where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.where_node(ConditionNode::fragment(sql))
    }

    pub fn or_where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.where_node(ConditionNode::fragment(sql).or())
    }

    /// `AND (children...)`
    pub fn where_group(&mut self, children: impl IntoIterator<Item = ConditionNode>) -> &mut Self {
        self.where_node(ConditionNode::group(children))
    }

    /// `OR (children...)`
    pub fn or_where_group(
        &mut self,
        children: impl IntoIterator<Item = ConditionNode>,
    ) -> &mut Self {
        self.where_node(ConditionNode::group(children).with_connector(Connector::Or))
    }

    pub fn where_node(&mut self, node: ConditionNode) -> &mut Self {
        self.parts.conditions.push(node);
        self
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group_by<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.group_by.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn having(
        &mut self,
        left: impl Into<String>,
        op: Operator,
        right: impl Into<Operand>,
    ) -> &mut Self {
        self.having_node(ConditionNode::compare(left, op, right))
    }

    pub fn or_having(
        &mut self,
        left: impl Into<String>,
        op: Operator,
        right: impl Into<Operand>,
    ) -> &mut Self {
        self.having_node(ConditionNode::compare(left, op, right).or())
    }

    pub fn having_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.having_node(ConditionNode::fragment(sql))
    }

    pub fn having_group(&mut self, children: impl IntoIterator<Item = ConditionNode>) -> &mut Self {
        self.having_node(ConditionNode::group(children))
    }

    pub fn having_node(&mut self, node: ConditionNode) -> &mut Self {
        self.parts.having.push(node);
        self
    }

    // ==================== ORDER / PAGINATION ====================

    pub fn order_by(&mut self, field: impl Into<String>, direction: Direction) -> &mut Self {
        self.parts.order_by.push((field.into(), direction));
        self
    }

    pub fn order_by_many<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        self.parts.order_by.extend(
            fields
                .into_iter()
                .map(|(field, direction)| (field.into(), direction)),
        );
        self
    }

    /// Bound as a parameter; replaces any previous limit.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.parts.limit = Some(limit);
        self
    }

    /// Bound as a parameter; replaces any previous offset.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.parts.offset = Some(offset);
        self
    }

    pub fn returning<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts.returning.extend(fields.into_iter().map(Into::into));
        self
    }

    // ==================== Compile / execute ====================

    /// Compile the statement for the active kind.
    ///
    /// Clauses are emitted in the dialect's registered order, absent ones are
    /// skipped, fragments are joined with single spaces and parameters are
    /// flattened in the same order. Errors leave the parts untouched.
    pub fn compile(&self) -> WeaveResult<CompiledStatement> {
        let clauses = self.dialect.clauses(self.kind);

        for &required in self.kind.required_clauses() {
            if clauses.contains(&required) && !self.parts.is_present(required) {
                return Err(WeaveError::MissingClause {
                    kind: self.kind.as_str(),
                    clause: required.name(),
                });
            }
        }

        let mut statement = CompiledStatement::default();
        for &clause in clauses {
            if !self.parts.is_present(clause) {
                continue;
            }

            let fragment = self.grammar.translate(clause, &self.parts)?;
            if !statement.sql.is_empty() {
                statement.sql.push(' ');
            }
            statement.sql.push_str(&fragment.sql);
            statement.params.extend(fragment.params);
        }

        tracing::trace!(
            target: "sqlweave.compile",
            dialect = self.dialect.name(),
            kind = self.kind.as_str(),
            params = statement.params.len(),
            "compiled statement"
        );

        Ok(statement)
    }

    /// Compile and hand the statement to the bound connection once.
    ///
    /// The connection's result (or error) is returned unmodified.
    pub async fn execute(&self) -> WeaveResult<QueryResult> {
        let statement = self.compile()?;
        self.conn.execute(&statement.sql, &statement.params).await
    }

    /// Clear all clauses, keeping the statement kind and connection.
    pub fn reset(&mut self) -> &mut Self {
        self.parts = Parts::default();
        self
    }
}

impl<C: Connection> std::fmt::Debug for Builder<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("dialect", &self.dialect)
            .field("kind", &self.kind)
            .field("parts", &self.parts)
            .finish_non_exhaustive()
    }
}

fn collect_row<I, K, V>(row: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Operand>,
{
    row.into_iter()
        .map(|(column, value)| (column.into(), value.into()))
        .collect()
}
