//! Clause identifiers and the per-builder clause storage.

use crate::condition::{ConditionNode, Operator};
use crate::error::WeaveError;
use crate::value::Operand;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One row of an INSERT, keyed by column name.
///
/// The map is ordered, so every row enumerates its columns in the same
/// (lexicographic) order regardless of how it was built.
pub type Row = BTreeMap<String, Operand>;

/// A named clause category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Clause {
    Insert,
    Delete,
    Update,
    Select,
    Values,
    Conflict,
    Do,
    Using,
    Set,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Returning,
}

impl Clause {
    pub const COUNT: usize = 18;

    /// Every clause, in table order.
    pub const ALL: [Clause; Clause::COUNT] = [
        Clause::Insert,
        Clause::Delete,
        Clause::Update,
        Clause::Select,
        Clause::Values,
        Clause::Conflict,
        Clause::Do,
        Clause::Using,
        Clause::Set,
        Clause::From,
        Clause::Join,
        Clause::Where,
        Clause::GroupBy,
        Clause::Having,
        Clause::OrderBy,
        Clause::Limit,
        Clause::Offset,
        Clause::Returning,
    ];

    /// Position of this clause in translator tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Clause::Insert => "insert",
            Clause::Delete => "delete",
            Clause::Update => "update",
            Clause::Select => "select",
            Clause::Values => "values",
            Clause::Conflict => "conflict",
            Clause::Do => "do",
            Clause::Using => "using",
            Clause::Set => "set",
            Clause::From => "from",
            Clause::Join => "join",
            Clause::Where => "where",
            Clause::GroupBy => "group_by",
            Clause::Having => "having",
            Clause::OrderBy => "order_by",
            Clause::Limit => "limit",
            Clause::Offset => "offset",
            Clause::Returning => "returning",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The logical statement being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatementKind {
    Insert,
    Delete,
    Update,
    #[default]
    Select,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Delete => "DELETE",
            StatementKind::Update => "UPDATE",
            StatementKind::Select => "SELECT",
        }
    }

    /// Clauses this kind cannot be compiled without.
    pub fn required_clauses(self) -> &'static [Clause] {
        match self {
            StatementKind::Insert => &[Clause::Insert, Clause::Values],
            StatementKind::Delete => &[Clause::Delete],
            StatementKind::Update => &[Clause::Update, Clause::Set],
            StatementKind::Select => &[Clause::Select],
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

impl FromStr for JoinKind {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "RIGHT" => Ok(JoinKind::Right),
            other => Err(WeaveError::invalid_clause(
                "join",
                format!("unknown join kind '{other}'"),
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            other => Err(WeaveError::invalid_clause(
                "order_by",
                format!("unknown sort direction '{other}'"),
            )),
        }
    }
}

/// Column comparison used in a join condition; binds no parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub left: String,
    pub op: Operator,
    pub right: String,
}

impl JoinCondition {
    pub fn new(left: impl Into<String>, op: Operator, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            op,
            right: right.into(),
        }
    }
}

/// The `ON` part of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOn {
    /// Pre-composed condition text.
    Fragment(String),
    /// A single comparison.
    Compare(JoinCondition),
    /// Comparisons joined with `AND` (composite keys).
    All(Vec<JoinCondition>),
}

impl From<&str> for JoinOn {
    fn from(sql: &str) -> Self {
        JoinOn::Fragment(sql.to_string())
    }
}

impl From<String> for JoinOn {
    fn from(sql: String) -> Self {
        JoinOn::Fragment(sql)
    }
}

impl From<JoinCondition> for JoinOn {
    fn from(cond: JoinCondition) -> Self {
        JoinOn::Compare(cond)
    }
}

impl From<(&str, Operator, &str)> for JoinOn {
    fn from((left, op, right): (&str, Operator, &str)) -> Self {
        JoinOn::Compare(JoinCondition::new(left, op, right))
    }
}

impl From<Vec<JoinCondition>> for JoinOn {
    fn from(conds: Vec<JoinCondition>) -> Self {
        JoinOn::All(conds)
    }
}

impl<const N: usize> From<[(&str, Operator, &str); N]> for JoinOn {
    fn from(conds: [(&str, Operator, &str); N]) -> Self {
        JoinOn::All(
            conds
                .into_iter()
                .map(|(left, op, right)| JoinCondition::new(left, op, right))
                .collect(),
        )
    }
}

/// One joined table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub on: JoinOn,
    pub kind: JoinKind,
}

/// Accumulated clause data of one builder.
///
/// List-valued clauses are present when non-empty; optional ones when `Some`.
/// The conflict target is optional rather than list-valued so that an empty
/// target (a bare `ON CONFLICT`) is still a present clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parts {
    pub insert: Option<String>,
    pub delete: Vec<String>,
    pub update: Vec<String>,
    pub select: Vec<String>,
    pub values: Vec<Row>,
    pub conflict: Option<Vec<String>>,
    pub do_update: Option<bool>,
    pub using: Vec<String>,
    pub set: Vec<(String, Operand)>,
    pub from: Vec<String>,
    pub join: Vec<Join>,
    pub conditions: Vec<ConditionNode>,
    pub group_by: Vec<String>,
    pub having: Vec<ConditionNode>,
    pub order_by: Vec<(String, Direction)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub returning: Vec<String>,
}

impl Parts {
    pub fn is_present(&self, clause: Clause) -> bool {
        match clause {
            Clause::Insert => self.insert.is_some(),
            Clause::Delete => !self.delete.is_empty(),
            Clause::Update => !self.update.is_empty(),
            Clause::Select => !self.select.is_empty(),
            Clause::Values => !self.values.is_empty(),
            Clause::Conflict => self.conflict.is_some(),
            Clause::Do => self.do_update.is_some(),
            Clause::Using => !self.using.is_empty(),
            Clause::Set => !self.set.is_empty(),
            Clause::From => !self.from.is_empty(),
            Clause::Join => !self.join.is_empty(),
            Clause::Where => !self.conditions.is_empty(),
            Clause::GroupBy => !self.group_by.is_empty(),
            Clause::Having => !self.having.is_empty(),
            Clause::OrderBy => !self.order_by.is_empty(),
            Clause::Limit => self.limit.is_some(),
            Clause::Offset => self.offset.is_some(),
            Clause::Returning => !self.returning.is_empty(),
        }
    }

    /// Whether every clause is absent.
    pub fn is_empty(&self) -> bool {
        !Clause::ALL.iter().any(|clause| self.is_present(*clause))
    }
}
