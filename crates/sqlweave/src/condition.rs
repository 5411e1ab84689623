//! Predicate trees for WHERE and HAVING clauses.
//!
//! A clause holds an ordered list of [`ConditionNode`]s. Every node carries the
//! [`Connector`] that joins it to its predecessor; the connector of the first
//! node in a list is never rendered.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::{ConditionNode, Operator};
//!
//! // a = ? AND (b = ? OR c IN (?, ?))
//! let nodes = vec![
//!     ConditionNode::compare("a", Operator::Eq, 1),
//!     ConditionNode::group([
//!         ConditionNode::compare("b", Operator::Eq, 2),
//!         ConditionNode::compare("c", Operator::In, vec![3, 4]).or(),
//!     ]),
//! ];
//! ```

use crate::error::WeaveError;
use crate::value::Operand;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `IN`, the right-hand side expands to one placeholder per element
    In,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim() {
            "=" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            other if other.eq_ignore_ascii_case("LIKE") => Operator::Like,
            other if other.eq_ignore_ascii_case("IN") => Operator::In,
            other => {
                return Err(WeaveError::invalid_clause(
                    "condition",
                    format!("unknown operator '{other}'"),
                ));
            }
        };
        Ok(op)
    }
}

/// Boolean connector placed before a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("AND") {
            Ok(Connector::And)
        } else if s.eq_ignore_ascii_case("OR") {
            Ok(Connector::Or)
        } else {
            Err(WeaveError::invalid_clause(
                "condition",
                format!("unknown connector '{s}'"),
            ))
        }
    }
}

/// The predicate carried by a [`ConditionNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `left op right`
    Compare {
        left: String,
        op: Operator,
        right: Operand,
    },
    /// A pre-composed boolean fragment, rendered verbatim without parameters.
    Fragment(String),
    /// A parenthesized list of child nodes.
    Group(Vec<ConditionNode>),
}

/// One element of a WHERE/HAVING list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub connector: Connector,
    pub condition: Condition,
}

impl ConditionNode {
    /// `left op right`, joined with `AND`.
    pub fn compare(left: impl Into<String>, op: Operator, right: impl Into<Operand>) -> Self {
        Self {
            connector: Connector::And,
            condition: Condition::Compare {
                left: left.into(),
                op,
                right: right.into(),
            },
        }
    }

    /// A verbatim boolean fragment such as `deleted_at IS NULL`.
    pub fn fragment(sql: impl Into<String>) -> Self {
        Self {
            connector: Connector::And,
            condition: Condition::Fragment(sql.into()),
        }
    }

    /// A parenthesized group of child nodes.
    pub fn group(children: impl IntoIterator<Item = ConditionNode>) -> Self {
        Self {
            connector: Connector::And,
            condition: Condition::Group(children.into_iter().collect()),
        }
    }

    /// Join this node to its predecessor with `AND`.
    pub fn and(self) -> Self {
        self.with_connector(Connector::And)
    }

    /// Join this node to its predecessor with `OR`.
    pub fn or(self) -> Self {
        self.with_connector(Connector::Or)
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }
}
