//! PostgreSQL clause registration.

use crate::error::WeaveResult;
use crate::grammar::{Fragment, Translator};
use crate::parts::{Clause, Parts, StatementKind};

pub const INSERT: &[Clause] = &[
    Clause::Insert,
    Clause::Values,
    Clause::Conflict,
    Clause::Do,
    Clause::Set,
    Clause::Where,
    Clause::Returning,
];

pub const DELETE: &[Clause] = &[
    Clause::Delete,
    Clause::Using,
    Clause::Where,
    Clause::Returning,
];

pub const UPDATE: &[Clause] = &[
    Clause::Update,
    Clause::Set,
    Clause::From,
    Clause::Where,
    Clause::Returning,
];

pub const SELECT: &[Clause] = &[
    Clause::Select,
    Clause::From,
    Clause::Join,
    Clause::Where,
    Clause::GroupBy,
    Clause::Having,
    Clause::OrderBy,
    Clause::Limit,
    Clause::Offset,
];

pub static OVERRIDES: &[(Clause, Translator)] = &[(Clause::Delete, delete as Translator)];

pub fn clauses(kind: StatementKind) -> &'static [Clause] {
    match kind {
        StatementKind::Insert => INSERT,
        StatementKind::Delete => DELETE,
        StatementKind::Update => UPDATE,
        StatementKind::Select => SELECT,
    }
}

/// `DELETE FROM a, b`
pub fn delete(parts: &Parts) -> WeaveResult<Fragment> {
    Ok(Fragment::text(format!("DELETE FROM {}", parts.delete.join(", "))))
}
