//! Dialect registration.
//!
//! A dialect contributes two tables: the ordered clause list emitted for each
//! [`StatementKind`], and the handful of clause translators that differ from
//! the base grammar.

pub mod postgres;

use crate::error::WeaveError;
use crate::grammar::{Grammar, Translator};
use crate::parts::{Clause, StatementKind};
use std::fmt;
use std::str::FromStr;

/// Target database dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Dialect {
    #[default]
    Postgres,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
        }
    }

    /// Clauses emitted for `kind`, in emission order.
    pub fn clauses(self, kind: StatementKind) -> &'static [Clause] {
        match self {
            Dialect::Postgres => postgres::clauses(kind),
        }
    }

    /// Translators replacing the base grammar.
    pub fn overrides(self) -> &'static [(Clause, Translator)] {
        match self {
            Dialect::Postgres => postgres::OVERRIDES,
        }
    }

    /// The base grammar merged with this dialect's overrides.
    pub fn grammar(self) -> Grammar {
        Grammar::base().with_overrides(self.overrides())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = WeaveError;

    /// Accepts driver names as well as dialect names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pgsql" | "pdo_pgsql" | "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(WeaveError::config(format!("unsupported dialect '{other}'"))),
        }
    }
}
