//! Clause translation.
//!
//! A [`Grammar`] is a fixed table holding one [`Translator`] per [`Clause`].
//! The base table lives in [`base`]; a dialect builds its grammar by
//! replacing only the entries whose syntax differs, and every other clause
//! keeps the base translation.
//!
//! Translators are pure: they read clause data from [`Parts`] and return a
//! [`Fragment`] whose `?` placeholders line up one-to-one with its params.

pub mod base;


use crate::error::WeaveResult;
use crate::parts::{Clause, Parts};
use crate::value::Value;
use std::fmt;

/// Positional placeholder emitted for every bound parameter.
pub const PLACEHOLDER: &str = "?";

/// SQL text plus the parameters its placeholders bind to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A fragment without parameters.
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub(crate) fn push_str(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.sql.push_str(PLACEHOLDER);
        self.params.push(value);
        self
    }

    /// Append `?, ?, ...` for every value.
    pub(crate) fn push_bind_list(&mut self, values: &[Value]) -> &mut Self {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(value.clone());
        }
        self
    }
}

/// Translates one clause of [`Parts`] into SQL.
pub type Translator = fn(&Parts) -> WeaveResult<Fragment>;

/// A complete clause → translator table.
#[derive(Clone, Copy)]
pub struct Grammar {
    table: [Translator; Clause::COUNT],
}

impl Grammar {
    /// The dialect-neutral grammar.
    pub fn base() -> Self {
        Self {
            table: Clause::ALL.map(base::translator),
        }
    }

    /// Replace the translators named in `overrides`, keeping all others.
    pub fn with_overrides(mut self, overrides: &[(Clause, Translator)]) -> Self {
        for (clause, translator) in overrides {
            self.table[clause.index()] = *translator;
        }
        self
    }

    pub fn translate(&self, clause: Clause, parts: &Parts) -> WeaveResult<Fragment> {
        (self.table[clause.index()])(parts)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar").finish_non_exhaustive()
    }
}
