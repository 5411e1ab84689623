//! Verbatim SQL fragments.

use std::fmt;

/// A literal SQL fragment that is inlined into the statement text as-is.
///
/// Wherever a `Raw` appears in a value position (a `SET` right-hand side, a
/// condition right-hand side or a `VALUES` cell) it is written verbatim instead
/// of becoming a bound parameter. No escaping is performed: the caller is
/// responsible for the safety of the text.
///
/// # Example
/// ```ignore
/// query.update(["counters"]).set("hits", Raw::new("hits + 1"));
/// // UPDATE counters SET hits = hits + 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Raw(String);

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Raw(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shorthand for [`Raw::new`].
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw::new(sql)
}
