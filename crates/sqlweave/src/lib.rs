//! # sqlweave
//!
//! A fluent SQL statement builder with pluggable per-dialect grammars.
//!
//! ## Features
//!
//! - **Fluent builder**: accumulate clauses in any order, compile on demand
//! - **Pure grammar**: one translator per clause, dialects override only what differs
//! - **Bound by default**: every value becomes a `?` placeholder; [`Raw`] opts out
//! - **Upserts**: multi-row `INSERT ... VALUES`, `ON CONFLICT` targets and `DO UPDATE`/`DO NOTHING`
//! - **Nested predicates**: WHERE/HAVING groups recurse to any depth
//! - **PostgreSQL connection**: `tokio-postgres` execution with `?` → `$n` rewriting
//!
//! ## Builder
//!
//! ```ignore
//! use sqlweave::{Connection, ConnectionConfig, Operator, PgConnection, raw};
//!
//! let conn = PgConnection::connect(&ConnectionConfig::from_url(&url)?).await?;
//!
//! // INSERT ... ON CONFLICT (id) DO UPDATE SET ...
//! let mut upsert = conn.create_query();
//! upsert
//!     .insert("counters")
//!     .values([("id", 1), ("hits", 1)])
//!     .conflict(["id"])
//!     .do_update()
//!     .set("hits", raw("counters.hits + 1"))
//!     .returning(["hits"]);
//! let result = upsert.execute().await?;
//!
//! // SELECT
//! let mut users = conn.create_query();
//! users
//!     .select(["id", "name"])
//!     .from(["users"])
//!     .where_("status", Operator::Eq, "active")
//!     .limit(10);
//! let stmt = users.compile()?;
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT id, name FROM users WHERE status = ? LIMIT ?"
//! );
//! ```

pub mod builder;
pub mod condition;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod grammar;
pub mod parts;
pub mod raw;
pub mod result;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::{Builder, CompiledStatement};
pub use condition::{Condition, ConditionNode, Connector, Operator};
pub use config::ConnectionConfig;
pub use connection::{
    Connection, PgConnection, TransactionState, count_placeholders, number_placeholders,
};
pub use dialect::Dialect;
pub use error::{WeaveError, WeaveResult};
pub use grammar::{Fragment, Grammar, Translator};
pub use parts::{
    Clause, Direction, Join, JoinCondition, JoinKind, JoinOn, Parts, Row, StatementKind,
};
pub use raw::{Raw, raw};
pub use result::{FromRecord, QueryResult, Record};
pub use value::{FromValue, Operand, Value};
