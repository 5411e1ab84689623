//! Connection contract consumed by [`Builder`].
//!
//! A connection executes compiled `(sql, params)` pairs, exposes transaction
//! controls and manufactures builders for its dialect. The statement layer
//! never inspects, wraps or retries what the connection returns.

mod placeholder;
mod postgres;
mod state;


pub use placeholder::{count_placeholders, number_placeholders};
pub use postgres::PgConnection;
pub use state::TransactionState;

use crate::builder::Builder;
use crate::dialect::Dialect;
use crate::error::WeaveResult;
use crate::result::QueryResult;
use crate::value::Value;
use std::future::Future;

/// A database connection able to run compiled statements.
pub trait Connection: Sync {
    /// Dialect used by builders created for this connection.
    fn dialect(&self) -> Dialect;

    /// Execute SQL with `?` placeholders bound positionally to `params`.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = WeaveResult<QueryResult>> + Send;

    /// Whether a transaction is currently open.
    fn in_transaction(&self) -> bool;

    fn begin_transaction(&self) -> impl Future<Output = WeaveResult<()>> + Send;

    fn commit_transaction(&self) -> impl Future<Output = WeaveResult<()>> + Send;

    fn rollback_transaction(&self) -> impl Future<Output = WeaveResult<()>> + Send;

    /// Create an empty builder bound to this connection.
    fn create_query(&self) -> Builder<'_, Self>
    where
        Self: Sized,
    {
        Builder::new(self)
    }
}

/// Runs the given block inside a transaction on a [`Connection`].
///
/// - Begins a transaction via [`Connection::begin_transaction`].
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`.
///
/// The block must evaluate to `sqlweave::WeaveResult<T>`.
///
/// # Example
///
/// ```ignore
/// sqlweave::transaction!(&conn, {
///     let mut debit = conn.create_query();
///     debit
///         .update(["accounts"])
///         .set("balance", Raw::new("balance - 100"))
///         .where_("id", Operator::Eq, 1);
///     debit.execute().await?;
///     Ok::<(), WeaveError>(())
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($conn:expr, $body:block) => {{
        let __weave_conn = $conn;
        $crate::Connection::begin_transaction(__weave_conn).await?;

        let __weave_tx_body_result = async { $body }.await;
        match __weave_tx_body_result {
            Ok(value) => {
                $crate::Connection::commit_transaction(__weave_conn).await?;
                Ok(value)
            }
            Err(error) => match $crate::Connection::rollback_transaction(__weave_conn).await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::WeaveError::Transaction(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}
