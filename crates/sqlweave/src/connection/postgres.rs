//! PostgreSQL connection over `tokio-postgres`.

use super::Connection;
use super::placeholder::number_placeholders;
use super::state::TransactionState;
use crate::config::ConnectionConfig;
use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::result::{QueryResult, Record};
use crate::value::Value;
use futures_util::TryStreamExt;
use tokio_postgres::NoTls;

/// A single PostgreSQL connection.
///
/// Transactions are driven with plain `BEGIN`/`COMMIT`/`ROLLBACK` statements
/// on the shared client, so every builder created from this connection takes
/// part in the open transaction.
pub struct PgConnection {
    client: tokio_postgres::Client,
    transaction: TransactionState,
    max_sql_length: Option<usize>,
}

impl PgConnection {
    /// Connect using `config`; the connection driver runs on a spawned task.
    pub async fn connect(config: &ConnectionConfig) -> WeaveResult<Self> {
        let pg_config = config.to_pg_config()?;
        let (client, connection) = pg_config
            .connect(NoTls)
            .await
            .map_err(|e| WeaveError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "sqlweave.connection", error = %e, "connection task failed");
            }
        });

        tracing::debug!(
            target: "sqlweave.connection",
            host = config.host.as_deref().unwrap_or("-"),
            dbname = config.dbname.as_deref().unwrap_or("-"),
            "connected"
        );

        Ok(Self::from_client(client).max_sql_length(config.log_sql_max_length))
    }

    /// Wrap an already connected client.
    pub fn from_client(client: tokio_postgres::Client) -> Self {
        Self {
            client,
            transaction: TransactionState::new(),
            max_sql_length: Some(200),
        }
    }

    /// Truncate logged SQL to `len` bytes; `None` logs it in full.
    pub fn max_sql_length(mut self, len: Option<usize>) -> Self {
        self.max_sql_length = len;
        self
    }

    /// The underlying driver client.
    pub fn client(&self) -> &tokio_postgres::Client {
        &self.client
    }

    fn log_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    async fn control(&self, statement: &str) -> WeaveResult<()> {
        tracing::debug!(target: "sqlweave.sql", statement, "transaction control");
        self.client
            .batch_execute(statement)
            .await
            .map_err(WeaveError::from_db_error)
    }
}

impl Connection for PgConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> WeaveResult<QueryResult> {
        let sql = number_placeholders(sql);
        tracing::debug!(
            target: "sqlweave.sql",
            sql = %self.log_sql(&sql),
            params = params.len(),
            "executing statement"
        );

        let stream = self
            .client
            .query_raw(sql.as_str(), params.iter())
            .await
            .map_err(WeaveError::from_db_error)?;
        let mut stream = std::pin::pin!(stream);

        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await.map_err(WeaveError::from_db_error)? {
            rows.push(Record::from_row(&row)?);
        }

        let affected = stream.rows_affected().unwrap_or(rows.len() as u64);
        Ok(QueryResult::new(affected, rows))
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_active()
    }

    async fn begin_transaction(&self) -> WeaveResult<()> {
        self.transaction.begin(self.control("BEGIN")).await
    }

    async fn commit_transaction(&self) -> WeaveResult<()> {
        self.transaction.commit(self.control("COMMIT")).await
    }

    async fn rollback_transaction(&self) -> WeaveResult<()> {
        self.transaction.rollback(self.control("ROLLBACK")).await
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
