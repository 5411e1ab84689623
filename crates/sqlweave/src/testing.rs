//! In-memory connection that records what it is asked to run.

use crate::connection::{Connection, TransactionState};
use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::result::QueryResult;
use crate::value::Value;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct RecordingConnection {
    pub executed: Mutex<Vec<(String, Vec<Value>)>>,
    pub events: Mutex<Vec<&'static str>>,
    pub response: QueryResult,
    pub fail_execute: bool,
    pub fail_begin: bool,
    transaction: TransactionState,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responding(response: QueryResult) -> Self {
        Self {
            response,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_execute: true,
            ..Self::default()
        }
    }

    /// A connection whose `BEGIN` is refused by the server.
    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    async fn control(&self, event: &'static str, fail: bool) -> WeaveResult<()> {
        self.events.lock().unwrap().push(event);
        if fail {
            return Err(WeaveError::Connection(format!("{event} refused")));
        }
        Ok(())
    }
}

impl Connection for RecordingConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> WeaveResult<QueryResult> {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.events.lock().unwrap().push("execute");
        if self.fail_execute {
            return Err(WeaveError::Connection("connection reset".to_string()));
        }
        Ok(self.response.clone())
    }

    fn in_transaction(&self) -> bool {
        self.transaction.is_active()
    }

    async fn begin_transaction(&self) -> WeaveResult<()> {
        self.transaction
            .begin(self.control("begin", self.fail_begin))
            .await
    }

    async fn commit_transaction(&self) -> WeaveResult<()> {
        self.transaction.commit(self.control("commit", false)).await
    }

    async fn rollback_transaction(&self) -> WeaveResult<()> {
        self.transaction.rollback(self.control("rollback", false)).await
    }
}
