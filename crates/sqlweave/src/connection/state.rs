//! Open/closed transaction bookkeeping shared by connection implementations.

use crate::error::{WeaveError, WeaveResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a connection has an open transaction.
///
/// Each method takes the future that issues the control statement. The future
/// is only awaited when the state allows the transition, so a rejected call
/// never reaches the server.
#[derive(Debug, Default)]
pub struct TransactionState {
    active: AtomicBool,
}

impl TransactionState {
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Open a transaction. Nesting is an error; a failed `run` leaves the
    /// state closed.
    pub async fn begin(&self, run: impl Future<Output = WeaveResult<()>>) -> WeaveResult<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(WeaveError::Transaction(
                "a transaction is already active".to_string(),
            ));
        }
        if let Err(e) = run.await {
            self.active.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    pub async fn commit(&self, run: impl Future<Output = WeaveResult<()>>) -> WeaveResult<()> {
        self.close("commit", run).await
    }

    pub async fn rollback(&self, run: impl Future<Output = WeaveResult<()>>) -> WeaveResult<()> {
        self.close("roll back", run).await
    }

    // The state is closed even when `run` fails: the server ends the
    // transaction on a failed COMMIT or ROLLBACK.
    async fn close(
        &self,
        verb: &str,
        run: impl Future<Output = WeaveResult<()>>,
    ) -> WeaveResult<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(WeaveError::Transaction(format!(
                "there is no active transaction to {verb}"
            )));
        }
        run.await
    }
}
