//! Transaction gate.
//!
//! Holds at most one executed-but-uncommitted mutation until the operator
//! confirms (commit) or cancels (rollback) it.

use std::fmt;

use crate::db::HeldTransaction;
use crate::error::{PeekError, Result};
use tracing::{info, warn};

/// Query text and affected-row count of the change awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub query: String,
    pub rowcount: u64,
}

/// Observable gate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    PendingConfirmation(PendingChange),
}

enum Slot {
    Idle,
    PendingConfirmation {
        change: PendingChange,
        transaction: Box<dyn HeldTransaction>,
    },
}

/// Two-state machine: `Idle` and `PendingConfirmation`.
pub struct TransactionGate {
    slot: Slot,
}

impl Default for TransactionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionGate")
            .field("state", &self.state())
            .finish()
    }
}

impl TransactionGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self { slot: Slot::Idle }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> GateState {
        match &self.slot {
            Slot::Idle => GateState::Idle,
            Slot::PendingConfirmation { change, .. } => {
                GateState::PendingConfirmation(change.clone())
            }
        }
    }

    /// Returns true while a change awaits confirmation.
    pub fn is_pending(&self) -> bool {
        matches!(self.slot, Slot::PendingConfirmation { .. })
    }

    /// Returns the pending change, if any.
    pub fn pending(&self) -> Option<&PendingChange> {
        match &self.slot {
            Slot::Idle => None,
            Slot::PendingConfirmation { change, .. } => Some(change),
        }
    }

    /// `Idle -> PendingConfirmation`. If a change is already pending the new
    /// transaction is rolled back and an error returned; the held one is kept.
    pub async fn hold(
        &mut self,
        query: impl Into<String>,
        rowcount: u64,
        transaction: Box<dyn HeldTransaction>,
    ) -> Result<()> {
        if self.is_pending() {
            if let Err(e) = transaction.rollback().await {
                warn!("Rolling back rejected transaction failed: {e}");
            }
            return Err(PeekError::internal("A change is already awaiting confirmation"));
        }

        let change = PendingChange {
            query: query.into(),
            rowcount,
        };
        info!(rows = rowcount, "Holding transaction for confirmation");
        self.slot = Slot::PendingConfirmation {
            change,
            transaction,
        };
        Ok(())
    }

    /// `PendingConfirmation -> Idle` by commit. `None` when idle.
    ///
    /// The gate is idle afterwards even if the commit fails.
    pub async fn confirm(&mut self) -> Option<Result<PendingChange>> {
        let (change, transaction) = self.take()?;
        Some(match transaction.commit().await {
            Ok(()) => {
                info!(rows = change.rowcount, "Committed pending transaction");
                Ok(change)
            }
            Err(e) => {
                warn!("Commit failed: {e}");
                Err(e)
            }
        })
    }

    /// `PendingConfirmation -> Idle` by rollback. `None` when idle.
    pub async fn cancel(&mut self) -> Option<Result<PendingChange>> {
        let (change, transaction) = self.take()?;
        Some(match transaction.rollback().await {
            Ok(()) => {
                info!(rows = change.rowcount, "Rolled back pending transaction");
                Ok(change)
            }
            Err(e) => {
                warn!("Rollback failed: {e}");
                Err(e)
            }
        })
    }

    fn take(&mut self) -> Option<(PendingChange, Box<dyn HeldTransaction>)> {
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Idle => None,
            Slot::PendingConfirmation {
                change,
                transaction,
            } => Some((change, transaction)),
        }
    }
}
