//! Scoped transactions
//!
//! [`TransactionScope`] owns one [`Transaction`] for the length of one unit of
//! work and guarantees it is finalized exactly once:
//!
//! ```text
//! Open ──commit──▶ Committed ──┐
//!   │                          ├──end──▶ Released
//!   └──rollback──▶ RolledBack ─┘
//! ```
//!
//! If the scope is dropped while still `Open` (early return, `?`, panic
//! unwinding) it rolls back before releasing. Rollback and release failures are
//! logged and never replace the error that caused them.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::transaction::TransactionScope;
//!
//! let tx = repository.begin_transaction()?;
//! let saved = TransactionScope::run(tx, |tx| repository.insert(tx, book))?;
//! ```

use std::fmt;

use crate::repository::{RepositoryError, RepositoryResult, Transaction};

/// Lifecycle state of a [`TransactionScope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeState {
    /// Work in progress, no decision yet
    Open,
    /// Commit succeeded
    Committed,
    /// Rolled back (explicitly, after a failed commit, or on drop)
    RolledBack,
    /// `end` has been called; terminal
    Released,
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled_back"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// Guard owning one transaction until it is released
#[derive(Debug)]
pub struct TransactionScope<T: Transaction> {
    transaction: T,
    state: ScopeState,
}

impl<T: Transaction> TransactionScope<T> {
    /// Take ownership of a freshly begun transaction
    pub fn new(transaction: T) -> Self {
        Self {
            transaction,
            state: ScopeState::Open,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// The underlying transaction, for repository mutations
    pub fn transaction(&mut self) -> &mut T {
        &mut self.transaction
    }

    /// Run `work` inside a scope over `transaction`
    ///
    /// Commits when `work` succeeds and rolls back when it fails. A failed
    /// commit is rolled back and reported as the operation's error. The
    /// transaction is released exactly once whichever way this returns,
    /// including when `work` panics.
    pub fn run<R, E, F>(transaction: T, work: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<RepositoryError>,
    {
        let mut scope = Self::new(transaction);
        match work(scope.transaction()) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                scope.rollback();
                Err(err)
            }
        }
    }

    /// Commit and release
    ///
    /// On failure a rollback is attempted before the commit error is returned.
    pub fn commit(mut self) -> RepositoryResult<()> {
        match self.transaction.commit() {
            Ok(()) => {
                self.state = ScopeState::Committed;
                tracing::debug!("transaction committed");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "transaction commit failed, rolling back");
                self.rollback_in_place();
                Err(err)
            }
        }
    }

    /// Roll back and release
    pub fn rollback(mut self) {
        self.rollback_in_place();
    }

    fn rollback_in_place(&mut self) {
        if let Err(err) = self.transaction.rollback() {
            tracing::error!(error = %err, "transaction rollback failed");
        } else {
            tracing::debug!("transaction rolled back");
        }
        self.state = ScopeState::RolledBack;
    }

    fn release(&mut self) {
        if self.state == ScopeState::Released {
            return;
        }
        if let Err(err) = self.transaction.end() {
            tracing::error!(error = %err, state = %self.state, "transaction release failed");
        }
        self.state = ScopeState::Released;
    }
}

impl<T: Transaction> Drop for TransactionScope<T> {
    fn drop(&mut self) {
        if self.state == ScopeState::Open {
            tracing::warn!("transaction scope dropped while open, rolling back");
            self.rollback_in_place();
        }
        self.release();
    }
}
