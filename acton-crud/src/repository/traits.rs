//! Repository and transaction trait definitions
//!
//! These are the persistence collaborators consumed by the
//! [`ResourceOrchestrator`](crate::handlers::ResourceOrchestrator). The core
//! treats every call as a synchronous operation that may fail; any blocking
//! I/O happens inside the implementation. The HTTP adapter moves orchestrated
//! calls onto the blocking thread pool so implementations are free to block.
//!
//! # Overview
//!
//! - [`Repository`]: read and mutation operations for one entity type
//! - [`Transaction`]: the begin/commit/rollback/end primitive for one unit of work
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::filter::Query;
//! use acton_crud::repository::{Repository, RepositoryResult, Transaction};
//!
//! struct BookRepository { pool: Pool }
//!
//! impl Repository<Book> for BookRepository {
//!     type Transaction = PooledTransaction;
//!
//!     fn find_all(&self, query: &Query) -> RepositoryResult<Vec<Book>> {
//!         let sql = to_sql(query);
//!         self.pool.query(&sql).map_err(Into::into)
//!     }
//!     // ... other methods
//! }
//! ```

use super::error::RepositoryError;
use crate::filter::Query;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// One unit of work opened by [`Repository::begin_transaction`]
///
/// The orchestrator never calls these directly; it wraps the handle in a
/// [`TransactionScope`](crate::transaction::TransactionScope), which calls
/// exactly one of `commit`/`rollback` and then `end` exactly once.
pub trait Transaction: Send {
    /// Make every mutation performed under this transaction durable
    fn commit(&mut self) -> RepositoryResult<()>;

    /// Discard every mutation performed under this transaction
    fn rollback(&mut self) -> RepositoryResult<()>;

    /// Release the underlying resources (connection, locks)
    ///
    /// Called after the commit-or-rollback decision on every path. Failures
    /// are reported so they can be logged; they never replace the outcome.
    fn end(&mut self) -> RepositoryResult<()>;
}

/// Persistence collaborator for one entity type
///
/// Identifiers are positive `i64` values; the orchestrator rejects
/// non-positive identifiers before any repository call.
pub trait Repository<Entity>: Send + Sync {
    /// Transaction handle produced by [`begin_transaction`](Self::begin_transaction)
    type Transaction: Transaction;

    /// Find all entities matching the query's filter, sort and pagination
    fn find_all(&self, query: &Query) -> RepositoryResult<Vec<Entity>>;

    /// Find an entity by its identifier
    ///
    /// Returns `Ok(None)` when no entity has this identifier.
    fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Entity>>;

    /// Check if an entity exists by its identifier
    fn exists(&self, id: i64) -> RepositoryResult<bool> {
        self.find_by_id(id).map(|found| found.is_some())
    }

    /// Open a new transaction
    fn begin_transaction(&self) -> RepositoryResult<Self::Transaction>;

    /// Insert a new entity, returning it with generated fields populated
    fn insert(&self, tx: &mut Self::Transaction, entity: Entity) -> RepositoryResult<Entity>;

    /// Replace an existing entity
    fn update(&self, tx: &mut Self::Transaction, entity: Entity) -> RepositoryResult<Entity>;

    /// Update an existing entity after a partial change
    ///
    /// The entity already carries the merged state. Backends that track dirty
    /// properties can override this to write only what changed.
    fn update_partial(
        &self,
        tx: &mut Self::Transaction,
        entity: Entity,
    ) -> RepositoryResult<Entity> {
        self.update(tx, entity)
    }

    /// Delete an entity by its identifier
    ///
    /// Returns `true` if the entity was deleted, `false` if nothing was removed.
    fn delete_by_id(&self, tx: &mut Self::Transaction, id: i64) -> RepositoryResult<bool>;
}
