//! Repository traits for resource persistence
//!
//! This module provides the persistence contract the resource orchestrator
//! consumes: a synchronous [`Repository`] per entity type, its
//! [`Transaction`] primitive, and the structured [`RepositoryError`].
//!
//! # Features
//!
//! - **Generic CRUD**: [`Repository`] with query-driven listing and transactional mutations
//! - **Transactions**: [`Transaction`] commit/rollback/end primitive
//! - **Paging**: [`Pagination`] and [`Sort`] carried on every [`Query`](crate::filter::Query)
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::repository::{Repository, RepositoryResult};
//!
//! impl Repository<Book> for BookRepository {
//!     type Transaction = BookTransaction;
//!
//!     fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Book>> {
//!         self.store.get(id)
//!     }
//!     // ... other methods
//! }
//! ```

mod error;
mod pagination;
mod traits;

// Re-export all public types
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use pagination::{Pagination, Sort, SortOrder};
pub use traits::{Repository, RepositoryResult, Transaction};
