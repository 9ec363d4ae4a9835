//! Generic resource handling
//!
//! This module turns one [`ResourceAdapter`] plus one
//! [`Repository`](crate::repository::Repository) into a full set of CRUD
//! operations with uniform HTTP semantics.
//!
//! # Features
//!
//! - **Orchestration**: [`ResourceOrchestrator`] sequences validation, mapping, transactional persistence and rendering
//! - **Adapters**: [`ResourceAdapter`] describes one resource type (mapping, schema, validation, XML, deletion policy)
//! - **Error Handling**: [`ApiError`] with automatic HTTP status code mapping
//! - **Validation**: [`Violations`] collects field-level problems
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_crud::handlers::{ResourceOptions, ResourceOrchestrator};
//! use acton_crud::memory::InMemoryRepository;
//!
//! let books = ResourceOrchestrator::new(BookAdapter::new(), InMemoryRepository::new())
//!     .with_options(ResourceOptions::default().with_base_path("/books"));
//!
//! let response = books.get_all([("pages[gte]", "300")], Some("application/json"))?;
//! ```

mod error;
mod orchestrator;
mod response;
mod traits;
mod validation;

// Re-export all public types
pub use error::{ApiError, ApiErrorKind, ApiOperation, INTERNAL_ERROR_MESSAGE};
pub use orchestrator::{
    ResourceOptions, ResourceOrchestrator, DELETE_FAILED_MESSAGE, ENTITY_IN_USE_MESSAGE,
};
pub use response::ResourceResponse;
pub use traits::ResourceAdapter;
pub use validation::{FieldViolation, Violations};
