//! # acton-crud
//!
//! Generic CRUD resources over HTTP: one adapter and one repository per
//! resource type give you list, get, create, update, partial update and
//! delete endpoints with query-string filtering, content negotiation and
//! scoped transactions.
//!
//! ## Features
//!
//! - **Filtering**: `field[op]=value` query strings, validated against a typed schema
//! - **Sorting and pagination**: `sort`, `order`, `page`, `per_page` (`limit`)
//! - **Content negotiation**: JSON or XML from the `Accept` header
//! - **Transactions**: every write commits or rolls back, and always releases
//! - **Structured errors**: stable error codes, field violations, opaque internal failures
//! - **Graceful shutdown**: SIGTERM and SIGINT drain in-flight requests
//!
//! ## Example
//!
//! ```rust,ignore
//! use acton_crud::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     let books = ResourceOrchestrator::new(BookAdapter::new(), InMemoryRepository::new())
//!         .with_options(ResourceOptions::from(&config.resources));
//!
//!     let app = Router::new().merge(resource_routes("/books", books));
//!
//!     // Run server
//!     Server::new(config)
//!         .serve(app)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod memory;
pub mod negotiation;
pub mod observability;
pub mod repository;
pub mod router;
pub mod server;
pub mod transaction;

#[cfg(test)]
mod test_support;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ResourcesConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::filter::{FieldSchema, FieldType, FilterError, FilterValue, Query, QueryBuilder};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, ApiOperation, FieldViolation, ResourceAdapter, ResourceOptions,
        ResourceOrchestrator, ResourceResponse, Violations,
    };
    pub use crate::memory::{Identified, InMemoryRepository};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Pagination, Repository, RepositoryError, RepositoryErrorKind, RepositoryOperation,
        RepositoryResult, Sort, SortOrder, Transaction,
    };
    pub use crate::router::resource_routes;
    pub use crate::server::Server;

    pub use axum::{
        http::StatusCode,
        routing::{get, post},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros
    pub use tracing::{debug, error, info, warn};

    // Re-export tokio for async runtime
    pub use tokio;
}
