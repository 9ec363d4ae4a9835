//! Query-string filter interpreter
//!
//! Two stages turn the query string of a list request into a [`Query`]:
//!
//! 1. [`parser`] lexes every non-reserved pair into a raw [`FilterExpression`]
//! 2. [`builder`] validates that expression against a [`FieldSchema`] and
//!    coerces each value into a typed [`FilterValue`]
//!
//! Reserved keys (`page`, `per_page`, `limit`, `sort`, `order`) never reach
//! the parser; the builder turns them into [`Sort`](crate::repository::Sort)
//! and [`Pagination`](crate::repository::Pagination).
//!
//! # Example
//!
//! ```rust
//! use acton_crud::filter::{FieldSchema, FieldType, QueryBuilder};
//!
//! let schema = FieldSchema::new().with_field("year", FieldType::Integer);
//! let query = QueryBuilder::new(&schema)
//!     .build([("year[gte]", "1990"), ("sort", "year")])
//!     .unwrap();
//!
//! assert_eq!(query.comparisons().len(), 1);
//! assert!(query.sort().is_some());
//! ```

pub mod builder;
mod error;
pub mod parser;

pub use builder::{
    FieldSchema, FieldType, FilterValue, Query, QueryBuilder, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use error::FilterError;
pub use parser::{
    is_reserved, parse_filters, tokenize, Comparison, FilterExpression, FilterOperator,
    FilterToken, RESERVED_KEYS,
};
