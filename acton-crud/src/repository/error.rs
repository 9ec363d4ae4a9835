//! Failures reported by repositories and transactions
//!
//! The orchestrator never reads the message text. It only needs to know that a
//! collaborator failed and at which step.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::not_found("Book", "42");
//! assert_eq!(error.kind, RepositoryErrorKind::NotFound);
//! assert_eq!(error.operation, RepositoryOperation::FindById);
//! ```

use std::fmt;

/// Repository or transaction call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    FindById,
    FindAll,
    Exists,
    Insert,
    /// Full replacement
    Update,
    /// Only the supplied properties change
    UpdatePartial,
    Delete,
    Begin,
    Commit,
    Rollback,
}

impl RepositoryOperation {
    /// Snake-case name used in logs and messages
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindById => "find_by_id",
            Self::FindAll => "find_all",
            Self::Exists => "exists",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::UpdatePartial => "update_partial",
            Self::Delete => "delete",
            Self::Begin => "begin",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
        }
    }
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad cause of a repository failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    NotFound,
    /// Duplicate identifier on insert
    AlreadyExists,
    /// Storage backend unreachable
    ConnectionFailed,
    /// Begin, commit or rollback failed
    TransactionFailed,
    /// Any other storage fault
    DatabaseError,
    Other,
}

impl RepositoryErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::ConnectionFailed => "connection_failed",
            Self::TransactionFailed => "transaction_failed",
            Self::DatabaseError => "database_error",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository failure tagged with the call that raised it
///
/// # Example
///
/// ```rust
/// use acton_crud::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::database_error(RepositoryOperation::Insert, "disk full")
///     .with_entity("Book", "7");
/// assert_eq!(error.to_string(), "insert failed (database_error): disk full, Book 7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    pub operation: RepositoryOperation,
    pub kind: RepositoryErrorKind,
    pub message: String,
    /// Resource name, e.g. `"Book"`
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

impl RepositoryError {
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// No row for the given id
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::NotFound,
            "no such record",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Insert collided with an existing id
    pub fn already_exists(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Insert,
            RepositoryErrorKind::AlreadyExists,
            "duplicate identifier",
        )
        .with_entity(entity_type, entity_id)
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Begin,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    pub fn transaction_failed(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::TransactionFailed, message)
    }

    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Attach the resource name and id the failure concerns
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation, self.kind, self.message)?;
        match (&self.entity_type, &self.entity_id) {
            (Some(resource), Some(id)) => write!(f, ", {resource} {id}"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for RepositoryError {}
