//! API error types for resource operations
//!
//! Every orchestrator operation fails with an [`ApiError`], which maps its
//! [`ApiErrorKind`] onto an HTTP status via `IntoResponse`.
//!
//! Internal errors are opaque to clients: the detail is logged together with a
//! generated reference id and only the reference is returned.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::handlers::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::not_found(ApiOperation::Get, "Book", 42);
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.entity_id, Some("42".to_string()));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::validation::Violations;
use crate::filter::FilterError;

/// Message returned in place of internal error details
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Resource operation a request was routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    List,
    Get,
    Create,
    /// Full replacement (`PUT`)
    Update,
    /// Merge of the supplied properties (`PATCH`)
    UpdatePartial,
    Delete,
}

impl ApiOperation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::UpdatePartial => "update_partial",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, from the client's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Path identifier is not a positive integer
    InvalidIdentifier,
    /// Body could not be bound or failed validation, or its id contradicts the path
    ValidationFailed,
    /// Filter, sort or pagination parameters are unusable
    MalformedQuery,
    NotFound,
    /// Operation is disabled for this resource
    MethodNotAllowed,
    /// Entity is still in use and cannot be removed
    Conflict,
    /// Persistence or rendering failed
    InternalError,
}

impl ApiErrorKind {
    /// HTTP status sent for this kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier | Self::ValidationFailed | Self::MalformedQuery => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code, e.g. `MALFORMED_QUERY`
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::MalformedQuery => "MALFORMED_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Conflict => "CONFLICT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_code().to_ascii_lowercase())
    }
}

/// Failure of a resource operation, rendered as a JSON error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub operation: ApiOperation,
    pub kind: ApiErrorKind,
    /// Message returned to the client
    pub message: String,
    /// Resource name, e.g. `"Book"`
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Per-field problems when a body fails validation
    pub violations: Option<Violations>,
    /// Correlates an internal error response with its log entry
    pub reference: Option<Uuid>,
    /// Internal detail; logged, never serialized
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            violations: None,
            reference: None,
            detail: None,
        }
    }

    pub fn invalid_identifier(operation: ApiOperation, raw: impl fmt::Display) -> Self {
        Self::new(
            operation,
            ApiErrorKind::InvalidIdentifier,
            format!("Invalid identifier '{raw}'"),
        )
    }

    pub fn validation_failed(operation: ApiOperation, violations: Violations) -> Self {
        Self {
            violations: Some(violations),
            ..Self::new(operation, ApiErrorKind::ValidationFailed, "Validation failed")
        }
    }

    /// Body could not be bound, or is otherwise invalid as a whole
    pub fn invalid_body(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::ValidationFailed, message)
    }

    pub fn malformed_query(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::List, ApiErrorKind::MalformedQuery, message)
    }

    pub fn not_found(
        operation: ApiOperation,
        entity_type: impl Into<String>,
        entity_id: impl fmt::Display,
    ) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, "No such resource")
            .with_entity(entity_type, entity_id.to_string())
    }

    pub fn method_not_allowed(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::MethodNotAllowed, message)
    }

    pub fn conflict(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::Conflict, message)
    }

    /// Opaque internal error
    ///
    /// The client sees [`INTERNAL_ERROR_MESSAGE`] and a fresh reference id;
    /// `detail` is only logged.
    pub fn internal(operation: ApiOperation, detail: impl fmt::Display) -> Self {
        Self {
            reference: Some(Uuid::new_v4()),
            detail: Some(detail.to_string()),
            ..Self::new(operation, ApiErrorKind::InternalError, INTERNAL_ERROR_MESSAGE)
        }
    }

    /// Return the internal detail to the client instead of the generic message
    #[must_use]
    pub fn expose_detail(mut self) -> Self {
        if let Some(detail) = &self.detail {
            self.message = detail.clone();
        }
        self
    }

    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected ({}): {}", self.operation, self.kind, self.message)?;
        match (&self.entity_type, &self.entity_id) {
            (Some(resource), Some(id)) => write!(f, ", {resource} {id}"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        Self::malformed_query(format!("Malformed query string: {err}"))
    }
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    status: u16,
    operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Violations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Uuid>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.kind {
            ApiErrorKind::InternalError => tracing::error!(
                operation = self.operation.as_str(),
                resource = ?self.entity_type,
                id = ?self.entity_id,
                reference = ?self.reference,
                detail = ?self.detail,
                "request failed"
            ),
            kind => tracing::warn!(
                operation = self.operation.as_str(),
                code = kind.error_code(),
                resource = ?self.entity_type,
                id = ?self.entity_id,
                error = %self.message,
                "request rejected"
            ),
        }

        let body = ErrorBody {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: self.operation.as_str(),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            violations: self.violations,
            reference: self.reference,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldType;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn operation_names() {
        assert_eq!(ApiOperation::List.to_string(), "list");
        assert_eq!(ApiOperation::UpdatePartial.to_string(), "update_partial");
        assert_eq!(ApiErrorKind::MalformedQuery.to_string(), "malformed_query");
    }

    #[test]
    fn client_errors_map_to_400() {
        for kind in [
            ApiErrorKind::InvalidIdentifier,
            ApiErrorKind::ValidationFailed,
            ApiErrorKind::MalformedQuery,
        ] {
            assert_eq!(kind.status_code(), StatusCode::BAD_REQUEST, "{kind}");
        }
        assert_eq!(ApiErrorKind::NotFound.status_code().as_u16(), 404);
        assert_eq!(ApiErrorKind::MethodNotAllowed.status_code().as_u16(), 405);
        assert_eq!(ApiErrorKind::Conflict.status_code().as_u16(), 409);
        assert_eq!(ApiErrorKind::InternalError.status_code().as_u16(), 500);
    }

    #[test]
    fn error_codes_are_screaming_snake() {
        assert_eq!(ApiErrorKind::InvalidIdentifier.error_code(), "INVALID_IDENTIFIER");
        assert_eq!(ApiErrorKind::MalformedQuery.error_code(), "MALFORMED_QUERY");
        assert_eq!(ApiErrorKind::MethodNotAllowed.error_code(), "METHOD_NOT_ALLOWED");
        assert_eq!(ApiErrorKind::InternalError.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_found_carries_entity() {
        let error = ApiError::not_found(ApiOperation::Update, "Book", 9);
        assert_eq!(error.operation, ApiOperation::Update);
        assert_eq!(error.entity_type, Some("Book".to_string()));
        assert_eq!(error.entity_id, Some("9".to_string()));
        assert_eq!(error.to_string(), "update rejected (not_found): No such resource, Book 9");
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let error = ApiError::internal(ApiOperation::Create, "duplicate key value violates index");
        assert_eq!(error.message, INTERNAL_ERROR_MESSAGE);
        assert!(error.reference.is_some());
        assert_eq!(
            error.detail.as_deref(),
            Some("duplicate key value violates index")
        );
    }

    #[test]
    fn test_internal_error_detail_can_be_exposed() {
        let error = ApiError::internal(ApiOperation::Delete, "Cannot delete selected entity")
            .expose_detail();
        assert_eq!(error.message, "Cannot delete selected entity");
    }

    #[test]
    fn test_internal_references_are_unique() {
        let a = ApiError::internal(ApiOperation::Get, "x");
        let b = ApiError::internal(ApiOperation::Get, "x");
        assert_ne!(a.reference, b.reference);
    }

    #[test]
    fn test_from_filter_error() {
        let err: ApiError = FilterError::OperatorTypeMismatch {
            field: "pages".to_string(),
            operator: crate::filter::FilterOperator::Like,
            field_type: FieldType::Integer,
        }
        .into();
        assert_eq!(err.kind, ApiErrorKind::MalformedQuery);
        assert_eq!(err.operation, ApiOperation::List);
        assert!(err.message.starts_with("Malformed query string"));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_rejection_log_has_single_message_key() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            ApiError::malformed_query("Malformed query string: unknown field 'colour'")
                .into_response()
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(output.matches("\"message\"").count(), 1);
        assert_eq!(line["fields"]["message"], "request rejected");
        assert_eq!(
            line["fields"]["error"],
            "Malformed query string: unknown field 'colour'"
        );
        assert_eq!(line["fields"]["code"], "MALFORMED_QUERY");
    }

    #[tokio::test]
    async fn test_validation_response_body() {
        let violations = Violations::new().with("title", "REQUIRED", "title is required");
        let response = ApiError::validation_failed(ApiOperation::Create, violations).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["status"], 400);
        assert_eq!(body["operation"], "create");
        assert_eq!(body["violations"]["title"][0]["code"], "REQUIRED");
        assert!(body.get("reference").is_none());
    }

    #[tokio::test]
    async fn test_internal_response_hides_detail() {
        let error = ApiError::internal(ApiOperation::Update, "secret table name");
        let reference = error.reference.unwrap();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["reference"], reference.to_string());
        assert!(!body.to_string().contains("secret"));
    }
}
