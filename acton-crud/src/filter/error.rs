//! Filter interpreter failures
//!
//! Parse failures (malformed key syntax, unknown operators) and validation
//! failures (unknown field, operator/type mismatch, bad value) stay
//! distinguishable here. The orchestrator folds every variant into a single
//! malformed-query response.

use thiserror::Error;

use super::builder::FieldType;
use super::parser::FilterOperator;

/// Error raised while parsing or validating a query-string filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Key does not match `field` or `field[op]`
    #[error("malformed filter key '{key}'")]
    MalformedKey { key: String },

    /// Bracketed operator is outside the supported set
    #[error("unknown operator '{operator}' in filter key '{key}'")]
    UnknownOperator { key: String, operator: String },

    /// Field is not part of the resource schema
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Operator cannot be applied to the field's declared type
    #[error("operator '{operator}' cannot be applied to {field_type} field '{field}'")]
    OperatorTypeMismatch {
        field: String,
        operator: FilterOperator,
        field_type: FieldType,
    },

    /// Raw value does not coerce to the field's declared type
    #[error("value '{value}' for field '{field}' is not a valid {expected}")]
    ValueCoercion {
        field: String,
        value: String,
        expected: FieldType,
    },

    /// Pagination or sort parameter has an unusable value
    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidReservedParameter { key: String, value: String },
}

impl FilterError {
    /// True for syntax failures raised by the parser, false for schema validation failures
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::MalformedKey { .. } | Self::UnknownOperator { .. })
    }
}
