//! Field-level validation results
//!
//! Adapters report problems with a bound DTO as [`Violations`]; the
//! orchestrator turns a non-empty set into a `400 Bad Request` whose body lists
//! every violation under its field name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One problem with one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Machine-readable code (e.g. `REQUIRED`, `TOO_LONG`)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Validation problems keyed by field name
///
/// Fields are kept in name order so the rendered body is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations {
    fields: BTreeMap<String, Vec<FieldViolation>>,
}

impl Violations {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`
    pub fn add(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(FieldViolation {
                code: code.into(),
                message: message.into(),
            });
    }

    /// Builder form of [`add`](Self::add)
    #[must_use]
    pub fn with(
        mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.add(field, code, message);
        self
    }

    /// Record `REQUIRED` for `field` when `value` is `None`
    pub fn require<T>(&mut self, field: &str, value: Option<&T>) {
        if value.is_none() {
            self.add(field, "REQUIRED", format!("{field} is required"));
        }
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of violations across all fields
    #[must_use]
    pub fn count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Violations recorded for one field
    #[must_use]
    pub fn field(&self, name: &str) -> &[FieldViolation] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_group_by_field() {
        let mut violations = Violations::new();
        violations.add("title", "REQUIRED", "title is required");
        violations.add("title", "TOO_LONG", "title is too long");
        violations.add("pages", "RANGE", "pages must be positive");

        assert!(!violations.is_empty());
        assert_eq!(violations.count(), 3);
        assert_eq!(violations.field("title").len(), 2);
        assert_eq!(violations.field("pages")[0].code, "RANGE");
        assert!(violations.field("isbn").is_empty());
    }

    #[test]
    fn test_require() {
        let mut violations = Violations::new();
        violations.require("title", Some(&"Dune"));
        assert!(violations.is_empty());
        violations.require::<String>("author", None);
        assert_eq!(violations.field("author")[0].code, "REQUIRED");
    }

    #[test]
    fn test_into_result() {
        assert!(Violations::new().into_result().is_ok());
        assert!(Violations::new().with("a", "X", "x").into_result().is_err());
    }

    #[test]
    fn test_serializes_as_field_map() {
        let violations = Violations::new().with("title", "REQUIRED", "title is required");
        let json = serde_json::to_value(&violations).unwrap();
        assert_eq!(json["title"][0]["code"], "REQUIRED");
    }
}
