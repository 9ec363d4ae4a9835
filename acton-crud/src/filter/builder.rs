//! Query builder
//!
//! Validates a raw filter expression against a resource's [`FieldSchema`],
//! coerces every value to the field's declared type and packages the result,
//! together with sorting and pagination, into an immutable [`Query`].
//!
//! Either every leaf validates or the whole query is rejected; a [`Query`] is
//! never built from a partial filter set.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::filter::{FieldSchema, FieldType, FilterError, QueryBuilder};
//!
//! let schema = FieldSchema::new()
//!     .with_field("title", FieldType::Text)
//!     .with_field("pages", FieldType::Integer);
//!
//! let query = QueryBuilder::new(&schema)
//!     .build([("pages[gte]", "100"), ("title[like]", "%Dune%")])
//!     .unwrap();
//! assert_eq!(query.comparisons().len(), 2);
//!
//! let err = QueryBuilder::new(&schema).build([("pages[like]", "1%")]).unwrap_err();
//! assert!(matches!(err, FilterError::OperatorTypeMismatch { .. }));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::FilterError;
use super::parser::{is_reserved, parse_filters, Comparison, FilterExpression, FilterOperator};
use crate::repository::{Pagination, Sort, SortOrder};

/// Default number of items per page
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Maximum allowed items per page
pub const MAX_PER_PAGE: u32 = 100;

/// Declared type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text; the only type accepting `like`
    Text,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// `true` / `false`
    Boolean,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// RFC 3339 timestamp, normalized to UTC
    DateTime,
}

impl FieldType {
    /// True for types with a meaningful ordering (`gt`, `gte`, `lt`, `lte`)
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::Date | Self::DateTime
        )
    }

    /// Check whether `operator` can be applied to a field of this type
    #[must_use]
    pub const fn supports(&self, operator: FilterOperator) -> bool {
        match operator {
            FilterOperator::Eq | FilterOperator::Ne | FilterOperator::In => true,
            FilterOperator::Like => matches!(self, Self::Text),
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
                self.is_ordered()
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "date-time"),
        }
    }
}

/// Filterable fields of a resource, by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: BTreeMap<String, FieldType>,
}

impl FieldSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Declared type of `name`, if the field exists
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    /// Check if the schema declares `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over `(name, type)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Number of declared fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldType)> for FieldSchema {
    fn from_iter<T: IntoIterator<Item = (K, FieldType)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }
}

/// A typed filter value
///
/// Values of the same variant compare naturally; the repository only ever
/// compares a field's value with filter values coerced to that field's type.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Text value
    Text(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// Values for the `in` operator
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Coerce a raw query-string value to `field_type`
    ///
    /// Returns `None` if `raw` is not a valid literal of that type.
    #[must_use]
    pub fn coerce(raw: &str, field_type: FieldType) -> Option<Self> {
        match field_type {
            FieldType::Text => Some(Self::Text(raw.to_string())),
            FieldType::Integer => raw.parse().ok().map(Self::Integer),
            FieldType::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Float),
            FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(Self::Boolean(true)),
                "false" => Some(Self::Boolean(false)),
                _ => None,
            },
            FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(Self::Date),
            FieldType::DateTime => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| Self::DateTime(dt.with_timezone(&Utc))),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

/// Validated query handed to [`Repository::find_all`](crate::repository::Repository::find_all)
///
/// Immutable once built. A default `Query` has no filter, no sort and no
/// pagination, and therefore selects every entity. A page window is only
/// present when the request names `page`, `per_page` or `limit`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Option<FilterExpression<FilterValue>>,
    sort: Option<Sort>,
    pagination: Option<Pagination>,
}

impl Query {
    /// Query selecting every entity
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Typed filter expression, if any filter was supplied
    #[must_use]
    pub fn filter(&self) -> Option<&FilterExpression<FilterValue>> {
        self.filter.as_ref()
    }

    /// All comparisons that must hold (empty when unfiltered)
    #[must_use]
    pub fn comparisons(&self) -> Vec<&Comparison<FilterValue>> {
        self.filter
            .as_ref()
            .map(FilterExpression::comparisons)
            .unwrap_or_default()
    }

    /// Requested ordering
    #[must_use]
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Requested page window
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }
}

/// Builds a [`Query`] from query-string pairs for one resource schema
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    schema: &'a FieldSchema,
    default_per_page: u32,
    max_per_page: u32,
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder using the default page limits
    #[must_use]
    pub fn new(schema: &'a FieldSchema) -> Self {
        Self {
            schema,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }

    /// Override the page size used when only `page` is given, and the cap on
    /// requested sizes
    #[must_use]
    pub fn with_page_limits(mut self, default_per_page: u32, max_per_page: u32) -> Self {
        self.max_per_page = max_per_page.max(1);
        self.default_per_page = default_per_page.clamp(1, self.max_per_page);
        self
    }

    /// Interpret every query-string pair
    ///
    /// Reserved keys become sort and pagination; everything else is parsed as
    /// a filter and validated against the schema.
    pub fn build<I, K, V>(&self, pairs: I) -> Result<Query, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Vec::new();
        let mut reserved: BTreeMap<String, String> = BTreeMap::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if is_reserved(key) {
                // `limit` is an alias of `per_page`
                let canonical = if key == "limit" { "per_page" } else { key };
                let previous = reserved.insert(canonical.to_string(), value.to_string());
                if let Some(previous) = previous {
                    if previous != value {
                        return Err(FilterError::InvalidReservedParameter {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            } else {
                filters.push((key.to_string(), value.to_string()));
            }
        }

        let filter = parse_filters(filters)?
            .map(|raw| self.validate(raw))
            .transpose()?;

        Ok(Query {
            filter,
            sort: self.sort(&reserved)?,
            pagination: self.pagination(&reserved)?,
        })
    }

    /// Validate and coerce a raw expression against the schema
    pub fn validate(
        &self,
        raw: FilterExpression<String>,
    ) -> Result<FilterExpression<FilterValue>, FilterError> {
        raw.try_map(&mut |comparison| self.validate_comparison(comparison))
    }

    fn validate_comparison(
        &self,
        comparison: Comparison<String>,
    ) -> Result<Comparison<FilterValue>, FilterError> {
        let Comparison {
            field,
            operator,
            value,
        } = comparison;

        let field_type = self
            .schema
            .get(&field)
            .ok_or_else(|| FilterError::UnknownField {
                field: field.clone(),
            })?;

        if !field_type.supports(operator) {
            return Err(FilterError::OperatorTypeMismatch {
                field,
                operator,
                field_type,
            });
        }

        let coerce = |raw: &str| {
            FilterValue::coerce(raw, field_type).ok_or_else(|| FilterError::ValueCoercion {
                field: field.clone(),
                value: raw.to_string(),
                expected: field_type,
            })
        };

        let typed = if operator == FilterOperator::In {
            let items = value
                .split(',')
                .map(|item| {
                    if item.is_empty() {
                        Err(FilterError::ValueCoercion {
                            field: field.clone(),
                            value: value.clone(),
                            expected: field_type,
                        })
                    } else {
                        coerce(item)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            FilterValue::List(items)
        } else {
            coerce(&value)?
        };

        Ok(Comparison::new(field, operator, typed))
    }

    fn sort(&self, reserved: &BTreeMap<String, String>) -> Result<Option<Sort>, FilterError> {
        let Some(field) = reserved.get("sort") else {
            return Ok(None);
        };

        if !self.schema.contains(field) {
            return Err(FilterError::InvalidReservedParameter {
                key: "sort".to_string(),
                value: field.clone(),
            });
        }

        let order = match reserved.get("order") {
            Some(raw) => raw
                .parse::<SortOrder>()
                .map_err(|_| FilterError::InvalidReservedParameter {
                    key: "order".to_string(),
                    value: raw.clone(),
                })?,
            None => SortOrder::Asc,
        };

        Ok(Some(Sort::new(field.clone(), order)))
    }

    // No window unless the client asked for one
    fn pagination(
        &self,
        reserved: &BTreeMap<String, String>,
    ) -> Result<Option<Pagination>, FilterError> {
        let positive = |key: &str| -> Result<Option<u32>, FilterError> {
            reserved
                .get(key)
                .map(|raw| {
                    raw.parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| FilterError::InvalidReservedParameter {
                            key: key.to_string(),
                            value: raw.clone(),
                        })
                })
                .transpose()
        };

        let (page, per_page) = match (positive("page")?, positive("per_page")?) {
            (None, None) => return Ok(None),
            (page, per_page) => (
                page.unwrap_or(1),
                per_page.unwrap_or(self.default_per_page).min(self.max_per_page),
            ),
        };

        Ok(Some(Pagination::page(u64::from(page), u64::from(per_page))))
    }
}
