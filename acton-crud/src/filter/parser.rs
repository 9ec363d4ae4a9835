//! Query-string filter lexer and parser
//!
//! Turns query-string pairs into a raw [`FilterExpression`]: every pair
//! becomes one comparison leaf and all leaves sit under a single conjunction.
//!
//! Keys follow two shapes:
//!
//! - `field=value` compares with `eq`
//! - `field[op]=value` compares with `op`, one of `eq, ne, gt, gte, lt, lte, like, in`
//!
//! `field` is a plain or dotted identifier (`title`, `author.name`). Any other
//! key shape, an empty operator or an operator outside the set is a parse
//! failure. Values are left as raw strings; type coercion happens in the
//! [`builder`](super::builder).
//!
//! # Example
//!
//! ```rust
//! use acton_crud::filter::{parse_filters, FilterOperator};
//!
//! let expression = parse_filters([("year[gte]", "1990"), ("year[lte]", "1999")])
//!     .unwrap()
//!     .unwrap();
//!
//! let leaves = expression.comparisons();
//! assert_eq!(leaves.len(), 2);
//! assert_eq!(leaves[0].operator, FilterOperator::Gte);
//! assert_eq!(leaves[1].operator, FilterOperator::Lte);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Query-string keys that drive pagination and sorting instead of filtering
pub const RESERVED_KEYS: [&str; 5] = ["page", "per_page", "limit", "sort", "order"];

/// `field` or `field[op]`, where field is a dotted identifier
static FILTER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<field>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(?:\[(?P<op>[^\[\]]*)\])?$",
    )
    .expect("filter key regex is valid")
});

/// Comparison operators accepted in filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Pattern match (`%` any run, `_` any single character)
    Like,
    /// Membership in a comma-separated list
    In,
}

impl FilterOperator {
    /// Token used in `field[op]` keys
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::In => "in",
        }
    }

    /// True for `gt`, `gte`, `lt` and `lte`
    #[must_use]
    pub const fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "like" => Ok(Self::Like),
            "in" => Ok(Self::In),
            other => Err(format!("unknown operator '{other}'")),
        }
    }
}

/// One `field op value` leaf of a filter expression
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Comparison<V> {
    /// Schema field the comparison applies to
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Raw string before coercion, typed value after
    pub value: V,
}

impl<V> Comparison<V> {
    /// Create a new comparison
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: V) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// A raw `(field, operator, value)` triple lexed from one query-string pair
pub type FilterToken = Comparison<String>;

/// Filter AST
///
/// The parser only produces conjunctions of comparisons. `V` is `String` for
/// the raw tree and [`FilterValue`](super::FilterValue) once the builder has
/// validated and coerced every leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression<V> {
    /// A single comparison
    Comparison(Comparison<V>),
    /// All children must hold
    Conjunction(Vec<FilterExpression<V>>),
}

impl<V> FilterExpression<V> {
    /// Every comparison leaf, depth first
    pub fn comparisons(&self) -> Vec<&Comparison<V>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Comparison<V>>) {
        match self {
            Self::Comparison(comparison) => leaves.push(comparison),
            Self::Conjunction(children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Rebuild the tree with every leaf transformed, failing on the first error
    pub fn try_map<U, E, F>(self, f: &mut F) -> Result<FilterExpression<U>, E>
    where
        F: FnMut(Comparison<V>) -> Result<Comparison<U>, E>,
    {
        match self {
            Self::Comparison(comparison) => f(comparison).map(FilterExpression::Comparison),
            Self::Conjunction(children) => children
                .into_iter()
                .map(|child| child.try_map(&mut *f))
                .collect::<Result<Vec<_>, E>>()
                .map(FilterExpression::Conjunction),
        }
    }
}

/// True if `key` controls pagination or sorting rather than filtering
#[must_use]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Lex one query-string pair into a token
pub fn tokenize(key: &str, value: &str) -> Result<FilterToken, FilterError> {
    let captures = FILTER_KEY
        .captures(key)
        .ok_or_else(|| FilterError::MalformedKey {
            key: key.to_string(),
        })?;

    let operator = match captures.name("op") {
        None => FilterOperator::Eq,
        Some(op) if op.as_str().is_empty() => {
            return Err(FilterError::MalformedKey {
                key: key.to_string(),
            })
        }
        Some(op) => op
            .as_str()
            .parse()
            .map_err(|_| FilterError::UnknownOperator {
                key: key.to_string(),
                operator: op.as_str().to_string(),
            })?,
    };

    Ok(Comparison::new(&captures["field"], operator, value.to_string()))
}

/// Parse non-reserved query-string pairs into a raw filter expression
///
/// Returns `Ok(None)` when there is nothing to filter on. Reserved keys must
/// be removed by the caller (see [`is_reserved`]); passing one here treats it
/// as an ordinary field name.
///
/// Leaves are sorted so that the same multiset of pairs always produces an
/// equal expression, whatever order the pairs arrived in.
pub fn parse_filters<I, K, V>(pairs: I) -> Result<Option<FilterExpression<String>>, FilterError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut tokens = pairs
        .into_iter()
        .map(|(key, value)| tokenize(key.as_ref(), value.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if tokens.is_empty() {
        return Ok(None);
    }

    tokens.sort();
    Ok(Some(FilterExpression::Conjunction(
        tokens.into_iter().map(FilterExpression::Comparison).collect(),
    )))
}
