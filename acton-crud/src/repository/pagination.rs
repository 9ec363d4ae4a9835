//! Pagination and ordering types carried on a [`Query`](crate::filter::Query)
//!
//! These come from the reserved query-string keys (`page`, `per_page`,
//! `limit`, `sort`, `order`) and are never part of the filter expression.
//!
//! # Example
//!
//! ```rust
//! use acton_crud::repository::{Pagination, Sort, SortOrder};
//!
//! let page3 = Pagination::page(3, 20);
//! assert_eq!(page3.offset, 40);
//!
//! let sort = Sort::new("published", SortOrder::Desc);
//! assert_eq!(sort.to_string(), "published desc");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (A-Z, 0-9, oldest first)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0, newest first)
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if *self == Self::Asc { "asc" } else { "desc" })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("invalid sort order '{other}'")),
        }
    }
}

/// Field ordering requested by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Schema field to order by
    pub field: String,
    /// Direction
    pub order: SortOrder,
}

impl Sort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order)
    }
}

/// Result window as an offset and a page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Window starting at the first record
    #[must_use]
    pub const fn first_page(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// Window for a 1-based page number; page 0 is treated as page 1
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1) * page_size;
        Self {
            offset,
            limit: page_size,
        }
    }

    /// Apply this window to an already ordered sequence
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_page_offsets() {
        assert_eq!(Pagination::page(1, 20), Pagination::first_page(20));
        assert_eq!(Pagination::page(0, 20).offset, 0);
        assert_eq!(Pagination::page(3, 50).offset, 100);
    }

    #[test]
    fn test_apply_window() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(Pagination::page(2, 4).apply(items.clone()), vec![5, 6, 7, 8]);
        assert_eq!(Pagination::page(3, 4).apply(items.clone()), vec![9, 10]);
        assert!(Pagination::page(4, 4).apply(items).is_empty());
    }
}
