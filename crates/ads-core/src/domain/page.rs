use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Number of ads returned per listing page.
pub const PAGE_SIZE: u64 = 10;

/// Direction of a listing sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Sort direction as understood by document stores (`1` / `-1`).
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::InvalidSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// A validated listing request.
///
/// Ties in the sort key are left to the store's natural (insertion) order, so
/// pages over a non-unique key are only as stable as that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub sort_field: String,
    pub sort_order: SortOrder,
}

impl PageRequest {
    /// Validate raw listing parameters. Pages are 1-based; `0` is treated as `1`.
    pub fn parse(page: u64, sort_field: &str, sort_order: &str) -> Result<Self, DomainError> {
        let sort_order = sort_order.parse()?;
        Ok(Self {
            page: page.max(1),
            sort_field: sort_field.to_string(),
            sort_order,
        })
    }

    /// Number of documents to skip before this page.
    pub fn skip(&self) -> u64 {
        PAGE_SIZE.saturating_mul(self.page - 1)
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}
