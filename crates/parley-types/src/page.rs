//! Pagination for list queries.
//!
//! `PageQuery` is the loosely typed shape a query string arrives in;
//! `Page` is what repositories consume.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of rows per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Upper bound on rows per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order: '{other}'")),
        }
    }
}

/// Raw paging parameters as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub ordering: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Resolved ordering, offset, and limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub ordering: SortOrder,
    pub offset: i64,
    /// `None` means unbounded.
    pub limit: Option<i64>,
}

impl Page {
    /// The `n` most recent rows, newest first.
    pub fn latest(n: i64) -> Self {
        Self {
            ordering: SortOrder::Desc,
            offset: 0,
            limit: Some(n),
        }
    }

    /// Every row, oldest first.
    pub fn all() -> Self {
        Self {
            ordering: SortOrder::Asc,
            offset: 0,
            limit: None,
        }
    }

    /// Resolve a raw query. Unparsable or out-of-range values fall back
    /// to the defaults (ascending, page 1, 20 rows); limit is capped at 100.
    /// A page whose offset would overflow resolves to the first page.
    pub fn parse(query: Option<&PageQuery>) -> Self {
        let Some(query) = query else {
            return Self::default();
        };

        let ordering = query
            .ordering
            .as_deref()
            .and_then(|o| o.parse().ok())
            .unwrap_or_default();

        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l.min(MAX_PAGE_LIMIT))
            .unwrap_or(DEFAULT_PAGE_LIMIT);

        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        let offset = (page - 1).checked_mul(limit).unwrap_or(0);

        Self {
            ordering,
            offset,
            limit: Some(limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            ordering: SortOrder::Asc,
            offset: 0,
            limit: Some(DEFAULT_PAGE_LIMIT),
        }
    }
}
