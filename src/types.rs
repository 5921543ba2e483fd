/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Raw `?page=&limit=` query parameters. Out-of-range numbers are accepted
/// here and normalised by [`Pagination::new`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `?page=&limit=` where anything unparsable counts as absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LenientPageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl From<LenientPageQuery> for PageQuery {
    fn from(raw: LenientPageQuery) -> Self {
        let number = |value: Option<String>| value.and_then(|v| v.trim().parse::<i64>().ok());
        Self {
            page: number(raw.page),
            limit: number(raw.limit),
        }
    }
}

/// Validated pagination window.
///
/// - Page is clamped to a minimum of 1
/// - A limit outside `1..=max_limit` falls back to the default limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, default_limit: u32, max_limit: u32) -> Self {
        let limit = match u32::try_from(limit) {
            Ok(limit) if (1..=max_limit).contains(&limit) => limit,
            _ => default_limit,
        };
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total: i64) -> Self {
        let limit = pagination.limit.max(1) as i64;
        Self {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}
