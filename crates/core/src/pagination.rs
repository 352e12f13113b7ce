//! Page bounds and pagination metadata.
//!
//! Arithmetic only; the database layer supplies `total` and the page slice.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Default page size for the inspection list.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Smallest accepted page size.
pub const MIN_PER_PAGE: i64 = 1;

/// Largest accepted page size.
pub const MAX_PER_PAGE: i64 = 100;

/// Fixed page size of the reference-entity lookup (`GET /smp/list`).
pub const LOOKUP_PAGE_SIZE: i64 = 20;

/// A clamped `(page, per_page)` pair.
///
/// Construction always clamps, even when the caller already validated:
/// `page >= 1` and `per_page` within [`MIN_PER_PAGE`]..=[`MAX_PER_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE),
        }
    }

    /// Build from optional query-string values, falling back to page 1 and
    /// [`DEFAULT_PER_PAGE`].
    pub fn from_optional(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Pagination metadata derived from `(total, page, per_page)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub page_count: i64,
    pub range_from: i64,
    pub range_to: i64,
}

impl PageMeta {
    /// Compute the metadata for one page.
    ///
    /// - `page_count = ceil(total / per_page)`, `0` when `per_page` is `0`.
    /// - `range_from = (page - 1) * per_page + 1` when `total > 0`, else `0`.
    /// - `range_to = min(page * per_page, total)`.
    ///
    /// Products saturate, so an absurd `page` yields an empty range past the
    /// end instead of overflowing.
    pub fn compute(total: i64, page: i64, per_page: i64) -> Self {
        let total = total.max(0);
        let page_count = if per_page > 0 {
            total.saturating_add(per_page - 1) / per_page
        } else {
            0
        };
        let range_from = if total > 0 {
            page.saturating_sub(1).saturating_mul(per_page).saturating_add(1)
        } else {
            0
        };
        let range_to = page.saturating_mul(per_page).min(total);

        Self {
            total,
            page,
            per_page,
            page_count,
            range_from,
            range_to,
        }
    }

    pub fn for_request(total: i64, request: PageRequest) -> Self {
        Self::compute(total, request.page(), request.per_page())
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// One page of items together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            meta: PageMeta::for_request(total, request),
        }
    }

    /// An empty page; used before anything has been delivered.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}

// ---------------------------------------------------------------------------
// Lookup pages
// ---------------------------------------------------------------------------

/// `{ items, total, page, hasMore }` page used by the reference-entity lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupPage<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub has_more: bool,
}

impl<T> LookupPage<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64) -> Self {
        Self {
            items,
            total,
            page,
            has_more: has_more(total, page, LOOKUP_PAGE_SIZE),
        }
    }
}

/// Whether rows remain past `page` at a fixed `limit`.
pub fn has_more(total: i64, page: i64, limit: i64) -> bool {
    total > page.saturating_mul(limit)
}
