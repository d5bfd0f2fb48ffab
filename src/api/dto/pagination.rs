//! Pagination query parameters and paged response envelope.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

/// Default number of items per page.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// Pagination query parameters (`?page=0&limit=10`).
///
/// Pages are zero-based.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub offset: i64,
    pub limit: i64,
}

impl PaginationParams {
    /// Validates the parameters and converts them to an offset/limit pair.
    ///
    /// # Defaults
    ///
    /// - `page`: 0
    /// - `limit`: [`DEFAULT_LIMIT`]
    ///
    /// # Errors
    ///
    /// Returns a message if `limit` is outside `1..=MAX_LIMIT`.
    pub fn window(&self) -> Result<PageWindow, String> {
        let page = self.page.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {MAX_LIMIT}"));
        }

        Ok(PageWindow {
            page,
            offset: i64::from(page) * i64::from(limit),
            limit: i64::from(limit),
        })
    }
}

/// One page of results with navigation flags.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub is_first: bool,
    pub is_last: bool,
    pub is_previous: bool,
    pub is_next: bool,
    pub current_page: u32,
    pub total_count: i64,
}

impl<T> Page<T> {
    /// Wraps `content` fetched for `window` out of `total_count` items.
    pub fn new(content: Vec<T>, window: PageWindow, total_count: i64) -> Self {
        let is_last = window.offset + content.len() as i64 >= total_count;

        Self {
            is_first: window.page == 0,
            is_last,
            is_previous: window.page > 0,
            is_next: !is_last,
            current_page: window.page,
            total_count,
            content,
        }
    }
}
