//! Pagination utilities for service layer
//!
//! `Pagination` normalizes 0-based page requests; `Page` is the slice handed
//! back to callers together with its totals.

use serde::Serialize;

use crate::errors::ServiceError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 0-based page index
    pub page: u64,
    /// items per page; 0 selects the default
    pub size: u64,
}

impl Pagination {
    /// Returns `(page_index, page_size)` with the size defaulted and capped.
    ///
    /// Fails when the row offset `page * size` does not fit a signed 64-bit
    /// SQL offset.
    pub fn normalize(self) -> Result<(u64, u64), ServiceError> {
        let size = match self.size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        match self.page.checked_mul(size) {
            Some(offset) if offset <= i64::MAX as u64 => Ok((self.page, size)),
            _ => Err(ServiceError::Validation(format!("page {} is out of range for size {}", self.page, size))),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 0, size: DEFAULT_PAGE_SIZE } }
}

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One page of results plus totals
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_elements: u64, page: u64, size: u64) -> Self {
        let total_pages = if size == 0 { 0 } else { total_elements.div_ceil(size) };
        Self { items, total_elements, total_pages, page, size }
    }
}
