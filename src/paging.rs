//! Paging arguments and the paged result shape.

use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;
use crate::constants::{
    DEFAULT_PAGE_INDEX, DEFAULT_PAGE_JUMP, DEFAULT_PAGE_SIZE, ERROR_INVALID_PAGE_INDEX, ERROR_INVALID_PAGE_SIZE,
    ERROR_PAGE_OUT_OF_RANGE, ERROR_PAGE_SIZE_TOO_LARGE,
};
use crate::error::{Result, UnitOfWorkError};

/// Which page to fetch. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_index: u64,
    pub page_size: u64,
    /// Pages shown on each side of the current one by [`PagedList::page_range`]
    pub page_jump: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: DEFAULT_PAGE_SIZE,
            page_jump: DEFAULT_PAGE_JUMP,
        }
    }
}

impl PageRequest {
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size,
            ..Self::default()
        }
    }

    /// First page sized by the configured defaults.
    pub fn from_config(paging: &PagingConfig) -> Self {
        Self {
            page_index: DEFAULT_PAGE_INDEX,
            page_size: paging.default_page_size,
            page_jump: paging.default_page_jump,
        }
    }

    pub fn page(mut self, page_index: u64) -> Self {
        self.page_index = page_index;
        self
    }

    pub fn jump(mut self, page_jump: u64) -> Self {
        self.page_jump = page_jump;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_index < 1 {
            return Err(UnitOfWorkError::new(ERROR_INVALID_PAGE_INDEX));
        }
        if self.page_size == 0 {
            return Err(UnitOfWorkError::new(ERROR_INVALID_PAGE_SIZE));
        }
        // Limit and offset are bound as signed 64-bit integers
        let in_range = |value: u64| value <= i64::MAX as u64;
        let offset = self.zero_based().checked_mul(self.page_size);
        if !in_range(self.page_size) || !offset.is_some_and(in_range) {
            return Err(UnitOfWorkError::new(ERROR_PAGE_OUT_OF_RANGE));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), also bounding `page_size` by the
    /// configured `max_page_size`.
    pub fn validate_with(&self, paging: &PagingConfig) -> Result<()> {
        self.validate()?;
        if self.page_size > paging.max_page_size {
            return Err(UnitOfWorkError::new(ERROR_PAGE_SIZE_TOO_LARGE));
        }
        Ok(())
    }

    /// Zero-based page number as SeaORM's paginator expects it.
    pub(crate) fn zero_based(&self) -> u64 {
        self.page_index.saturating_sub(1)
    }
}

/// A slice of query results plus paging metadata.
///
/// Recomputed on every call; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page_index: u64,
    pub page_size: u64,
    pub page_jump: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, page: PageRequest, total_count: u64) -> Self {
        Self {
            items,
            page_index: page.page_index,
            page_size: page.page_size,
            page_jump: page.page_jump,
            total_count,
            total_pages: total_count.div_ceil(page.page_size.max(1)),
        }
    }

    pub fn empty(page: PageRequest) -> Self {
        Self::new(Vec::new(), page, 0)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index < self.total_pages
    }

    /// Page numbers within `page_jump` of the current page, clamped to the
    /// pages that exist. Always contains at least page 1.
    pub fn page_range(&self) -> std::ops::RangeInclusive<u64> {
        let last = self.total_pages.max(1);
        let current = self.page_index.clamp(1, last);
        let start = current.saturating_sub(self.page_jump).max(1);
        let end = current.saturating_add(self.page_jump).min(last);
        start..=end
    }

    /// Converts the items, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> PagedList<U>
    where
        F: FnMut(T) -> U,
    {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            page_jump: self.page_jump,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for PagedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
