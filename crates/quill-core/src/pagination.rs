//! Pagination over ordered result sets.
//!
//! Out-of-range page numbers clamp to the nearest valid page instead of
//! erroring; an empty result set still has one (empty) page.

use serde::{Deserialize, Serialize};

/// A request for one page of results. Page numbers are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub number: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(number: u64, per_page: u64) -> Self {
        Self { number, per_page }
    }
}

/// One page of items plus the bookkeeping listings display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Resolves a requested page number against a known total.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    pub total_items: u64,
    pub per_page: u64,
}

impl Paginator {
    pub fn new(total_items: u64, per_page: u64) -> Self {
        // A zero page size would divide by zero below; treat it as 1.
        Self {
            total_items,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; at least 1 even when there are no items.
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.per_page).max(1)
    }

    /// Clamp a requested 1-based page number into the valid range.
    pub fn clamp(&self, requested: u64) -> u64 {
        requested.clamp(1, self.total_pages())
    }

    /// Row offset of the given (already clamped) page.
    pub fn offset(&self, page: u64) -> u64 {
        (self.clamp(page) - 1) * self.per_page
    }

    /// Assemble a `Page` from the items fetched for the clamped page.
    pub fn page<T>(&self, items: Vec<T>, requested: u64) -> Page<T> {
        Page {
            items,
            number: self.clamp(requested),
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages(),
        }
    }
}
