//! Feed pagination.
//!
//! Every feed shares the same rules: fixed page size, 1-based page
//! numbers, and forgiving parsing. A missing or unparseable page
//! parameter means page 1; a page past the end is clamped to the last
//! page. An empty feed still has one (empty) page, so `total_pages` is
//! never zero.

use serde::Serialize;

/// Fixed number of items per feed page.
pub const PAGE_SIZE: u64 = 10;

/// One page of a feed, with navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page, in feed order.
    pub items: Vec<T>,
    /// 1-based index of this page.
    pub index: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build a page from fetched items and the overall item count.
    #[must_use]
    pub fn new(items: Vec<T>, index: u64, total_items: u64) -> Self {
        let total_pages = total_pages(total_items);
        Self {
            items,
            index,
            total_pages,
            total_items,
            has_next: index < total_pages,
            has_previous: index > 1,
        }
    }

    /// Map the items of this page, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            index: self.index,
            total_pages: self.total_pages,
            total_items: self.total_items,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Parse a raw `page` query parameter. Anything that is not a positive
/// integer falls back to page 1.
#[must_use]
pub fn parse_page_param(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1)
}

/// Number of pages needed for `total_items` items. Never zero.
#[must_use]
pub const fn total_pages(total_items: u64) -> u64 {
    let pages = total_items.div_ceil(PAGE_SIZE);
    if pages == 0 { 1 } else { pages }
}

/// Clamp a requested page into the valid `1..=total_pages` range.
#[must_use]
pub const fn clamp_page(requested: u64, total_pages: u64) -> u64 {
    if requested < 1 {
        1
    } else if requested > total_pages {
        total_pages
    } else {
        requested
    }
}
