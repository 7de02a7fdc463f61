//! Paginator: slices an ordered result into fixed-size pages.
//!
//! Out-of-range requests are clamped silently; the clamped page is reported
//! back so prev/next controls can update.

use std::ops::Range;

/// Result of slicing one page out of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Page actually shown, within `[1, total_pages]`
    pub page: usize,
    /// Always at least 1, even for an empty sequence
    pub total_pages: usize,
    /// Zero-based, end-exclusive bounds into the ordered sequence
    pub range: Range<usize>,
}

impl PageWindow {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `max(1, ceil(count / page_size))`. A zero page size is treated as 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a possibly out-of-range, possibly non-positive page request.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let upper = i64::try_from(total_pages).unwrap_or(i64::MAX);
    // clamp keeps the value within [1, upper] so the cast back cannot truncate
    requested.clamp(1, upper.max(1)) as usize
}

/// Computes the window for `requested` over `count` items.
pub fn window(count: usize, page_size: usize, requested: i64) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(count, page_size);
    let page = clamp_page(requested, total_pages);
    let start = ((page - 1) * page_size).min(count);
    let end = (start + page_size).min(count);

    PageWindow {
        page,
        total_pages,
        range: start..end,
    }
}

/// Returns the visible slice with the clamped page and page count.
pub fn paginate<T>(ordered: &[T], page_size: usize, requested: i64) -> (&[T], usize, usize) {
    let win = window(ordered.len(), page_size, requested);
    (&ordered[win.range.clone()], win.page, win.total_pages)
}
