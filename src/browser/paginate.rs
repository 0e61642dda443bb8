//! Fixed-size pages over an ordered result.

use std::num::NonZeroUsize;

/// Number of pages needed for `count` rows. Never less than one.
pub fn total_pages(count: usize, page_size: NonZeroUsize) -> usize {
    count.div_ceil(page_size.get()).max(1)
}

/// Clamps a 1-based page number into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of rows plus the metadata the pagination controls need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// 1-based page number after clamping.
    pub number: usize,
    pub total_pages: usize,
    /// Rows across all pages.
    pub total_rows: usize,
    pub page_size: NonZeroUsize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based `(first, last)` row numbers on this page, `(0, 0)` when empty.
    pub fn showing(&self) -> (usize, usize) {
        if self.rows.is_empty() {
            return (0, 0);
        }
        let first = (self.number - 1) * self.page_size.get() + 1;
        (first, first + self.rows.len() - 1)
    }
}

/// Slices `rows` into the requested page. Out-of-range page numbers are
/// clamped to the nearest valid page.
pub fn paginate<T>(rows: &[T], page: usize, page_size: NonZeroUsize) -> Page<'_, T> {
    let total_pages = total_pages(rows.len(), page_size);
    let number = clamp_page(page, total_pages);
    let start = (number - 1) * page_size.get();
    let end = (start + page_size.get()).min(rows.len());

    Page {
        rows: &rows[start.min(end)..end],
        number,
        total_pages,
        total_rows: rows.len(),
        page_size,
    }
}
