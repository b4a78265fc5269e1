//! Pagination for candidate listing
//!
//! Fixed page size of 10, 1-indexed pages.

use serde::Serialize;

/// Page size constant for all listing
pub const PAGE_SIZE: usize = 10;

/// One page of a record set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Total number of pages for `total` items
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Slice `items` to the requested page
///
/// Page numbers below 1 are treated as 1. A page past the end yields an
/// empty `data` slice but still echoes the requested page number.
///
/// # Examples
/// ```
/// use intake_common::pagination::paginate;
///
/// let items: Vec<u32> = (0..25).collect();
/// let p = paginate(&items, 3);
/// assert_eq!(p.data, vec![20, 21, 22, 23, 24]);
/// assert_eq!(p.total_pages, 3);
/// ```
pub fn paginate<T: Clone>(items: &[T], requested_page: usize) -> Page<T> {
    let page = requested_page.max(1);
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(items.len());
    let end = start.saturating_add(PAGE_SIZE).min(items.len());

    Page {
        data: items[start..end].to_vec(),
        total: items.len(),
        page,
        total_pages: total_pages(items.len()),
    }
}
