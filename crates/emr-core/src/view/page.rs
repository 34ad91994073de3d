//! Pagination arithmetic.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Position of the current page within a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number, clamped into `1..=total_pages`
    pub number: usize,
    /// Rows per page (at least 1)
    pub size: usize,
    /// `ceil(total_items / size)`, 0 for an empty list
    pub total_pages: usize,
    /// Number of matching records across all pages
    pub total_items: usize,
}

impl PageInfo {
    pub fn new(total_items: usize, size: usize, requested: usize) -> Self {
        let size = size.max(1);
        let total_pages = total_items.div_ceil(size);
        Self {
            number: requested.clamp(1, total_pages.max(1)),
            size,
            total_pages,
            total_items,
        }
    }

    /// Index range of this page within the filtered list.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.number - 1) * self.size).min(self.total_items);
        let end = (start + self.size).min(self.total_items);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Pagination controls are hidden for zero or one page.
    pub fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(PageInfo::new(0, 10, 1).total_pages, 0);
        assert_eq!(PageInfo::new(1, 10, 1).total_pages, 1);
        assert_eq!(PageInfo::new(10, 10, 1).total_pages, 1);
        assert_eq!(PageInfo::new(11, 10, 1).total_pages, 2);
    }

    #[test]
    fn test_range_last_page_partial() {
        let info = PageInfo::new(23, 10, 3);
        assert_eq!(info.range(), 20..23);
        assert!(info.has_previous());
        assert!(!info.has_next());
    }

    #[test]
    fn test_clamps_out_of_range_requests() {
        assert_eq!(PageInfo::new(23, 10, 9).number, 3);
        assert_eq!(PageInfo::new(23, 10, 0).number, 1);
    }

    #[test]
    fn test_empty_list() {
        let info = PageInfo::new(0, 10, 4);
        assert_eq!(info.number, 1);
        assert_eq!(info.range(), 0..0);
        assert!(info.is_empty());
        assert!(!info.shows_controls());
        assert!(!info.has_next());
    }
}
