//! Filter state for a list screen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::page::PageInfo;
use super::Listable;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Accepted value of a categorical filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    /// No constraint (the "all" option of a dropdown)
    All,
    /// Field text must equal this value (ASCII case-insensitive)
    Only(String),
}

impl FilterValue {
    /// Parse dropdown input; empty input and "all" mean no constraint.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            FilterValue::All
        } else {
            FilterValue::Only(value.to_string())
        }
    }

    pub fn accepts(&self, text: Option<&str>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(expected) => {
                text.is_some_and(|t| t.trim().eq_ignore_ascii_case(expected))
            }
        }
    }
}

/// One categorical filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<F> {
    pub field: F,
    pub value: FilterValue,
}

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Records without a date only pass an unbounded range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Search, filter and paging state of one list screen.
///
/// Every setter that changes what matches resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery<F> {
    search: String,
    search_fields: Vec<F>,
    filters: Vec<Filter<F>>,
    date_range: DateRange,
    page: usize,
    page_size: usize,
}

impl<F> Default for ViewQuery<F> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<F> ViewQuery<F> {
    /// Unfiltered query on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            search_fields: Vec::new(),
            filters: Vec::new(),
            date_range: DateRange::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &[Filter<F>] {
        &self.filters
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// Requested 1-indexed page (clamped when the view is derived).
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Set the search term and go back to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    /// Restrict search to specific fields instead of the record's defaults.
    pub fn set_search_fields(&mut self, fields: Vec<F>) {
        self.search_fields = fields;
        self.page = 1;
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.date_range = range;
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search.clear();
        self.date_range = DateRange::default();
        self.page = 1;
    }

    /// Request a page. Out-of-range requests are refused rather than
    /// wrapped; returns whether the page changed.
    pub fn go_to_page(&mut self, page: usize, info: &PageInfo) -> bool {
        if page < 1 || page > info.total_pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self, info: &PageInfo) -> bool {
        if !info.has_next() {
            return false;
        }
        self.page = info.number + 1;
        true
    }

    pub fn previous_page(&mut self, info: &PageInfo) -> bool {
        if !info.has_previous() {
            return false;
        }
        self.page = info.number - 1;
        true
    }

    /// Builder form of [`set_search`](Self::set_search).
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.set_date_range(range);
        self
    }

    /// Set the requested page directly, e.g. when restoring saved state.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }
}

impl<F: Copy + Eq> ViewQuery<F> {
    /// Set (or replace) the filter on `field` and go back to page 1.
    pub fn set_filter(&mut self, field: F, value: FilterValue) {
        self.filters.retain(|f| f.field != field);
        if value != FilterValue::All {
            self.filters.push(Filter { field, value });
        }
        self.page = 1;
    }

    pub fn with_filter(mut self, field: F, value: &str) -> Self {
        self.set_filter(field, FilterValue::parse(value));
        self
    }

    /// Whether a record satisfies search AND all filters AND the date range.
    pub fn matches<T>(&self, record: &T) -> bool
    where
        T: Listable<Field = F>,
    {
        self.matches_search(record)
            && self
                .filters
                .iter()
                .all(|f| f.value.accepts(record.text(f.field).as_deref()))
            && self.date_range.contains(record.date())
    }

    fn matches_search<T>(&self, record: &T) -> bool
    where
        T: Listable<Field = F>,
    {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let fields: &[F] = if self.search_fields.is_empty() {
            T::SEARCH_FIELDS
        } else {
            &self.search_fields
        };
        fields.iter().any(|field| {
            record
                .text(*field)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_value_parse() {
        assert_eq!(FilterValue::parse("all"), FilterValue::All);
        assert_eq!(FilterValue::parse("ALL"), FilterValue::All);
        assert_eq!(FilterValue::parse("  "), FilterValue::All);
        assert_eq!(FilterValue::parse("Paid"), FilterValue::Only("Paid".into()));
    }

    #[test]
    fn test_filter_value_accepts() {
        let only = FilterValue::Only("Pending Payment".into());
        assert!(only.accepts(Some("pending payment")));
        assert!(!only.accepts(Some("Pending")));
        assert!(!only.accepts(None));
        assert!(FilterValue::All.accepts(None));
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(Some(date(2025, 1, 1)), Some(date(2025, 1, 31)));
        assert!(range.contains(Some(date(2025, 1, 1))));
        assert!(range.contains(Some(date(2025, 1, 31))));
        assert!(!range.contains(Some(date(2025, 2, 1))));
        assert!(!range.contains(None));

        let open_start = DateRange::new(None, Some(date(2025, 1, 31)));
        assert!(open_start.contains(Some(date(1999, 1, 1))));
        assert!(DateRange::default().contains(None));
    }

    #[test]
    fn test_setters_reset_page() {
        let mut query: ViewQuery<u8> = ViewQuery::new(5).with_page(3);
        assert_eq!(query.page(), 3);
        query.set_search("ama");
        assert_eq!(query.page(), 1);

        let mut query: ViewQuery<u8> = ViewQuery::new(5).with_page(4);
        query.set_filter(1, FilterValue::parse("Active"));
        assert_eq!(query.page(), 1);

        let mut query: ViewQuery<u8> = ViewQuery::new(5).with_page(2);
        query.set_date_range(DateRange::day(date(2025, 1, 1)));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_set_filter_replaces_and_all_clears() {
        let mut query: ViewQuery<u8> = ViewQuery::new(5);
        query.set_filter(1, FilterValue::parse("Active"));
        query.set_filter(1, FilterValue::parse("Admitted"));
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].value, FilterValue::Only("Admitted".into()));

        query.set_filter(1, FilterValue::All);
        assert!(query.filters().is_empty());
    }

    #[test]
    fn test_navigation_never_wraps() {
        let mut query: ViewQuery<u8> = ViewQuery::new(10);
        let info = PageInfo::new(25, 10, 1);
        assert!(!query.previous_page(&info));
        assert!(query.next_page(&info));
        assert_eq!(query.page(), 2);

        let last = PageInfo::new(25, 10, 3);
        let mut query: ViewQuery<u8> = ViewQuery::new(10).with_page(3);
        assert!(!query.next_page(&last));
        assert!(!query.go_to_page(4, &last));
        assert!(!query.go_to_page(0, &last));
        assert_eq!(query.page(), 3);
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let query: ViewQuery<u8> = ViewQuery::new(0);
        assert_eq!(query.page_size(), 1);
    }
}
