//! Derived-view pipeline shared by every list screen.
//!
//! Pipeline: Search → Categorical filters → Date range → Page slice → Summary
//!
//! Records keep the collection's insertion order; no sort is applied.
//! The summary over the filtered set feeds reports and exports, while
//! [`kpis`] summarizes the whole collection for the KPI cards.

mod page;
mod pipeline;
mod query;
mod summary;

pub use page::*;
pub use pipeline::*;
pub use query::*;
pub use summary::*;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::models::UnknownVariant;

/// A record type that list screens can search, filter and page.
pub trait Listable {
    /// Addressable fields for search and categorical filters.
    type Field: Copy + Eq + fmt::Debug + FromStr<Err = UnknownVariant> + 'static;

    /// Fields matched by the free-text search box.
    const SEARCH_FIELDS: &'static [Self::Field];

    /// Shown instead of the table when nothing matches.
    const EMPTY_MESSAGE: &'static str;

    /// Stable identifier within the collection.
    fn id(&self) -> &str;

    /// Display text of a field, `None` when the field is unset.
    fn text(&self, field: Self::Field) -> Option<Cow<'_, str>>;

    /// The designated date compared against date-range filters.
    fn date(&self) -> Option<NaiveDate>;
}
