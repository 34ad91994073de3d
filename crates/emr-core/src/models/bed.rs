//! Bed and room category models.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{label_key, now_rfc3339, UnknownVariant};
use crate::view::Listable;

/// A ward or room category with a fixed bed count.
///
/// Invariant: `occupied_beds <= total_beds`. Availability is always derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BedCategory {
    /// Category ID, e.g. `BED-001`
    pub id: String,
    pub category_name: String,
    pub total_beds: u32,
    pub occupied_beds: u32,
    pub price_per_day: Decimal,
    pub description: Option<String>,
    /// Date the category was set up (used for date-range filtering)
    pub created_on: NaiveDate,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl BedCategory {
    pub fn available_beds(&self) -> u32 {
        self.total_beds.saturating_sub(self.occupied_beds)
    }

    pub fn is_full(&self) -> bool {
        self.available_beds() == 0
    }

    /// Occupancy as a percentage, 0.0 for a category with no beds.
    pub fn occupancy_rate(&self) -> f64 {
        crate::view::percentage(self.occupied_beds as usize, self.total_beds as usize)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

/// Add-category form input. Counts are signed so out-of-range form input
/// can be reported instead of wrapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBedCategory {
    pub category_name: String,
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub price_per_day: Decimal,
    pub description: Option<String>,
}

/// Partial edit of a bed category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BedCategoryUpdate {
    pub category_name: Option<String>,
    pub total_beds: Option<i64>,
    pub occupied_beds: Option<i64>,
    pub price_per_day: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BedField {
    Id,
    CategoryName,
    Description,
    /// "Available" or "Full"
    Availability,
}

impl FromStr for BedField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "id" => Ok(BedField::Id),
            "categoryname" | "name" | "category" => Ok(BedField::CategoryName),
            "description" => Ok(BedField::Description),
            "availability" => Ok(BedField::Availability),
            _ => Err(UnknownVariant::new("bed field", s)),
        }
    }
}

impl Listable for BedCategory {
    type Field = BedField;

    const SEARCH_FIELDS: &'static [BedField] = &[BedField::CategoryName, BedField::Description];
    const EMPTY_MESSAGE: &'static str = "No bed categories found";

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: BedField) -> Option<Cow<'_, str>> {
        match field {
            BedField::Id => Some(Cow::Borrowed(&self.id)),
            BedField::CategoryName => Some(Cow::Borrowed(&self.category_name)),
            BedField::Description => self.description.as_deref().map(Cow::Borrowed),
            BedField::Availability => Some(Cow::Borrowed(if self.is_full() {
                "Full"
            } else {
                "Available"
            })),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.created_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_category(total: u32, occupied: u32) -> BedCategory {
        BedCategory {
            id: "BED-001".into(),
            category_name: "General Ward".into(),
            total_beds: total,
            occupied_beds: occupied,
            price_per_day: Decimal::new(15000, 2),
            description: None,
            created_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_available_beds_derived() {
        let category = make_category(20, 15);
        assert_eq!(category.available_beds(), 5);
        assert!(!category.is_full());
        assert_eq!(category.occupancy_rate(), 75.0);
    }

    #[test]
    fn test_empty_category_rate() {
        let category = make_category(0, 0);
        assert!(category.is_full());
        assert_eq!(category.occupancy_rate(), 0.0);
    }
}
