//! Types shared by several entities.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name any known variant of an enum or field set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// What was being parsed (e.g. "gender", "patient field")
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements `Display` (via `label()`) and lenient `FromStr` for a label enum.
macro_rules! impl_label_traits {
    ($ty:ty, $kind:literal, { $($key:literal => $variant:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match super::common::label_key(s).as_str() {
                    $($key => Ok($variant),)+
                    _ => Err($crate::models::UnknownVariant::new($kind, s)),
                }
            }
        }
    };
}

pub(crate) use impl_label_traits;

/// Normalize a label for lenient parsing ("On Leave", "on_leave", "on-leave").
pub(crate) fn label_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '/'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Gender as recorded on registration forms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl_label_traits!(Gender, "gender", {
    "male" => Gender::Male,
    "m" => Gender::Male,
    "female" => Gender::Female,
    "f" => Gender::Female,
    "other" => Gender::Other,
});

/// Current timestamp in RFC 3339 form.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a wall-clock time entered as `HH:MM` (24-hour).
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    let (hours, minutes) = s.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Format a clock time as `HH:MM`.
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
