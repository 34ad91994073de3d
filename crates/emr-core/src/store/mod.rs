//! In-memory entity store.
//!
//! [`Hospital`] owns one insertion-ordered collection per entity type and
//! exposes the add/update/delete contract every screen relies on. It is a
//! plain value: callers own it (or share it behind a lock) and pass it
//! explicitly. All validation happens before a collection is touched, so a
//! rejected call never leaves a partial mutation behind.

mod attendance;
mod beds;
mod patients;
mod pharmacy;
mod staff;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::EmrConfig;
use crate::models::{BedCategory, Invoice, Patient, Sale, Staff, StaffAttendance};

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl StoreError {
    /// Validation failures are shown inline on the form that caused them.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StoreError::NotFound { .. })
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Log and build a not-found error.
pub(crate) fn not_found(entity: &'static str, id: &str) -> StoreError {
    tracing::warn!(entity, id, "update or delete on a missing record");
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

/// Reject blank required text.
pub(crate) fn require(field: &'static str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::MissingField { field });
    }
    Ok(())
}

/// Trim optional text; blank becomes `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Monotonic generator for human-readable IDs. Values are never reused,
/// even after the record that received them is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    prefix: String,
    width: usize,
    next: u64,
}

impl IdSequence {
    pub fn new(prefix: impl Into<String>, width: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            next: 1,
        }
    }

    /// `PREFIX-0001`
    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{:0width$}", self.prefix, self.next, width = self.width);
        self.next += 1;
        id
    }

    /// `PREFIX-2025-00001`
    pub fn next_id_for_year(&mut self, year: i32) -> String {
        let id = format!(
            "{}-{}-{:0width$}",
            self.prefix,
            year,
            self.next,
            width = self.width
        );
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone)]
struct Sequences {
    patient: IdSequence,
    staff: IdSequence,
    bed: IdSequence,
    attendance: IdSequence,
    invoice: IdSequence,
    sale: IdSequence,
}

impl Sequences {
    fn from_config(config: &EmrConfig) -> Self {
        let prefixes = &config.id_prefixes;
        Self {
            patient: IdSequence::new(prefixes.patient.clone(), 5),
            staff: IdSequence::new(prefixes.staff.clone(), 4),
            bed: IdSequence::new(prefixes.bed.clone(), 3),
            attendance: IdSequence::new(prefixes.attendance.clone(), 6),
            invoice: IdSequence::new(prefixes.invoice.clone(), 6),
            sale: IdSequence::new(prefixes.sale.clone(), 6),
        }
    }
}

/// All entity collections of one hospital session.
#[derive(Debug, Clone)]
pub struct Hospital {
    config: EmrConfig,
    fixed_date: Option<NaiveDate>,
    sequences: Sequences,
    patients: Vec<Patient>,
    staff: Vec<Staff>,
    attendance: Vec<StaffAttendance>,
    beds: Vec<BedCategory>,
    invoices: Vec<Invoice>,
    sales: Vec<Sale>,
}

impl Default for Hospital {
    fn default() -> Self {
        Self::new(EmrConfig::default())
    }
}

impl Hospital {
    /// Create an empty store.
    pub fn new(config: EmrConfig) -> Self {
        Self {
            sequences: Sequences::from_config(&config),
            config,
            fixed_date: None,
            patients: Vec::new(),
            staff: Vec::new(),
            attendance: Vec::new(),
            beds: Vec::new(),
            invoices: Vec::new(),
            sales: Vec::new(),
        }
    }

    /// Pin "today" (registration dates, file-number years) to a fixed date.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn config(&self) -> &EmrConfig {
        &self.config
    }

    /// The store's notion of today.
    pub fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(crate::models::today)
    }
}
