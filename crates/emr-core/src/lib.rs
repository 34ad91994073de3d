//! Hospital EMR Core Library
//!
//! Registries, rosters, pharmacy reporting and bed management over an
//! in-memory, single-writer store.
//!
//! # Architecture
//!
//! ```text
//!   form input ──► validation ──► Hospital (entity store)
//!                                     │
//!                     ┌───────────────┼────────────────┐
//!                     │               │                │
//!                     ▼               ▼                ▼
//!              patients/staff   attendance day   beds/pharmacy
//!                     │        (stored ∪ absent)       │
//!                     └───────────────┬────────────────┘
//!                                     │
//!              search ─► filters ─► date range ─► page ─► summary
//!                                     │
//!                     ┌───────────────┼────────────────┐
//!                     ▼               ▼                ▼
//!                 list page       CSV export      HTML report
//!                                                      │
//!                                              ReportPresenter
//! ```
//!
//! KPI cards summarize the whole collection; reports and exports summarize
//! the filtered set.
//!
//! # Modules
//!
//! - [`config`]: JSON configuration (letterhead, id prefixes, shift rules)
//! - [`models`]: Domain types (Patient, Staff, StaffAttendance, BedCategory, Invoice, Sale)
//! - [`store`]: The [`Hospital`] entity store and its mutators
//! - [`view`]: Derived-view pipeline, pagination and per-screen summaries
//! - [`export`]: CSV and printable HTML reports
//! - [`deferred`]: Cancellable delayed mutations

pub mod config;
pub mod deferred;
pub mod export;
mod ffi;
pub mod models;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use config::{EmrConfig, Letterhead};
pub use ffi::*;
pub use models::{
    AttendanceStatus, BedCategory, Invoice, InvoiceStatus, LineItem, Patient, PatientStatus,
    PaymentMethod, Sale, Staff, StaffAttendance, StaffStatus,
};
pub use store::{Hospital, StoreError};
pub use view::{derive_view, kpis, ListView, ViewQuery};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use export::{ExportError, HtmlFilePresenter, Tabular};
use ffi::{parse_date_arg, parse_items, parse_label, summary_entries};
use models::{
    BedCategoryUpdate, NewBedCategory, NewInvoice, NewPatient, NewSale, NewStaff, PatientUpdate,
    StaffUpdate,
};
use view::Summarize;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum EmrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<StoreError> for EmrError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingField { .. } | StoreError::Invalid { .. } => {
                EmrError::InvalidInput(e.to_string())
            }
            StoreError::InvalidTransition(_) => EmrError::InvalidTransition(e.to_string()),
            StoreError::NotFound { .. } => EmrError::NotFound(e.to_string()),
            StoreError::Constraint(_) => EmrError::Constraint(e.to_string()),
        }
    }
}

impl From<models::UnknownVariant> for EmrError {
    fn from(e: models::UnknownVariant) -> Self {
        EmrError::InvalidInput(e.to_string())
    }
}

impl From<ExportError> for EmrError {
    fn from(e: ExportError) -> Self {
        EmrError::ExportError(e.to_string())
    }
}

impl From<config::ConfigError> for EmrError {
    fn from(e: config::ConfigError) -> Self {
        EmrError::ConfigError(e.to_string())
    }
}

impl From<deferred::DeferredError> for EmrError {
    fn from(e: deferred::DeferredError) -> Self {
        match e {
            deferred::DeferredError::Store(inner) => inner.into(),
            poisoned @ deferred::DeferredError::Poisoned => EmrError::LockPoisoned(poisoned.to_string()),
            other => EmrError::Cancelled(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for EmrError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        EmrError::LockPoisoned(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an empty EMR session with default configuration.
#[uniffi::export]
pub fn open_emr() -> Arc<EmrCore> {
    Arc::new(EmrCore::new(Hospital::default()))
}

/// Open an empty EMR session configured from a JSON string.
#[uniffi::export]
pub fn open_emr_with_config(config_json: String) -> Result<Arc<EmrCore>, EmrError> {
    let config = EmrConfig::from_json_str(&config_json)?;
    Ok(Arc::new(EmrCore::new(Hospital::new(config))))
}

/// Open an empty EMR session configured from a JSON file.
#[uniffi::export]
pub fn open_emr_with_config_file(path: String) -> Result<Arc<EmrCore>, EmrError> {
    let config = EmrConfig::from_path(&path)?;
    Ok(Arc::new(EmrCore::new(Hospital::new(config))))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct EmrCore {
    hospital: Arc<Mutex<Hospital>>,
    queries: Mutex<QueryMemory>,
}

impl EmrCore {
    pub fn new(hospital: Hospital) -> Self {
        Self {
            hospital: Arc::new(Mutex::new(hospital)),
            queries: Mutex::new(QueryMemory::default()),
        }
    }

    /// Shared handle for Rust hosts, e.g. to schedule
    /// [`deferred::PendingAction`]s against the same store.
    pub fn shared(&self) -> Arc<Mutex<Hospital>> {
        Arc::clone(&self.hospital)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Screen {
    Patients,
    Staff,
    Attendance,
    Beds,
    Invoices,
    Sales,
}

/// Last query served per list screen. Hosts send the whole query on every
/// call, so a changed search, filter, date range, page size or scope is
/// detected here and sends the screen back to page 1.
#[derive(Debug, Default)]
struct QueryMemory {
    last: HashMap<Screen, (String, FfiListQuery)>,
}

impl QueryMemory {
    fn settle(&mut self, screen: Screen, scope: &str, mut query: FfiListQuery) -> FfiListQuery {
        if let Some((last_scope, last)) = self.last.get(&screen) {
            if last_scope != scope || !last.same_criteria(&query) {
                query.page = 1;
            }
        }
        self.last.insert(screen, (scope.to_string(), query.clone()));
        query
    }
}

/// Matching records, page and filtered summary of one list screen.
struct Listing<U> {
    items: Vec<U>,
    page: FfiPageInfo,
    summary: Vec<FfiSummaryEntry>,
    empty_message: Option<String>,
}

fn listing<T, U>(records: &[T], query: FfiListQuery, page_size: usize) -> Result<Listing<U>, EmrError>
where
    T: Summarize + Clone,
    U: From<T>,
{
    let query = query.into_query::<T>(page_size)?;
    let view = derive_view(records, &query);
    Ok(Listing {
        items: view.page_items().iter().map(|r| U::from((*r).clone())).collect(),
        page: view.page().into(),
        summary: summary_entries(view.summary()),
        empty_message: view.empty_message().map(str::to_string),
    })
}

fn csv_file<T: Tabular>(records: &[T], query: FfiListQuery, page_size: usize, today: NaiveDate) -> Result<FfiExportFile, EmrError> {
    let query = query.into_query::<T>(page_size)?;
    let view = derive_view(records, &query);
    Ok(export::export_csv(&view, today).into())
}

fn report<T: Tabular>(
    records: &[T],
    query: FfiListQuery,
    letterhead: &Letterhead,
    page_size: usize,
    today: NaiveDate,
) -> Result<export::ReportDocument, EmrError> {
    let query = query.into_query::<T>(page_size)?;
    let view = derive_view(records, &query);
    Ok(export::render_report(letterhead, &view, today))
}

#[uniffi::export]
impl EmrCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// One page of the patient registry.
    pub fn list_patients(&self, query: FfiListQuery) -> Result<FfiPatientPage, EmrError> {
        let query = self.settle_query(Screen::Patients, "", query)?;
        let hospital = self.hospital.lock()?;
        let listing: Listing<FfiPatient> = listing(hospital.patients(), query, hospital.config().page_size)?;
        Ok(FfiPatientPage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    /// KPI cards over every registered patient.
    pub fn patient_kpis(&self) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(hospital.patients())))
    }

    pub fn get_patient(&self, file_number: String) -> Result<Option<FfiPatient>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(hospital.get_patient(&file_number).cloned().map(|p| p.into()))
    }

    /// Members linked to a Family file.
    pub fn family_members(&self, file_number: String) -> Result<Vec<FfiPatient>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(hospital
            .family_members(&file_number)
            .into_iter()
            .map(|p| p.clone().into())
            .collect())
    }

    pub fn register_patient(&self, form: FfiNewPatient) -> Result<FfiPatient, EmrError> {
        let form = NewPatient::try_from(form)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.register_patient(form)?.into())
    }

    pub fn update_patient(&self, file_number: String, update: FfiPatientUpdate) -> Result<FfiPatient, EmrError> {
        let update = PatientUpdate::try_from(update)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.update_patient(&file_number, update)?.into())
    }

    pub fn mark_patient_deceased(&self, file_number: String, date_of_death: String) -> Result<FfiPatient, EmrError> {
        let date = parse_date_arg("date_of_death", &date_of_death)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.mark_patient_deceased(&file_number, date)?.into())
    }

    pub fn delete_patient(&self, file_number: String) -> Result<(), EmrError> {
        let mut hospital = self.hospital.lock()?;
        hospital.delete_patient(&file_number)?;
        Ok(())
    }

    // =========================================================================
    // Staff Operations
    // =========================================================================

    pub fn list_staff(&self, query: FfiListQuery) -> Result<FfiStaffPage, EmrError> {
        let query = self.settle_query(Screen::Staff, "", query)?;
        let hospital = self.hospital.lock()?;
        let listing: Listing<FfiStaff> = listing(hospital.staff(), query, hospital.config().page_size)?;
        Ok(FfiStaffPage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    pub fn staff_kpis(&self) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(hospital.staff())))
    }

    pub fn get_staff(&self, id: String) -> Result<Option<FfiStaff>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(hospital.get_staff(&id).cloned().map(|s| s.into()))
    }

    pub fn add_staff(&self, form: FfiNewStaff) -> Result<FfiStaff, EmrError> {
        let form = NewStaff::try_from(form)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.add_staff(form)?.into())
    }

    pub fn update_staff(&self, id: String, update: FfiStaffUpdate) -> Result<FfiStaff, EmrError> {
        let update = StaffUpdate::try_from(update)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.update_staff(&id, update)?.into())
    }

    pub fn deactivate_staff(&self, id: String) -> Result<FfiStaff, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.deactivate_staff(&id)?.into())
    }

    pub fn reactivate_staff(&self, id: String) -> Result<FfiStaff, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.reactivate_staff(&id)?.into())
    }

    pub fn begin_leave(&self, id: String) -> Result<FfiStaff, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.begin_leave(&id)?.into())
    }

    pub fn end_leave(&self, id: String) -> Result<FfiStaff, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.end_leave(&id)?.into())
    }

    pub fn resign_staff(&self, id: String) -> Result<FfiStaff, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.resign_staff(&id)?.into())
    }

    pub fn delete_staff(&self, id: String) -> Result<(), EmrError> {
        let mut hospital = self.hospital.lock()?;
        hospital.delete_staff(&id)?;
        Ok(())
    }

    // =========================================================================
    // Attendance Operations
    // =========================================================================

    /// One page of the roster for `date`, including synthetic Absent entries.
    pub fn list_attendance(&self, date: String, query: FfiListQuery) -> Result<FfiAttendancePage, EmrError> {
        let query = self.settle_query(Screen::Attendance, &date, query)?;
        let date = parse_date_arg("date", &date)?;
        let hospital = self.hospital.lock()?;
        let day = hospital.attendance_for_day(date);
        let listing: Listing<FfiAttendance> = listing(&day, query, hospital.config().page_size)?;
        Ok(FfiAttendancePage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    pub fn attendance_kpis(&self, date: String) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let date = parse_date_arg("date", &date)?;
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(&hospital.attendance_for_day(date))))
    }

    /// Stored attendance history of one staff member.
    pub fn attendance_history(&self, staff_id: String) -> Result<Vec<FfiAttendance>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(hospital
            .attendance_for_staff(&staff_id)
            .into_iter()
            .map(|r| r.clone().into())
            .collect())
    }

    pub fn check_in(&self, staff_id: String, date: String, time: String) -> Result<FfiAttendance, EmrError> {
        let date = parse_date_arg("date", &date)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.check_in(&staff_id, date, &time)?.into())
    }

    pub fn check_out(&self, staff_id: String, date: String, time: String) -> Result<FfiAttendance, EmrError> {
        let date = parse_date_arg("date", &date)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.check_out(&staff_id, date, &time)?.into())
    }

    /// Mark a day Absent or On Leave.
    pub fn mark_attendance(
        &self,
        staff_id: String,
        date: String,
        status: String,
        notes: Option<String>,
    ) -> Result<FfiAttendance, EmrError> {
        let date = parse_date_arg("date", &date)?;
        let status = parse_label(&status)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.mark_attendance(&staff_id, date, status, notes)?.into())
    }

    // =========================================================================
    // Bed Operations
    // =========================================================================

    pub fn list_bed_categories(&self, query: FfiListQuery) -> Result<FfiBedPage, EmrError> {
        let query = self.settle_query(Screen::Beds, "", query)?;
        let hospital = self.hospital.lock()?;
        let listing: Listing<FfiBedCategory> = listing(hospital.bed_categories(), query, hospital.config().page_size)?;
        Ok(FfiBedPage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    pub fn bed_kpis(&self) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(hospital.bed_categories())))
    }

    pub fn add_bed_category(&self, form: FfiNewBedCategory) -> Result<FfiBedCategory, EmrError> {
        let form = NewBedCategory::try_from(form)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.add_bed_category(form)?.into())
    }

    pub fn update_bed_category(&self, id: String, update: FfiBedCategoryUpdate) -> Result<FfiBedCategory, EmrError> {
        let update = BedCategoryUpdate::try_from(update)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.update_bed_category(&id, update)?.into())
    }

    pub fn occupy_bed(&self, id: String) -> Result<FfiBedCategory, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.occupy_bed(&id)?.into())
    }

    pub fn release_bed(&self, id: String) -> Result<FfiBedCategory, EmrError> {
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.release_bed(&id)?.into())
    }

    pub fn delete_bed_category(&self, id: String) -> Result<(), EmrError> {
        let mut hospital = self.hospital.lock()?;
        hospital.delete_bed_category(&id)?;
        Ok(())
    }

    // =========================================================================
    // Pharmacy Operations
    // =========================================================================

    /// Patient details to attach to a new invoice or sale.
    pub fn patient_snapshot(&self, file_number: String) -> Result<FfiPatientSnapshot, EmrError> {
        let hospital = self.hospital.lock()?;
        let today = hospital.today();
        Ok(hospital.patient_snapshot(&file_number, today)?.into())
    }

    pub fn list_invoices(&self, query: FfiListQuery) -> Result<FfiInvoicePage, EmrError> {
        let query = self.settle_query(Screen::Invoices, "", query)?;
        let hospital = self.hospital.lock()?;
        let listing: Listing<FfiInvoice> = listing(hospital.invoices(), query, hospital.config().page_size)?;
        Ok(FfiInvoicePage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    pub fn invoice_kpis(&self) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(hospital.invoices())))
    }

    pub fn create_invoice(&self, form: FfiNewInvoice) -> Result<FfiInvoice, EmrError> {
        let form = NewInvoice::try_from(form)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.create_invoice(form)?.into())
    }

    /// Replace the items of an unpaid invoice (by UUID or invoice number).
    pub fn replace_invoice_items(&self, invoice: String, items: Vec<FfiLineItem>) -> Result<FfiInvoice, EmrError> {
        let items = parse_items(items)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.replace_invoice_items(&invoice, items)?.into())
    }

    pub fn mark_invoice_paid(&self, invoice: String, payment_method: String, cashier: String) -> Result<FfiInvoice, EmrError> {
        let method = parse_label(&payment_method)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.mark_invoice_paid(&invoice, method, &cashier)?.into())
    }

    pub fn list_sales(&self, query: FfiListQuery) -> Result<FfiSalePage, EmrError> {
        let query = self.settle_query(Screen::Sales, "", query)?;
        let hospital = self.hospital.lock()?;
        let listing: Listing<FfiSale> = listing(hospital.sales(), query, hospital.config().page_size)?;
        Ok(FfiSalePage {
            items: listing.items,
            page: listing.page,
            summary: listing.summary,
            empty_message: listing.empty_message,
        })
    }

    pub fn sales_kpis(&self) -> Result<Vec<FfiSummaryEntry>, EmrError> {
        let hospital = self.hospital.lock()?;
        Ok(summary_entries(&kpis(hospital.sales())))
    }

    pub fn create_sale(&self, form: FfiNewSale) -> Result<FfiSale, EmrError> {
        let form = NewSale::try_from(form)?;
        let mut hospital = self.hospital.lock()?;
        Ok(hospital.create_sale(form)?.into())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// CSV of every record matching `query` (all pages).
    pub fn export_csv(&self, kind: FfiReportKind, query: FfiListQuery) -> Result<FfiExportFile, EmrError> {
        let hospital = self.hospital.lock()?;
        let size = hospital.config().page_size;
        let today = hospital.today();
        match kind {
            FfiReportKind::Patients => csv_file(hospital.patients(), query, size, today),
            FfiReportKind::Staff => csv_file(hospital.staff(), query, size, today),
            FfiReportKind::Attendance { date } => {
                let date = parse_date_arg("date", &date)?;
                csv_file(&hospital.attendance_for_day(date), query, size, today)
            }
            FfiReportKind::Beds => csv_file(hospital.bed_categories(), query, size, today),
            FfiReportKind::Invoices => csv_file(hospital.invoices(), query, size, today),
            FfiReportKind::Sales => csv_file(hospital.sales(), query, size, today),
        }
    }

    /// Printable HTML report of every record matching `query`.
    pub fn render_report(&self, kind: FfiReportKind, query: FfiListQuery) -> Result<FfiReportDocument, EmrError> {
        Ok(self.build_report(kind, query)?.into())
    }

    /// Render a report and write it into `dir`; returns the written path.
    pub fn print_report_to_dir(&self, kind: FfiReportKind, query: FfiListQuery, dir: String) -> Result<String, EmrError> {
        let document = self.build_report(kind, query)?;
        let presenter = HtmlFilePresenter::new(PathBuf::from(dir));
        export::present_report(&presenter, &document)?;
        Ok(presenter.path_for(&document).display().to_string())
    }
}

impl EmrCore {
    /// Run `op` after the configured action latency unless cancelled first.
    /// Must be called inside a tokio runtime.
    pub fn schedule<T, F>(&self, op: F) -> Result<deferred::PendingAction<T>, EmrError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Hospital) -> store::StoreResult<T> + Send + 'static,
    {
        let delay = self.hospital.lock()?.config().action_latency();
        Ok(deferred::PendingAction::spawn(delay, self.shared(), op))
    }

    fn settle_query(&self, screen: Screen, scope: &str, query: FfiListQuery) -> Result<FfiListQuery, EmrError> {
        Ok(self.queries.lock()?.settle(screen, scope, query))
    }

    /// Render a report, hand it to `presenter`, and tear it down after the
    /// configured print delay.
    pub async fn print_report(
        &self,
        kind: FfiReportKind,
        query: FfiListQuery,
        presenter: &dyn export::ReportPresenter,
    ) -> Result<(), EmrError> {
        let document = self.build_report(kind, query)?;
        let teardown = self.hospital.lock()?.config().print_teardown();
        deferred::print_report(presenter, &document, teardown).await?;
        Ok(())
    }

    fn build_report(&self, kind: FfiReportKind, query: FfiListQuery) -> Result<export::ReportDocument, EmrError> {
        let hospital = self.hospital.lock()?;
        let letterhead = &hospital.config().organization;
        let size = hospital.config().page_size;
        let today = hospital.today();
        match kind {
            FfiReportKind::Patients => report(hospital.patients(), query, letterhead, size, today),
            FfiReportKind::Staff => report(hospital.staff(), query, letterhead, size, today),
            FfiReportKind::Attendance { date } => {
                let date = parse_date_arg("date", &date)?;
                report(&hospital.attendance_for_day(date), query, letterhead, size, today)
            }
            FfiReportKind::Beds => report(hospital.bed_categories(), query, letterhead, size, today),
            FfiReportKind::Invoices => report(hospital.invoices(), query, letterhead, size, today),
            FfiReportKind::Sales => report(hospital.sales(), query, letterhead, size, today),
        }
    }
}
