//! FFI-safe record types and their conversions.
//!
//! Dates cross the boundary as `YYYY-MM-DD`, clock times as `HH:MM`,
//! money as decimal strings and enums as their display labels.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::export::{ExportFile, ReportDocument};
use crate::models::{
    format_clock_time, parse_clock_time, parse_date, AttendanceSession, BedCategory,
    BedCategoryUpdate, Invoice, LineItem, NewBedCategory, NewInvoice, NewPatient, NewSale,
    NewStaff, Patient, PatientSnapshot, PatientUpdate, Sale, Staff, StaffAttendance, StaffUpdate,
};
use crate::view::{format_amount, DateRange, FilterValue, Listable, PageInfo, Summary, ViewQuery};
use crate::EmrError;

// =========================================================================
// Argument parsing
// =========================================================================

pub(crate) fn parse_date_arg(field: &str, value: &str) -> Result<NaiveDate, EmrError> {
    parse_date(value).ok_or_else(|| {
        EmrError::InvalidInput(format!("{} must be YYYY-MM-DD, got {:?}", field, value))
    })
}

fn parse_optional_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, EmrError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date_arg(field, v).map(Some),
    }
}

fn parse_time_arg(field: &str, value: &str) -> Result<NaiveTime, EmrError> {
    parse_clock_time(value).ok_or_else(|| {
        EmrError::InvalidInput(format!("{} must be HH:MM, got {:?}", field, value))
    })
}

fn parse_amount(field: &str, value: &str) -> Result<Decimal, EmrError> {
    Decimal::from_str(value.trim())
        .map_err(|_| EmrError::InvalidInput(format!("{} must be a number, got {:?}", field, value)))
}

pub(crate) fn parse_label<T>(value: &str) -> Result<T, EmrError>
where
    T: FromStr<Err = crate::models::UnknownVariant>,
{
    Ok(value.parse::<T>()?)
}

fn parse_optional_label<T>(value: Option<String>) -> Result<Option<T>, EmrError>
where
    T: FromStr<Err = crate::models::UnknownVariant>,
{
    value.as_deref().map(parse_label).transpose()
}

// =========================================================================
// List queries
// =========================================================================

/// One categorical filter; `value` "all" (or empty) means unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiFilter {
    pub field: String,
    pub value: String,
}

/// Search, filter, date-range and paging state of a list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct FfiListQuery {
    pub search: String,
    /// Empty means the screen's default search fields
    pub search_fields: Vec<String>,
    pub filters: Vec<FfiFilter>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: u32,
    /// Falls back to the configured page size
    pub page_size: Option<u32>,
}

impl FfiListQuery {
    /// True when both queries select the same rows, whatever page they ask for.
    pub(crate) fn same_criteria(&self, other: &FfiListQuery) -> bool {
        self.search == other.search
            && self.search_fields == other.search_fields
            && self.filters == other.filters
            && self.date_from == other.date_from
            && self.date_to == other.date_to
            && self.page_size == other.page_size
    }

    /// Build a typed query; unknown field names are rejected.
    pub(crate) fn into_query<T: Listable>(self, default_page_size: usize) -> Result<ViewQuery<T::Field>, EmrError> {
        let page_size = self
            .page_size
            .map(|s| s as usize)
            .unwrap_or(default_page_size);
        let range = DateRange::new(
            parse_optional_date("date_from", self.date_from)?,
            parse_optional_date("date_to", self.date_to)?,
        );

        let mut query = ViewQuery::new(page_size);
        query.set_search(self.search);
        if !self.search_fields.is_empty() {
            let fields = self
                .search_fields
                .iter()
                .map(|f| parse_label::<T::Field>(f))
                .collect::<Result<Vec<_>, _>>()?;
            query.set_search_fields(fields);
        }
        for filter in self.filters {
            let field = parse_label::<T::Field>(&filter.field)?;
            query.set_filter(field, FilterValue::parse(&filter.value));
        }
        query.set_date_range(range);
        Ok(query.with_page(self.page.max(1) as usize))
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPageInfo {
    pub number: u32,
    pub size: u32,
    pub total_pages: u32,
    pub total_items: u32,
    pub has_previous: bool,
    pub has_next: bool,
    /// Pagination controls are hidden for zero or one page
    pub shows_controls: bool,
}

impl From<&PageInfo> for FfiPageInfo {
    fn from(info: &PageInfo) -> Self {
        Self {
            number: saturating_u32(info.number),
            size: saturating_u32(info.size),
            total_pages: saturating_u32(info.total_pages),
            total_items: saturating_u32(info.total_items),
            has_previous: info.has_previous(),
            has_next: info.has_next(),
            shows_controls: info.shows_controls(),
        }
    }
}

/// One KPI card or report meta line.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSummaryEntry {
    pub label: String,
    pub value: String,
}

pub(crate) fn summary_entries<S: Summary>(summary: &S) -> Vec<FfiSummaryEntry> {
    summary
        .entries()
        .into_iter()
        .map(|(label, value)| FfiSummaryEntry {
            label: label.to_string(),
            value,
        })
        .collect()
}

// =========================================================================
// Patients
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub file_number: String,
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    pub next_of_kin: Option<String>,
    pub file_type: String,
    pub patient_type: String,
    pub status: String,
    pub is_dead: bool,
    pub date_of_death: Option<String>,
    pub parent_file_id: Option<String>,
    pub registered_on: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            file_number: patient.file_number,
            name: patient.name,
            date_of_birth: patient.date_of_birth.to_string(),
            gender: patient.gender.label().to_string(),
            phone: patient.phone,
            address: patient.address,
            email: patient.email,
            next_of_kin: patient.next_of_kin,
            file_type: patient.file_type.label().to_string(),
            patient_type: patient.patient_type.label().to_string(),
            status: patient.status.label().to_string(),
            is_dead: patient.is_dead,
            date_of_death: patient.date_of_death.map(|d| d.to_string()),
            parent_file_id: patient.parent_file_id,
            registered_on: patient.registered_on.to_string(),
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// Patient registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    pub next_of_kin: Option<String>,
    pub file_type: String,
    pub patient_type: String,
    pub parent_file_id: Option<String>,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = EmrError;

    fn try_from(form: FfiNewPatient) -> Result<Self, EmrError> {
        Ok(NewPatient {
            name: form.name,
            date_of_birth: parse_date_arg("date_of_birth", &form.date_of_birth)?,
            gender: parse_label(&form.gender)?,
            phone: form.phone,
            address: form.address,
            email: form.email,
            next_of_kin: form.next_of_kin,
            file_type: parse_label(&form.file_type)?,
            patient_type: parse_label(&form.patient_type)?,
            parent_file_id: form.parent_file_id,
        })
    }
}

/// Partial patient edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub next_of_kin: Option<String>,
    pub file_type: Option<String>,
    pub patient_type: Option<String>,
    pub status: Option<String>,
    /// Empty string unlinks the patient from its family file
    pub parent_file_id: Option<String>,
}

impl TryFrom<FfiPatientUpdate> for PatientUpdate {
    type Error = EmrError;

    fn try_from(update: FfiPatientUpdate) -> Result<Self, EmrError> {
        Ok(PatientUpdate {
            name: update.name,
            date_of_birth: parse_optional_date("date_of_birth", update.date_of_birth)?,
            gender: parse_optional_label(update.gender)?,
            phone: update.phone,
            address: update.address,
            email: update.email,
            next_of_kin: update.next_of_kin,
            file_type: parse_optional_label(update.file_type)?,
            patient_type: parse_optional_label(update.patient_type)?,
            status: parse_optional_label(update.status)?,
            parent_file_id: update
                .parent_file_id
                .map(|p| Some(p).filter(|p| !p.trim().is_empty())),
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientPage {
    pub items: Vec<FfiPatient>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

// =========================================================================
// Staff
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStaff {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub phone: String,
    pub email: Option<String>,
    pub department: String,
    pub role: String,
    pub employment_type: String,
    pub date_joined: String,
    pub status: String,
}

impl From<Staff> for FfiStaff {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            name: staff.name,
            gender: staff.gender.label().to_string(),
            phone: staff.phone,
            email: staff.email,
            department: staff.department,
            role: staff.role,
            employment_type: staff.employment_type.label().to_string(),
            date_joined: staff.date_joined.to_string(),
            status: staff.status.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewStaff {
    pub name: String,
    pub gender: String,
    pub phone: String,
    pub email: Option<String>,
    pub department: String,
    pub role: String,
    pub employment_type: String,
    pub date_joined: String,
}

impl TryFrom<FfiNewStaff> for NewStaff {
    type Error = EmrError;

    fn try_from(form: FfiNewStaff) -> Result<Self, EmrError> {
        Ok(NewStaff {
            name: form.name,
            gender: parse_label(&form.gender)?,
            phone: form.phone,
            email: form.email,
            department: form.department,
            role: form.role,
            employment_type: parse_label(&form.employment_type)?,
            date_joined: parse_date_arg("date_joined", &form.date_joined)?,
        })
    }
}

#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiStaffUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub employment_type: Option<String>,
    pub date_joined: Option<String>,
}

impl TryFrom<FfiStaffUpdate> for StaffUpdate {
    type Error = EmrError;

    fn try_from(update: FfiStaffUpdate) -> Result<Self, EmrError> {
        Ok(StaffUpdate {
            name: update.name,
            gender: parse_optional_label(update.gender)?,
            phone: update.phone,
            email: update.email,
            department: update.department,
            role: update.role,
            employment_type: parse_optional_label(update.employment_type)?,
            date_joined: parse_optional_date("date_joined", update.date_joined)?,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStaffPage {
    pub items: Vec<FfiStaff>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

// =========================================================================
// Attendance
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub login: String,
    pub logout: Option<String>,
}

impl From<AttendanceSession> for FfiSession {
    fn from(session: AttendanceSession) -> Self {
        Self {
            login: format_clock_time(session.login),
            logout: session.logout.map(format_clock_time),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAttendance {
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub department: String,
    pub date: String,
    pub status: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub late_minutes: u32,
    pub worked_minutes: i64,
    pub sessions: Vec<FfiSession>,
    pub notes: Option<String>,
    pub synthetic: bool,
}

impl From<StaffAttendance> for FfiAttendance {
    fn from(record: StaffAttendance) -> Self {
        Self {
            worked_minutes: record.worked_minutes(),
            id: record.id,
            staff_id: record.staff_id,
            staff_name: record.staff_name,
            department: record.department,
            date: record.date.to_string(),
            status: record.status.label().to_string(),
            check_in: record.check_in.map(format_clock_time),
            check_out: record.check_out.map(format_clock_time),
            late_minutes: record.late_minutes,
            sessions: record.sessions.into_iter().map(|s| s.into()).collect(),
            notes: record.notes,
            synthetic: record.synthetic,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAttendancePage {
    pub items: Vec<FfiAttendance>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

// =========================================================================
// Beds
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBedCategory {
    pub id: String,
    pub category_name: String,
    pub total_beds: u32,
    pub occupied_beds: u32,
    pub available_beds: u32,
    pub price_per_day: String,
    pub description: Option<String>,
    pub occupancy_rate: f64,
    pub created_on: String,
}

impl From<BedCategory> for FfiBedCategory {
    fn from(category: BedCategory) -> Self {
        Self {
            available_beds: category.available_beds(),
            occupancy_rate: category.occupancy_rate(),
            id: category.id,
            category_name: category.category_name,
            total_beds: category.total_beds,
            occupied_beds: category.occupied_beds,
            price_per_day: format_amount(category.price_per_day),
            description: category.description,
            created_on: category.created_on.to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewBedCategory {
    pub category_name: String,
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub price_per_day: String,
    pub description: Option<String>,
}

impl TryFrom<FfiNewBedCategory> for NewBedCategory {
    type Error = EmrError;

    fn try_from(form: FfiNewBedCategory) -> Result<Self, EmrError> {
        Ok(NewBedCategory {
            category_name: form.category_name,
            total_beds: form.total_beds,
            occupied_beds: form.occupied_beds,
            price_per_day: parse_amount("price_per_day", &form.price_per_day)?,
            description: form.description,
        })
    }
}

#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiBedCategoryUpdate {
    pub category_name: Option<String>,
    pub total_beds: Option<i64>,
    pub occupied_beds: Option<i64>,
    pub price_per_day: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<FfiBedCategoryUpdate> for BedCategoryUpdate {
    type Error = EmrError;

    fn try_from(update: FfiBedCategoryUpdate) -> Result<Self, EmrError> {
        Ok(BedCategoryUpdate {
            category_name: update.category_name,
            total_beds: update.total_beds,
            occupied_beds: update.occupied_beds,
            price_per_day: update
                .price_per_day
                .as_deref()
                .map(|p| parse_amount("price_per_day", p))
                .transpose()?,
            description: update.description,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBedPage {
    pub items: Vec<FfiBedCategory>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

// =========================================================================
// Pharmacy
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLineItem {
    pub drug_id: String,
    pub name: String,
    pub dosage: String,
    pub quantity: u32,
    pub price: String,
    /// Ignored on input; always recomputed
    pub subtotal: String,
}

impl From<LineItem> for FfiLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            drug_id: item.drug_id,
            name: item.name,
            dosage: item.dosage,
            quantity: item.quantity,
            price: format_amount(item.price),
            subtotal: format_amount(item.subtotal),
        }
    }
}

impl TryFrom<FfiLineItem> for LineItem {
    type Error = EmrError;

    fn try_from(item: FfiLineItem) -> Result<Self, EmrError> {
        let price = parse_amount("price", &item.price)?;
        Ok(LineItem::new(item.drug_id, item.name, item.dosage, item.quantity, price))
    }
}

pub(crate) fn parse_items(items: Vec<FfiLineItem>) -> Result<Vec<LineItem>, EmrError> {
    items.into_iter().map(LineItem::try_from).collect()
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSnapshot {
    pub file_number: String,
    pub patient_name: String,
    pub phone: String,
    pub age: u32,
    pub gender: String,
    pub patient_type: String,
}

impl From<PatientSnapshot> for FfiPatientSnapshot {
    fn from(snapshot: PatientSnapshot) -> Self {
        Self {
            file_number: snapshot.file_number,
            patient_name: snapshot.patient_name,
            phone: snapshot.phone,
            age: snapshot.age,
            gender: snapshot.gender.label().to_string(),
            patient_type: snapshot.patient_type.label().to_string(),
        }
    }
}

impl TryFrom<FfiPatientSnapshot> for PatientSnapshot {
    type Error = EmrError;

    fn try_from(snapshot: FfiPatientSnapshot) -> Result<Self, EmrError> {
        Ok(PatientSnapshot {
            file_number: snapshot.file_number,
            patient_name: snapshot.patient_name,
            phone: snapshot.phone,
            age: snapshot.age,
            gender: parse_label(&snapshot.gender)?,
            patient_type: parse_label(&snapshot.patient_type)?,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInvoice {
    pub id: String,
    pub invoice_id: String,
    pub patient: FfiPatientSnapshot,
    pub items: Vec<FfiLineItem>,
    pub amount: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub cashier: Option<String>,
    pub date: String,
    pub time: String,
    pub paid_at: Option<String>,
}

impl From<Invoice> for FfiInvoice {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_id: invoice.invoice_id,
            patient: invoice.patient.into(),
            items: invoice.items.into_iter().map(|i| i.into()).collect(),
            amount: format_amount(invoice.amount),
            status: invoice.status.label().to_string(),
            payment_method: invoice.payment_method.map(|m| m.label().to_string()),
            cashier: invoice.cashier,
            date: invoice.date.to_string(),
            time: format_clock_time(invoice.time),
            paid_at: invoice.paid_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewInvoice {
    pub patient: FfiPatientSnapshot,
    pub items: Vec<FfiLineItem>,
    /// "Unpaid" or "Pending"
    pub status: String,
    pub date: String,
    pub time: String,
}

impl TryFrom<FfiNewInvoice> for NewInvoice {
    type Error = EmrError;

    fn try_from(form: FfiNewInvoice) -> Result<Self, EmrError> {
        Ok(NewInvoice {
            patient: form.patient.try_into()?,
            items: parse_items(form.items)?,
            status: parse_label(&form.status)?,
            date: parse_date_arg("date", &form.date)?,
            time: parse_time_arg("time", &form.time)?,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInvoicePage {
    pub items: Vec<FfiInvoice>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSale {
    pub id: String,
    pub sale_id: String,
    pub patient: FfiPatientSnapshot,
    pub items: Vec<FfiLineItem>,
    pub amount: String,
    pub payment_method: String,
    pub cashier: String,
    pub date: String,
    pub time: String,
}

impl From<Sale> for FfiSale {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            sale_id: sale.sale_id,
            patient: sale.patient.into(),
            items: sale.items.into_iter().map(|i| i.into()).collect(),
            amount: format_amount(sale.amount),
            payment_method: sale.payment_method.label().to_string(),
            cashier: sale.cashier,
            date: sale.date.to_string(),
            time: format_clock_time(sale.time),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewSale {
    pub patient: FfiPatientSnapshot,
    pub items: Vec<FfiLineItem>,
    pub payment_method: String,
    pub cashier: String,
    pub date: String,
    pub time: String,
}

impl TryFrom<FfiNewSale> for NewSale {
    type Error = EmrError;

    fn try_from(form: FfiNewSale) -> Result<Self, EmrError> {
        Ok(NewSale {
            patient: form.patient.try_into()?,
            items: parse_items(form.items)?,
            payment_method: parse_label(&form.payment_method)?,
            cashier: form.cashier,
            date: parse_date_arg("date", &form.date)?,
            time: parse_time_arg("time", &form.time)?,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSalePage {
    pub items: Vec<FfiSale>,
    pub page: FfiPageInfo,
    pub summary: Vec<FfiSummaryEntry>,
    pub empty_message: Option<String>,
}

// =========================================================================
// Exports
// =========================================================================

/// Which list screen a report covers.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiReportKind {
    Patients,
    Staff,
    /// Attendance roster for one `YYYY-MM-DD` day
    Attendance { date: String },
    Beds,
    Invoices,
    Sales,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportFile {
    pub filename: String,
    pub contents: String,
    pub checksum: String,
    pub row_count: u32,
}

impl From<ExportFile> for FfiExportFile {
    fn from(file: ExportFile) -> Self {
        Self {
            filename: file.filename,
            contents: file.contents,
            checksum: file.checksum,
            row_count: saturating_u32(file.row_count),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportDocument {
    pub title: String,
    pub filename: String,
    pub html: String,
    pub checksum: String,
    pub row_count: u32,
}

impl From<ReportDocument> for FfiReportDocument {
    fn from(doc: ReportDocument) -> Self {
        Self {
            title: doc.title,
            filename: doc.filename,
            html: doc.html,
            checksum: doc.checksum,
            row_count: saturating_u32(doc.row_count),
        }
    }
}

/// Counts beyond `u32` are clamped rather than wrapped.
fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, PatientField, PatientStatus};

    #[test]
    fn test_list_query_conversion() {
        let query = FfiListQuery {
            search: "ama".into(),
            filters: vec![
                FfiFilter {
                    field: "status".into(),
                    value: "Active".into(),
                },
                FfiFilter {
                    field: "patient_type".into(),
                    value: "all".into(),
                },
            ],
            date_from: Some("2025-01-01".into()),
            date_to: Some(String::new()),
            page: 3,
            ..Default::default()
        }
        .into_query::<Patient>(10)
        .unwrap();

        assert_eq!(query.search(), "ama");
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.filters()[0].field, PatientField::Status);
        assert_eq!(query.date_range().from, parse_date("2025-01-01"));
        assert_eq!(query.date_range().to, None);
        assert_eq!(query.page(), 3);
        assert_eq!(query.page_size(), 10);
    }

    #[test]
    fn test_list_query_rejects_unknown_field() {
        let query = FfiListQuery {
            filters: vec![FfiFilter {
                field: "blood_group".into(),
                value: "O+".into(),
            }],
            ..Default::default()
        };
        assert!(matches!(
            query.into_query::<Patient>(10),
            Err(EmrError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_patient_update_unlink() {
        let update: PatientUpdate = FfiPatientUpdate {
            parent_file_id: Some(String::new()),
            status: Some("pending payment".into()),
            ..Default::default()
        }
        .try_into()
        .unwrap();
        assert_eq!(update.parent_file_id, Some(None));
        assert_eq!(update.status, Some(PatientStatus::PendingPayment));
    }

    #[test]
    fn test_line_item_recomputes_subtotal() {
        let item: LineItem = FfiLineItem {
            drug_id: "D1".into(),
            name: "Metformin".into(),
            dosage: "500mg".into(),
            quantity: 4,
            price: "2.50".into(),
            subtotal: "999".into(),
        }
        .try_into()
        .unwrap();
        assert_eq!(item.subtotal, Decimal::new(1000, 2));

        let bad = FfiLineItem {
            drug_id: "D1".into(),
            name: "Metformin".into(),
            dosage: "500mg".into(),
            quantity: 4,
            price: "two".into(),
            subtotal: String::new(),
        };
        assert!(LineItem::try_from(bad).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_page_info_counts_clamp() {
        let info = FfiPageInfo::from(&PageInfo::new(usize::MAX, 10, 1));
        assert_eq!(info.total_items, u32::MAX);
        assert_eq!(info.total_pages, u32::MAX);
        assert_eq!(info.size, 10);
        assert_eq!(info.number, 1);
    }

    #[test]
    fn test_same_criteria_ignores_page() {
        let first = FfiListQuery {
            search: "ama".into(),
            page: 1,
            ..Default::default()
        };
        let later = FfiListQuery { page: 4, ..first.clone() };
        assert!(first.same_criteria(&later));

        let narrowed = FfiListQuery {
            search: "ama k".into(),
            ..later.clone()
        };
        assert!(!later.same_criteria(&narrowed));
        let resized = FfiListQuery {
            page_size: Some(25),
            ..later.clone()
        };
        assert!(!later.same_criteria(&resized));
    }
}
