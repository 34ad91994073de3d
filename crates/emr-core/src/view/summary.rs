//! Aggregate KPIs per list screen.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Listable;
use crate::models::{
    AttendanceStatus, BedCategory, FileType, Invoice, InvoiceStatus, Patient, PatientStatus,
    PatientType, PaymentMethod, Sale, Staff, StaffAttendance, StaffStatus,
};

/// Named aggregates, rendered in report meta blocks and KPI cards.
pub trait Summary {
    /// Label/value pairs in display order.
    fn entries(&self) -> Vec<(&'static str, String)>;
}

/// A record type with a per-screen aggregate.
pub trait Summarize: Listable + Sized {
    type Summary: Summary + Clone + PartialEq + std::fmt::Debug;

    fn summarize<'a, I>(records: I) -> Self::Summary
    where
        I: IntoIterator<Item = &'a Self>,
        Self: 'a;
}

/// `part / whole * 100`, or 0.0 when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// One-decimal rendering used by rate KPIs ("0.0", "87.5").
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}", rate)
}

/// Two-decimal plain-number rendering of a currency amount.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub total: usize,
    pub active: usize,
    pub admitted: usize,
    pub discharged: usize,
    pub pending_payment: usize,
    pub inpatients: usize,
    pub outpatients: usize,
    pub families: usize,
    pub deceased: usize,
}

impl Summary for PatientSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Patients", self.total.to_string()),
            ("Active", self.active.to_string()),
            ("Admitted", self.admitted.to_string()),
            ("Discharged", self.discharged.to_string()),
            ("Pending Payment", self.pending_payment.to_string()),
            ("Inpatients (IPD)", self.inpatients.to_string()),
            ("Outpatients (OPD)", self.outpatients.to_string()),
            ("Family Files", self.families.to_string()),
            ("Deceased", self.deceased.to_string()),
        ]
    }
}

impl Summarize for Patient {
    type Summary = PatientSummary;

    fn summarize<'a, I>(records: I) -> PatientSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = PatientSummary::default();
        for patient in records {
            summary.total += 1;
            match patient.status {
                PatientStatus::Active => summary.active += 1,
                PatientStatus::Admitted => summary.admitted += 1,
                PatientStatus::Discharged => summary.discharged += 1,
                PatientStatus::PendingPayment => summary.pending_payment += 1,
            }
            match patient.patient_type {
                PatientType::Inpatient => summary.inpatients += 1,
                PatientType::Outpatient => summary.outpatients += 1,
            }
            if patient.file_type == FileType::Family {
                summary.families += 1;
            }
            if patient.is_dead {
                summary.deceased += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSummary {
    pub total: usize,
    pub active: usize,
    pub on_leave: usize,
    pub suspended: usize,
    pub resigned: usize,
    /// Headcount per department, alphabetical
    pub by_department: BTreeMap<String, usize>,
}

impl Summary for StaffSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Staff", self.total.to_string()),
            ("Active", self.active.to_string()),
            ("On Leave", self.on_leave.to_string()),
            ("Suspended", self.suspended.to_string()),
            ("Resigned", self.resigned.to_string()),
            ("Departments", self.by_department.len().to_string()),
        ]
    }
}

impl Summarize for Staff {
    type Summary = StaffSummary;

    fn summarize<'a, I>(records: I) -> StaffSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = StaffSummary::default();
        for staff in records {
            summary.total += 1;
            match staff.status {
                StaffStatus::Active => summary.active += 1,
                StaffStatus::OnLeave => summary.on_leave += 1,
                StaffStatus::Suspended => summary.suspended += 1,
                StaffStatus::Resigned => summary.resigned += 1,
            }
            *summary
                .by_department
                .entry(staff.department.clone())
                .or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub on_leave: usize,
    /// Share of records that turned up (present or late), in percent
    pub attendance_rate: f64,
}

impl AttendanceSummary {
    pub fn attendance_rate_label(&self) -> String {
        format_rate(self.attendance_rate)
    }
}

impl Summary for AttendanceSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Staff", self.total.to_string()),
            ("Present", self.present.to_string()),
            ("Late", self.late.to_string()),
            ("Absent", self.absent.to_string()),
            ("On Leave", self.on_leave.to_string()),
            ("Attendance Rate", format!("{}%", self.attendance_rate_label())),
        ]
    }
}

impl Summarize for StaffAttendance {
    type Summary = AttendanceSummary;

    fn summarize<'a, I>(records: I) -> AttendanceSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = AttendanceSummary::default();
        for record in records {
            summary.total += 1;
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Late => summary.late += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::OnLeave => summary.on_leave += 1,
            }
        }
        summary.attendance_rate = percentage(summary.present + summary.late, summary.total);
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedSummary {
    pub categories: usize,
    pub total_beds: u64,
    pub occupied_beds: u64,
    pub available_beds: u64,
    pub occupancy_rate: f64,
}

impl Summary for BedSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Categories", self.categories.to_string()),
            ("Total Beds", self.total_beds.to_string()),
            ("Occupied", self.occupied_beds.to_string()),
            ("Available", self.available_beds.to_string()),
            ("Occupancy Rate", format!("{}%", format_rate(self.occupancy_rate))),
        ]
    }
}

impl Summarize for BedCategory {
    type Summary = BedSummary;

    fn summarize<'a, I>(records: I) -> BedSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = BedSummary::default();
        for category in records {
            summary.categories += 1;
            summary.total_beds += u64::from(category.total_beds);
            summary.occupied_beds += u64::from(category.occupied_beds);
            summary.available_beds += u64::from(category.available_beds());
        }
        summary.occupancy_rate =
            percentage(summary.occupied_beds as usize, summary.total_beds as usize);
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub count: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub pending: usize,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub outstanding_amount: Decimal,
}

impl Summary for InvoiceSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Invoices", self.count.to_string()),
            ("Paid", self.paid.to_string()),
            ("Unpaid", self.unpaid.to_string()),
            ("Pending", self.pending.to_string()),
            ("Total Amount", format_amount(self.total_amount)),
            ("Amount Paid", format_amount(self.paid_amount)),
            ("Outstanding", format_amount(self.outstanding_amount)),
        ]
    }
}

impl Summarize for Invoice {
    type Summary = InvoiceSummary;

    fn summarize<'a, I>(records: I) -> InvoiceSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = InvoiceSummary::default();
        for invoice in records {
            summary.count += 1;
            summary.total_amount = summary.total_amount.saturating_add(invoice.amount);
            match invoice.status {
                InvoiceStatus::Paid => {
                    summary.paid += 1;
                    summary.paid_amount = summary.paid_amount.saturating_add(invoice.amount);
                }
                InvoiceStatus::Unpaid => {
                    summary.unpaid += 1;
                    summary.outstanding_amount =
                        summary.outstanding_amount.saturating_add(invoice.amount);
                }
                InvoiceStatus::Pending => {
                    summary.pending += 1;
                    summary.outstanding_amount =
                        summary.outstanding_amount.saturating_add(invoice.amount);
                }
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub count: usize,
    pub total_revenue: Decimal,
    pub items_sold: u64,
    pub revenue_by_method: BTreeMap<PaymentMethod, Decimal>,
}

impl Summary for SalesSummary {
    fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("Total Sales", self.count.to_string()),
            ("Total Revenue", format_amount(self.total_revenue)),
            ("Items Sold", self.items_sold.to_string()),
        ];
        for (method, revenue) in &self.revenue_by_method {
            entries.push((method.label(), format_amount(*revenue)));
        }
        entries
    }
}

impl Summarize for Sale {
    type Summary = SalesSummary;

    fn summarize<'a, I>(records: I) -> SalesSummary
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut summary = SalesSummary::default();
        for sale in records {
            summary.count += 1;
            summary.total_revenue = summary.total_revenue.saturating_add(sale.amount);
            summary.items_sold = summary.items_sold.saturating_add(sale.item_count());
            let by_method = summary
                .revenue_by_method
                .entry(sale.payment_method)
                .or_insert(Decimal::ZERO);
            *by_method = by_method.saturating_add(sale.amount);
        }
        summary
    }
}
