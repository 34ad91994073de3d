//! Column layouts shared by CSV and printed reports.

use crate::models::{
    format_clock_time, BedCategory, Invoice, Patient, Sale, Staff, StaffAttendance,
};
use crate::view::{format_amount, format_rate, Summarize};

/// A record type that can be laid out as a report table.
pub trait Tabular: Summarize {
    /// File name stem, e.g. `invoice-report`
    const REPORT_NAME: &'static str;
    /// Heading of the printed report
    const TITLE: &'static str;
    /// Human column labels
    const HEADERS: &'static [&'static str];

    /// Display values, one per header.
    fn cells(&self) -> Vec<String>;
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

impl Tabular for Patient {
    const REPORT_NAME: &'static str = "patients-report";
    const TITLE: &'static str = "Patients Report";
    const HEADERS: &'static [&'static str] = &[
        "File No.",
        "Name",
        "Gender",
        "Date of Birth",
        "Phone",
        "File Type",
        "Patient Type",
        "Status",
        "Deceased",
        "Registered",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.file_number.clone(),
            self.name.clone(),
            self.gender.label().to_string(),
            self.date_of_birth.to_string(),
            self.phone.clone(),
            self.file_type.label().to_string(),
            self.patient_type.label().to_string(),
            self.status.label().to_string(),
            if self.is_dead { "Yes" } else { "No" }.to_string(),
            self.registered_on.to_string(),
        ]
    }
}

impl Tabular for Staff {
    const REPORT_NAME: &'static str = "staff-report";
    const TITLE: &'static str = "Staff Report";
    const HEADERS: &'static [&'static str] = &[
        "Staff ID",
        "Name",
        "Department",
        "Role",
        "Employment Type",
        "Phone",
        "Email",
        "Date Joined",
        "Status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.department.clone(),
            self.role.clone(),
            self.employment_type.label().to_string(),
            self.phone.clone(),
            optional(self.email.as_deref()),
            self.date_joined.to_string(),
            self.status.label().to_string(),
        ]
    }
}

impl Tabular for StaffAttendance {
    const REPORT_NAME: &'static str = "attendance-report";
    const TITLE: &'static str = "Staff Attendance Report";
    const HEADERS: &'static [&'static str] = &[
        "Staff ID",
        "Name",
        "Department",
        "Date",
        "Status",
        "Check In",
        "Check Out",
        "Late (min)",
        "Worked (min)",
        "Notes",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.staff_id.clone(),
            self.staff_name.clone(),
            self.department.clone(),
            self.date.to_string(),
            self.status.label().to_string(),
            self.check_in.map(format_clock_time).unwrap_or_default(),
            self.check_out.map(format_clock_time).unwrap_or_default(),
            self.late_minutes.to_string(),
            self.worked_minutes().to_string(),
            optional(self.notes.as_deref()),
        ]
    }
}

impl Tabular for BedCategory {
    const REPORT_NAME: &'static str = "bed-report";
    const TITLE: &'static str = "Bed Occupancy Report";
    const HEADERS: &'static [&'static str] = &[
        "Category ID",
        "Category",
        "Total Beds",
        "Occupied",
        "Available",
        "Price per Day",
        "Occupancy (%)",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.category_name.clone(),
            self.total_beds.to_string(),
            self.occupied_beds.to_string(),
            self.available_beds().to_string(),
            format_amount(self.price_per_day),
            format_rate(self.occupancy_rate()),
        ]
    }
}

impl Tabular for Invoice {
    const REPORT_NAME: &'static str = "invoice-report";
    const TITLE: &'static str = "Pharmacy Invoice Report";
    const HEADERS: &'static [&'static str] = &[
        "Invoice ID",
        "Date",
        "Time",
        "File No.",
        "Patient",
        "Items",
        "Amount",
        "Status",
        "Payment Method",
        "Cashier",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.invoice_id.clone(),
            self.date.to_string(),
            format_clock_time(self.time),
            self.patient.file_number.clone(),
            self.patient.patient_name.clone(),
            self.item_count().to_string(),
            format_amount(self.amount),
            self.status.label().to_string(),
            self.payment_method
                .map(|m| m.label().to_string())
                .unwrap_or_default(),
            optional(self.cashier.as_deref()),
        ]
    }
}

impl Tabular for Sale {
    const REPORT_NAME: &'static str = "sales-report";
    const TITLE: &'static str = "Pharmacy Sales Report";
    const HEADERS: &'static [&'static str] = &[
        "Sale ID",
        "Date",
        "Time",
        "File No.",
        "Patient",
        "Items",
        "Amount",
        "Payment Method",
        "Cashier",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.sale_id.clone(),
            self.date.to_string(),
            format_clock_time(self.time),
            self.patient.file_number.clone(),
            self.patient.patient_name.clone(),
            self.item_count().to_string(),
            format_amount(self.amount),
            self.payment_method.label().to_string(),
            self.cashier.clone(),
        ]
    }
}
