//! End-to-end store, export and FFI surface tests.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use emr_core::deferred::{DeferredError, PendingAction};
use emr_core::export::{export_csv, ExportResult, ReportDocument, ReportPresenter};
use emr_core::models::{
    AttendanceStatus, Gender, LineItem, NewInvoice, NewPatient, NewStaff, PatientSnapshot,
    PatientType, StaffAttendance,
};
use emr_core::view::{derive_view, format_rate, kpis, percentage, ViewQuery};
use emr_core::{
    open_emr, open_emr_with_config, EmrCore, EmrError, FfiLineItem, FfiListQuery, FfiNewInvoice,
    FfiNewPatient, FfiNewSale, FfiPatientSnapshot, FfiReportKind, Hospital, InvoiceStatus,
    PaymentMethod, StoreError,
};
use rust_decimal::Decimal;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn snapshot() -> PatientSnapshot {
    PatientSnapshot {
        file_number: "GH-2025-00001".into(),
        patient_name: "Kwame Asante".into(),
        phone: "0201234567".into(),
        age: 40,
        gender: Gender::Male,
        patient_type: PatientType::Outpatient,
    }
}

fn invoice_for(amount: i64) -> NewInvoice {
    NewInvoice {
        patient: snapshot(),
        items: vec![LineItem::new("DRG-1", "Amoxicillin", "500mg", 1, Decimal::from(amount))],
        status: InvoiceStatus::Unpaid,
        date: date(),
        time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    }
}

fn hospital_with_staff(names: &[&str]) -> (Hospital, Vec<String>) {
    let mut hospital = Hospital::default().with_fixed_date(date());
    let ids = names
        .iter()
        .map(|name| {
            hospital
                .add_staff(NewStaff::new(*name, "Nursing", "Nurse", date()))
                .unwrap()
                .id
        })
        .collect();
    (hospital, ids)
}

#[test]
fn test_day_roster_is_stored_plus_synthetic_absent() {
    let (mut hospital, ids) =
        hospital_with_staff(&["Ama", "Kofi", "Esi", "Yaw", "Akua", "Kojo"]);
    hospital.check_in(&ids[0], date(), "07:55").unwrap();
    hospital.check_in(&ids[1], date(), "08:40").unwrap();
    hospital
        .mark_attendance(&ids[2], date(), AttendanceStatus::Absent, Some("Sick".into()))
        .unwrap();
    // Suspended staff drop off the roster.
    hospital.deactivate_staff(&ids[5]).unwrap();

    let day = hospital.attendance_for_day(date());
    let active = 5;
    let stored = 3;
    assert_eq!(day.len(), active);
    assert_eq!(day.iter().filter(|r| !r.synthetic).count(), stored);
    assert_eq!(day.iter().filter(|r| r.synthetic).count(), active - stored);

    let order: Vec<String> = day.iter().map(|r| r.staff_id.clone()).collect();
    assert_eq!(order, ids[..5].to_vec());
    assert_eq!(day[0].status, AttendanceStatus::Present);
    assert_eq!(day[1].status, AttendanceStatus::Late);
    assert_eq!(day[3].id, StaffAttendance::synthetic_id(&ids[3], date()));

    // Synthetic entries are projected, never written.
    assert_eq!(hospital.attendance_records().len(), stored);

    let summary = kpis(&day);
    assert_eq!(summary.present, 1);
    assert_eq!(summary.late, 1);
    assert_eq!(summary.absent, 3);
    assert_eq!(summary.attendance_rate_label(), "40.0");
}

#[test]
fn test_paid_invoice_cannot_be_paid_again() {
    let mut hospital = Hospital::default();
    let invoice = hospital.create_invoice(invoice_for(2125)).unwrap();
    let paid = hospital
        .mark_invoice_paid(&invoice.invoice_id, PaymentMethod::Cash, "Ama Owusu")
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let err = hospital
        .mark_invoice_paid(&invoice.id, PaymentMethod::Card, "Kofi Boateng")
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition(_)));

    let after = hospital.get_invoice(&invoice.invoice_id).unwrap();
    assert_eq!(after, &paid);
    assert_eq!(after.amount, Decimal::from(2125));
    assert_eq!(after.payment_method, Some(PaymentMethod::Cash));
}

#[test]
fn test_rates_over_nothing_are_zero() {
    assert_eq!(percentage(0, 0), 0.0);
    assert_eq!(format_rate(percentage(0, 0)), "0.0");

    let hospital = Hospital::default();
    let day = hospital.attendance_for_day(date());
    assert!(day.is_empty());
    assert_eq!(kpis(&day).attendance_rate_label(), "0.0");
}

#[test]
fn test_invoice_csv_keeps_order_and_amounts() {
    let mut hospital = Hospital::default().with_fixed_date(date());
    for amount in [2125, 11700, 600] {
        hospital.create_invoice(invoice_for(amount)).unwrap();
    }

    let view = derive_view(hospital.invoices(), &ViewQuery::new(2));
    let file = export_csv(&view, date());
    let lines: Vec<&str> = file.contents.lines().collect();
    assert_eq!(lines.len(), 4);

    let columns: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(columns[6], "Amount");
    let amounts: Vec<&str> = lines[1..]
        .iter()
        .map(|line| line.split(',').nth(6).unwrap())
        .collect();
    assert_eq!(amounts, vec!["2125.00", "11700.00", "600.00"]);
    assert_eq!(file.filename, "invoice-report-2025-06-02.csv");
}

#[test]
fn test_ffi_session_round_trip() {
    let core = open_emr();
    let patient = core
        .register_patient(FfiNewPatient {
            name: "Mensah, Abena".into(),
            date_of_birth: "1985-04-12".into(),
            gender: "Female".into(),
            phone: "0244123456".into(),
            address: "Osu, Accra".into(),
            email: None,
            next_of_kin: None,
            file_type: "Individual".into(),
            patient_type: "OPD".into(),
            parent_file_id: None,
        })
        .unwrap();

    let page = core.list_patients(FfiListQuery::default()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.page.total_items, 1);
    assert!(!page.page.shows_controls);
    assert!(page.empty_message.is_none());

    let missing = core
        .list_patients(FfiListQuery {
            search: "nobody".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(missing.empty_message.as_deref(), Some("No patients found"));

    let snapshot = core.patient_snapshot(patient.file_number.clone()).unwrap();
    assert_eq!(snapshot.patient_name, "Mensah, Abena");

    let export = core
        .export_csv(FfiReportKind::Patients, FfiListQuery::default())
        .unwrap();
    assert_eq!(export.row_count, 1);
    assert!(export.contents.contains("\"Mensah, Abena\""));

    let dir = tempfile::tempdir().unwrap();
    let path = core
        .print_report_to_dir(
            FfiReportKind::Beds,
            FfiListQuery::default(),
            dir.path().display().to_string(),
        )
        .unwrap();
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("No bed categories found"));

    let err = core.delete_patient("GH-1999-99999".into()).unwrap_err();
    assert!(matches!(err, EmrError::NotFound(_)));
    let err = core
        .list_patients(FfiListQuery {
            filters: vec![emr_core::FfiFilter {
                field: "blood group".into(),
                value: "O+".into(),
            }],
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, EmrError::InvalidInput(_)));
}

#[tokio::test]
async fn test_deferred_delete_through_shared_store() {
    let core = open_emr_with_config(r#"{"action_latency_ms": 5}"#.into()).unwrap();
    let file_number = core
        .shared()
        .lock()
        .unwrap()
        .register_patient(NewPatient::new(
            "Yaa Asantewaa",
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            Gender::Female,
            "0209999999",
        ))
        .unwrap()
        .file_number;

    let target = file_number.clone();
    let cancelled = PendingAction::spawn(Duration::from_secs(5), core.shared(), move |h| {
        h.delete_patient(&target)
    });
    cancelled.cancel();
    assert_eq!(cancelled.wait().await, Err(DeferredError::Cancelled));
    assert!(core.get_patient(file_number.clone()).unwrap().is_some());

    let target = file_number.clone();
    let pending = core.schedule(move |h| h.delete_patient(&target)).unwrap();
    pending.wait().await.unwrap();
    assert!(core.get_patient(file_number).unwrap().is_none());
}

struct RecordingPresenter {
    shown: Mutex<Vec<String>>,
    torn_down: Mutex<Vec<String>>,
}

impl ReportPresenter for RecordingPresenter {
    fn present(&self, document: &ReportDocument) -> ExportResult<()> {
        self.shown.lock().unwrap().push(document.filename.clone());
        Ok(())
    }

    fn teardown(&self, document: &ReportDocument) -> ExportResult<()> {
        self.torn_down.lock().unwrap().push(document.filename.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_print_presents_then_tears_down() {
    let core = open_emr_with_config(r#"{"print_teardown_ms": 5}"#.into()).unwrap();
    let presenter = RecordingPresenter {
        shown: Mutex::new(Vec::new()),
        torn_down: Mutex::new(Vec::new()),
    };

    core.print_report(FfiReportKind::Sales, FfiListQuery::default(), &presenter)
        .await
        .unwrap();
    let shown = presenter.shown.lock().unwrap().clone();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].starts_with("sales-report-"));
    assert_eq!(*presenter.torn_down.lock().unwrap(), shown);
}

fn ffi_snapshot() -> FfiPatientSnapshot {
    FfiPatientSnapshot {
        file_number: "GH-2025-00001".into(),
        patient_name: "Kwame Asante".into(),
        phone: "0201234567".into(),
        age: 40,
        gender: "Male".into(),
        patient_type: "OPD".into(),
    }
}

fn ffi_item(drug_id: &str, quantity: u32, price: &str) -> FfiLineItem {
    FfiLineItem {
        drug_id: drug_id.into(),
        name: "Implant".into(),
        dosage: "1 unit".into(),
        quantity,
        price: price.into(),
        subtotal: String::new(),
    }
}

#[test]
fn test_out_of_range_invoice_leaves_session_usable() {
    let core = open_emr();
    let err = core
        .create_invoice(FfiNewInvoice {
            patient: ffi_snapshot(),
            items: vec![
                ffi_item("D1", 1, "50000000000000000000000000000"),
                ffi_item("D2", 1, "50000000000000000000000000000"),
            ],
            status: "Unpaid".into(),
            date: "2025-06-02".into(),
            time: "10:00".into(),
        })
        .unwrap_err();
    assert!(matches!(err, EmrError::InvalidInput(_)));

    let invoices = core.list_invoices(FfiListQuery::default()).unwrap();
    assert_eq!(invoices.page.total_items, 0);
    assert!(core.list_patients(FfiListQuery::default()).is_ok());
    assert!(core.invoice_kpis().is_ok());
}

#[test]
fn test_bulk_sale_counts_past_u32() {
    let core = open_emr();
    core.create_sale(FfiNewSale {
        patient: ffi_snapshot(),
        items: vec![ffi_item("D1", u32::MAX, "0"), ffi_item("D2", 1, "0")],
        payment_method: "Cash".into(),
        cashier: "Kojo".into(),
        date: "2025-06-02".into(),
        time: "10:00".into(),
    })
    .unwrap();

    let expected = (u64::from(u32::MAX) + 1).to_string();
    let items_sold = |entries: Vec<emr_core::FfiSummaryEntry>| {
        entries
            .into_iter()
            .find(|e| e.label == "Items Sold")
            .map(|e| e.value)
    };
    assert_eq!(items_sold(core.sales_kpis().unwrap()), Some(expected.clone()));

    let page = core.list_sales(FfiListQuery::default()).unwrap();
    assert_eq!(items_sold(page.summary), Some(expected));

    let export = core
        .export_csv(FfiReportKind::Sales, FfiListQuery::default())
        .unwrap();
    assert!(export.contents.contains("4294967296"));
}

fn core_with_patients(count: usize) -> EmrCore {
    let core = EmrCore::new(Hospital::default().with_fixed_date(date()));
    {
        let shared = core.shared();
        let mut hospital = shared.lock().unwrap();
        for i in 0..count {
            hospital
                .register_patient(NewPatient::new(
                    format!("Ama Patient {}", i),
                    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                    Gender::Female,
                    "0240000000",
                ))
                .unwrap();
        }
    }
    core
}

#[test]
fn test_changed_search_returns_to_first_page() {
    let core = core_with_patients(30);
    let browse = FfiListQuery {
        page: 3,
        page_size: Some(10),
        ..Default::default()
    };
    assert_eq!(core.list_patients(browse.clone()).unwrap().page.number, 3);

    // The host keeps sending the page it was on.
    let searched = FfiListQuery {
        search: "ama".into(),
        ..browse.clone()
    };
    let first = core.list_patients(searched.clone()).unwrap();
    assert_eq!(first.page.number, 1);
    assert_eq!(first.page.total_items, 30);

    // Same criteria: paging is honored again.
    assert_eq!(core.list_patients(searched).unwrap().page.number, 3);

    let filtered = FfiListQuery {
        filters: vec![emr_core::FfiFilter {
            field: "gender".into(),
            value: "Female".into(),
        }],
        ..browse
    };
    assert_eq!(core.list_patients(filtered.clone()).unwrap().page.number, 1);
    assert_eq!(core.list_patients(filtered).unwrap().page.number, 3);
}

#[test]
fn test_attendance_day_change_returns_to_first_page() {
    let core = EmrCore::new(Hospital::default().with_fixed_date(date()));
    {
        let shared = core.shared();
        let mut hospital = shared.lock().unwrap();
        for i in 0..25 {
            hospital
                .add_staff(NewStaff::new(format!("Nurse {}", i), "Nursing", "Nurse", date()))
                .unwrap();
        }
    }
    let query = FfiListQuery {
        page: 2,
        page_size: Some(10),
        ..Default::default()
    };
    let day = core.list_attendance("2025-06-02".into(), query.clone()).unwrap();
    assert_eq!(day.page.number, 2);
    let next = core.list_attendance("2025-06-03".into(), query).unwrap();
    assert_eq!(next.page.number, 1);
}
