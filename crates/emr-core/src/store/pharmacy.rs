//! Pharmacy invoice and sale operations.
//!
//! Amounts are never taken from the caller: every line subtotal and every
//! document total is recomputed here before it is stored. Invoices and
//! sales are append-only.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{not_found, require, Hospital, StoreError, StoreResult};
use crate::models::{
    items_total, now_rfc3339, Invoice, InvoiceStatus, LineItem, NewInvoice, NewSale,
    PatientSnapshot, PaymentMethod, Sale,
};

impl Hospital {
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Find an invoice by UUID or display number.
    pub fn get_invoice(&self, key: &str) -> Option<&Invoice> {
        self.invoices
            .iter()
            .find(|i| i.id == key || i.invoice_id == key)
    }

    /// Find a sale by UUID or display number.
    pub fn get_sale(&self, key: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == key || s.sale_id == key)
    }

    /// Copy a registered patient's details for a pharmacy document.
    pub fn patient_snapshot(&self, file_number: &str, on: NaiveDate) -> StoreResult<PatientSnapshot> {
        let patient = self
            .get_patient(file_number)
            .ok_or_else(|| not_found("patient", file_number))?;
        Ok(PatientSnapshot {
            file_number: patient.file_number.clone(),
            patient_name: patient.name.clone(),
            phone: patient.phone.clone(),
            age: patient.age_on(on),
            gender: patient.gender,
            patient_type: patient.patient_type,
        })
    }

    /// Create an Unpaid or Pending invoice.
    pub fn create_invoice(&mut self, form: NewInvoice) -> StoreResult<Invoice> {
        if form.status == InvoiceStatus::Paid {
            return Err(StoreError::invalid(
                "status",
                "new invoices are unpaid or pending",
            ));
        }
        check_snapshot(&form.patient)?;
        let (items, amount) = normalize_items(form.items)?;

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_id: self.sequences.invoice.next_id(),
            patient: form.patient,
            amount,
            items,
            status: form.status,
            payment_method: None,
            cashier: None,
            date: form.date,
            time: form.time,
            paid_at: None,
        };
        tracing::info!(invoice_id = %invoice.invoice_id, amount = %invoice.amount, "created invoice");
        self.invoices.push(invoice.clone());
        Ok(invoice)
    }

    /// Replace the items of an unsettled invoice; the total follows.
    pub fn replace_invoice_items(&mut self, key: &str, items: Vec<LineItem>) -> StoreResult<Invoice> {
        let index = self.invoice_index(key)?;
        if self.invoices[index].is_paid() {
            tracing::warn!(invoice = key, "refused to edit paid invoice");
            return Err(StoreError::InvalidTransition(format!(
                "invoice {} is already paid",
                self.invoices[index].invoice_id
            )));
        }
        let (items, amount) = normalize_items(items)?;

        let invoice = &mut self.invoices[index];
        invoice.amount = amount;
        invoice.items = items;
        tracing::info!(invoice_id = %invoice.invoice_id, amount = %invoice.amount, "replaced invoice items");
        Ok(invoice.clone())
    }

    /// Settle an invoice. Only Unpaid or Pending invoices can be paid; a
    /// rejected call leaves the invoice unchanged.
    pub fn mark_invoice_paid(&mut self, key: &str, payment_method: PaymentMethod, cashier: &str) -> StoreResult<Invoice> {
        let index = self.invoice_index(key)?;
        let status = self.invoices[index].status;
        if !status.can_mark_paid() {
            tracing::warn!(invoice = key, status = status.label(), "rejected mark paid");
            return Err(StoreError::InvalidTransition(format!(
                "invoice {} is already {}",
                self.invoices[index].invoice_id,
                status.label()
            )));
        }
        require("cashier", cashier)?;

        let invoice = &mut self.invoices[index];
        invoice.status = InvoiceStatus::Paid;
        invoice.payment_method = Some(payment_method);
        invoice.cashier = Some(cashier.trim().to_string());
        invoice.paid_at = Some(now_rfc3339());
        tracing::info!(
            invoice_id = %invoice.invoice_id,
            method = payment_method.label(),
            amount = %invoice.amount,
            "invoice paid"
        );
        Ok(invoice.clone())
    }

    /// Record a settled sale.
    pub fn create_sale(&mut self, form: NewSale) -> StoreResult<Sale> {
        check_snapshot(&form.patient)?;
        require("cashier", &form.cashier)?;
        let (items, amount) = normalize_items(form.items)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_id: self.sequences.sale.next_id(),
            patient: form.patient,
            amount,
            items,
            payment_method: form.payment_method,
            cashier: form.cashier.trim().to_string(),
            date: form.date,
            time: form.time,
        };
        tracing::info!(sale_id = %sale.sale_id, amount = %sale.amount, "recorded sale");
        self.sales.push(sale.clone());
        Ok(sale)
    }

    fn invoice_index(&self, key: &str) -> StoreResult<usize> {
        self.invoices
            .iter()
            .position(|i| i.id == key || i.invoice_id == key)
            .ok_or_else(|| not_found("invoice", key))
    }
}

fn check_snapshot(patient: &PatientSnapshot) -> StoreResult<()> {
    require("patient_name", &patient.patient_name)?;
    require("file_number", &patient.file_number)
}

/// Validate line items, recompute every subtotal and return the document
/// total. Amounts that do not fit a `Decimal` are rejected.
fn normalize_items(mut items: Vec<LineItem>) -> StoreResult<(Vec<LineItem>, Decimal)> {
    if items.is_empty() {
        return Err(StoreError::MissingField { field: "items" });
    }
    for item in &mut items {
        require("item name", &item.name)?;
        if item.quantity == 0 {
            return Err(StoreError::invalid("quantity", format!("{} has zero quantity", item.name)));
        }
        if item.price.is_sign_negative() && !item.price.is_zero() {
            return Err(StoreError::invalid("price", format!("{} has a negative price", item.name)));
        }
        if !item.recompute() {
            return Err(StoreError::invalid("price", format!("{} subtotal is out of range", item.name)));
        }
    }
    let total = items_total(&items)
        .ok_or_else(|| StoreError::invalid("price", "invoice total is out of range"))?;
    Ok((items, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, NewPatient, PatientType};
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn time() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 30, 0).unwrap()
    }

    fn snapshot() -> PatientSnapshot {
        PatientSnapshot {
            file_number: "GH-2025-00001".into(),
            patient_name: "Ama Mensah".into(),
            phone: "0244000000".into(),
            age: 37,
            gender: Gender::Female,
            patient_type: PatientType::Outpatient,
        }
    }

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("D001", "Amoxicillin", "500mg, 3x daily", 2, Decimal::new(1250, 2)),
            LineItem::new("D002", "Paracetamol", "1g as needed", 3, Decimal::new(400, 2)),
        ]
    }

    fn new_invoice(status: InvoiceStatus) -> NewInvoice {
        NewInvoice {
            patient: snapshot(),
            items: items(),
            status,
            date: date(),
            time: time(),
        }
    }

    #[test]
    fn test_create_invoice_computes_amount() {
        let mut hospital = Hospital::default();
        let mut form = new_invoice(InvoiceStatus::Unpaid);
        // A tampered subtotal is corrected
        form.items[0].subtotal = Decimal::new(1, 0);

        let invoice = hospital.create_invoice(form).unwrap();
        assert_eq!(invoice.invoice_id, "INV-000001");
        assert_eq!(invoice.items[0].subtotal, Decimal::new(2500, 2));
        assert_eq!(invoice.amount, Decimal::new(3700, 2));
        assert!(Uuid::parse_str(&invoice.id).is_ok());
    }

    #[test]
    fn test_create_invoice_validation() {
        let mut hospital = Hospital::default();
        assert!(hospital.create_invoice(new_invoice(InvoiceStatus::Paid)).is_err());

        let mut empty = new_invoice(InvoiceStatus::Pending);
        empty.items.clear();
        assert_eq!(
            hospital.create_invoice(empty),
            Err(StoreError::MissingField { field: "items" })
        );

        let mut zero = new_invoice(InvoiceStatus::Pending);
        zero.items[1].quantity = 0;
        assert!(hospital.create_invoice(zero).is_err());
        assert!(hospital.invoices().is_empty());
    }

    #[test]
    fn test_mark_paid_once() {
        let mut hospital = Hospital::default();
        let invoice = hospital.create_invoice(new_invoice(InvoiceStatus::Pending)).unwrap();

        assert!(matches!(
            hospital.mark_invoice_paid(&invoice.id, PaymentMethod::Cash, " "),
            Err(StoreError::MissingField { field: "cashier" })
        ));
        assert_eq!(hospital.invoices()[0].status, InvoiceStatus::Pending);

        let paid = hospital
            .mark_invoice_paid(&invoice.invoice_id, PaymentMethod::Card, "Kojo")
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.payment_method, Some(PaymentMethod::Card));
        assert_eq!(paid.cashier.as_deref(), Some("Kojo"));
        assert!(paid.paid_at.is_some());

        let before = hospital.invoices()[0].clone();
        assert!(matches!(
            hospital.mark_invoice_paid(&invoice.id, PaymentMethod::Cash, "Esi"),
            Err(StoreError::InvalidTransition(_))
        ));
        assert_eq!(hospital.invoices()[0], before);
    }

    #[test]
    fn test_replace_items_until_paid() {
        let mut hospital = Hospital::default();
        let invoice = hospital.create_invoice(new_invoice(InvoiceStatus::Unpaid)).unwrap();

        let items = vec![LineItem::new("D003", "ORS", "1 sachet", 5, Decimal::new(300, 2))];
        let updated = hospital.replace_invoice_items(&invoice.id, items.clone()).unwrap();
        assert_eq!(updated.amount, Decimal::new(1500, 2));

        hospital
            .mark_invoice_paid(&invoice.id, PaymentMethod::Transfer, "Kojo")
            .unwrap();
        assert!(hospital.replace_invoice_items(&invoice.id, items).is_err());
    }

    #[test]
    fn test_create_sale() {
        let mut hospital = Hospital::default();
        let form = NewSale {
            patient: snapshot(),
            items: items(),
            payment_method: PaymentMethod::Insurance,
            cashier: "Kojo".into(),
            date: date(),
            time: time(),
        };
        let sale = hospital.create_sale(form.clone()).unwrap();
        assert_eq!(sale.sale_id, "SAL-000001");
        assert_eq!(sale.amount, Decimal::new(3700, 2));
        assert_eq!(sale.item_count(), 5);

        let mut bulk = form.clone();
        bulk.items = vec![
            LineItem::new("D001", "Gauze", "1 roll", u32::MAX, Decimal::ZERO),
            LineItem::new("D002", "Plaster", "1 roll", 1, Decimal::ZERO),
        ];
        let sale = hospital.create_sale(bulk).unwrap();
        assert_eq!(sale.item_count(), u64::from(u32::MAX) + 1);

        let mut no_cashier = form;
        no_cashier.cashier = String::new();
        assert!(hospital.create_sale(no_cashier).is_err());
        assert_eq!(hospital.sales().len(), 2);
    }

    #[test]
    fn test_out_of_range_amounts_are_rejected() {
        let mut hospital = Hospital::default();
        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();

        let mut overflowing = new_invoice(InvoiceStatus::Unpaid);
        overflowing.items = vec![
            LineItem::new("D001", "Implant", "1 unit", 1, huge),
            LineItem::new("D002", "Implant", "1 unit", 1, huge),
        ];
        assert!(matches!(
            hospital.create_invoice(overflowing),
            Err(StoreError::Invalid { field: "price", .. })
        ));

        let mut too_many = new_invoice(InvoiceStatus::Unpaid);
        too_many.items = vec![LineItem::new("D001", "Implant", "1 unit", 3, huge)];
        assert!(matches!(
            hospital.create_invoice(too_many),
            Err(StoreError::Invalid { field: "price", .. })
        ));
        assert!(hospital.invoices().is_empty());

        let invoice = hospital.create_invoice(new_invoice(InvoiceStatus::Unpaid)).unwrap();
        let items = vec![
            LineItem::new("D001", "Implant", "1 unit", 1, huge),
            LineItem::new("D002", "Implant", "1 unit", 1, huge),
        ];
        assert!(hospital.replace_invoice_items(&invoice.id, items).is_err());
        assert_eq!(hospital.invoices()[0], invoice);
    }

    #[test]
    fn test_patient_snapshot() {
        let mut hospital = Hospital::default().with_fixed_date(date());
        let patient = hospital
            .register_patient(NewPatient::new(
                "Ama Mensah",
                NaiveDate::from_ymd_opt(1988, 3, 12).unwrap(),
                Gender::Female,
                "0244000000",
            ))
            .unwrap();
        let snapshot = hospital.patient_snapshot(&patient.file_number, date()).unwrap();
        assert_eq!(snapshot.age, 37);
        assert_eq!(snapshot.patient_name, "Ama Mensah");
        assert!(hospital.patient_snapshot("GH-0000-00000", date()).is_err());
    }
}
