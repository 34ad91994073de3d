//! Pharmacy invoice and sale models.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{impl_label_traits, label_key, Gender, UnknownVariant};
use super::patient::PatientType;
use crate::view::Listable;

/// Invoice settlement status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    Pending,
}

impl InvoiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::Pending => "Pending",
        }
    }

    /// Only unsettled invoices may be marked paid.
    pub fn can_mark_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Insurance,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Insurance => "Insurance",
        }
    }
}

impl_label_traits!(InvoiceStatus, "invoice status", {
    "paid" => InvoiceStatus::Paid,
    "unpaid" => InvoiceStatus::Unpaid,
    "pending" => InvoiceStatus::Pending,
});

impl_label_traits!(PaymentMethod, "payment method", {
    "cash" => PaymentMethod::Cash,
    "card" => PaymentMethod::Card,
    "pos" => PaymentMethod::Card,
    "transfer" => PaymentMethod::Transfer,
    "banktransfer" => PaymentMethod::Transfer,
    "momo" => PaymentMethod::Transfer,
    "insurance" => PaymentMethod::Insurance,
    "nhis" => PaymentMethod::Insurance,
});

/// One dispensed drug line. `subtotal == quantity * price` always holds
/// for items built through [`LineItem::new`] or normalized by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub drug_id: String,
    pub name: String,
    /// Dosage instruction (e.g. "500mg, 2x daily")
    pub dosage: String,
    pub quantity: u32,
    /// Unit price
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl LineItem {
    pub fn new(
        drug_id: impl Into<String>,
        name: impl Into<String>,
        dosage: impl Into<String>,
        quantity: u32,
        price: Decimal,
    ) -> Self {
        Self {
            drug_id: drug_id.into(),
            name: name.into(),
            dosage: dosage.into(),
            quantity,
            price,
            subtotal: Decimal::from(quantity).saturating_mul(price),
        }
    }

    /// `quantity * price`, or `None` when it does not fit a `Decimal`.
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }

    /// Recompute the subtotal from quantity and price. On overflow the
    /// subtotal is left as it was and `false` is returned.
    pub fn recompute(&mut self) -> bool {
        match self.checked_subtotal() {
            Some(subtotal) => {
                self.subtotal = subtotal;
                true
            }
            None => false,
        }
    }
}

/// Sum of line subtotals, or `None` on overflow.
pub fn items_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.subtotal))
}

/// Total dispensed units. Summed as `u64` so any number of `u32` lines fits.
fn total_quantity(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Patient details copied onto a pharmacy document at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSnapshot {
    pub file_number: String,
    pub patient_name: String,
    pub phone: String,
    pub age: u32,
    pub gender: Gender,
    pub patient_type: PatientType,
}

/// A pharmacy invoice awaiting or having received payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    /// Internal UUID
    pub id: String,
    /// Display number, e.g. `INV-000001`
    pub invoice_id: String,
    pub patient: PatientSnapshot,
    pub items: Vec<LineItem>,
    /// Always the sum of item subtotals
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub payment_method: Option<PaymentMethod>,
    pub cashier: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Payment timestamp
    pub paid_at: Option<String>,
}

impl Invoice {
    pub fn item_count(&self) -> u64 {
        total_quantity(&self.items)
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// A settled over-the-counter or prescription sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    /// Internal UUID
    pub id: String,
    /// Display number, e.g. `SAL-000001`
    pub sale_id: String,
    pub patient: PatientSnapshot,
    pub items: Vec<LineItem>,
    /// Always the sum of item subtotals
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub cashier: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Sale {
    pub fn item_count(&self) -> u64 {
        total_quantity(&self.items)
    }
}

/// Input for a new invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewInvoice {
    pub patient: PatientSnapshot,
    pub items: Vec<LineItem>,
    /// Unpaid or Pending; Paid is only reachable through `mark_paid`
    pub status: InvoiceStatus,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Input for a new sale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSale {
    pub patient: PatientSnapshot,
    pub items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    pub cashier: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceField {
    InvoiceId,
    FileNumber,
    PatientName,
    Phone,
    PatientType,
    Status,
    PaymentMethod,
    Cashier,
}

impl FromStr for InvoiceField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "invoiceid" | "id" => Ok(InvoiceField::InvoiceId),
            "filenumber" | "fileno" => Ok(InvoiceField::FileNumber),
            "patientname" | "name" => Ok(InvoiceField::PatientName),
            "phone" => Ok(InvoiceField::Phone),
            "patienttype" => Ok(InvoiceField::PatientType),
            "status" => Ok(InvoiceField::Status),
            "paymentmethod" => Ok(InvoiceField::PaymentMethod),
            "cashier" => Ok(InvoiceField::Cashier),
            _ => Err(UnknownVariant::new("invoice field", s)),
        }
    }
}

impl Listable for Invoice {
    type Field = InvoiceField;

    const SEARCH_FIELDS: &'static [InvoiceField] = &[
        InvoiceField::InvoiceId,
        InvoiceField::FileNumber,
        InvoiceField::PatientName,
        InvoiceField::Phone,
    ];
    const EMPTY_MESSAGE: &'static str = "No invoices match the selected filters";

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: InvoiceField) -> Option<Cow<'_, str>> {
        match field {
            InvoiceField::InvoiceId => Some(Cow::Borrowed(&self.invoice_id)),
            InvoiceField::FileNumber => Some(Cow::Borrowed(&self.patient.file_number)),
            InvoiceField::PatientName => Some(Cow::Borrowed(&self.patient.patient_name)),
            InvoiceField::Phone => Some(Cow::Borrowed(&self.patient.phone)),
            InvoiceField::PatientType => Some(Cow::Borrowed(self.patient.patient_type.label())),
            InvoiceField::Status => Some(Cow::Borrowed(self.status.label())),
            InvoiceField::PaymentMethod => self.payment_method.map(|m| Cow::Borrowed(m.label())),
            InvoiceField::Cashier => self.cashier.as_deref().map(Cow::Borrowed),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleField {
    SaleId,
    FileNumber,
    PatientName,
    Phone,
    PatientType,
    PaymentMethod,
    Cashier,
}

impl FromStr for SaleField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match label_key(s).as_str() {
            "saleid" | "id" => Ok(SaleField::SaleId),
            "filenumber" | "fileno" => Ok(SaleField::FileNumber),
            "patientname" | "name" => Ok(SaleField::PatientName),
            "phone" => Ok(SaleField::Phone),
            "patienttype" => Ok(SaleField::PatientType),
            "paymentmethod" => Ok(SaleField::PaymentMethod),
            "cashier" => Ok(SaleField::Cashier),
            _ => Err(UnknownVariant::new("sale field", s)),
        }
    }
}

impl Listable for Sale {
    type Field = SaleField;

    const SEARCH_FIELDS: &'static [SaleField] = &[
        SaleField::SaleId,
        SaleField::FileNumber,
        SaleField::PatientName,
        SaleField::Phone,
    ];
    const EMPTY_MESSAGE: &'static str = "No sales match the selected filters";

    fn id(&self) -> &str {
        &self.id
    }

    fn text(&self, field: SaleField) -> Option<Cow<'_, str>> {
        match field {
            SaleField::SaleId => Some(Cow::Borrowed(&self.sale_id)),
            SaleField::FileNumber => Some(Cow::Borrowed(&self.patient.file_number)),
            SaleField::PatientName => Some(Cow::Borrowed(&self.patient.patient_name)),
            SaleField::Phone => Some(Cow::Borrowed(&self.patient.phone)),
            SaleField::PatientType => Some(Cow::Borrowed(self.patient.patient_type.label())),
            SaleField::PaymentMethod => Some(Cow::Borrowed(self.payment_method.label())),
            SaleField::Cashier => Some(Cow::Borrowed(&self.cashier)),
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_subtotal() {
        let item = LineItem::new("DRG-01", "Amoxicillin 500mg", "1 cap 3x daily", 25, Decimal::new(85, 0));
        assert_eq!(item.subtotal, Decimal::new(2125, 0));
    }

    #[test]
    fn test_recompute_after_edit() {
        let mut item = LineItem::new("DRG-01", "Paracetamol", "2 tabs", 10, Decimal::new(50, 2));
        item.quantity = 4;
        assert!(item.recompute());
        assert_eq!(item.subtotal, Decimal::new(200, 2));
    }

    #[test]
    fn test_recompute_overflow_keeps_subtotal() {
        let mut item = LineItem::new("DRG-01", "Paracetamol", "2 tabs", 1, Decimal::new(50, 2));
        item.quantity = u32::MAX;
        item.price = Decimal::MAX;
        assert_eq!(item.checked_subtotal(), None);
        assert!(!item.recompute());
        assert_eq!(item.subtotal, Decimal::new(50, 2));
    }

    #[test]
    fn test_items_total() {
        let items = vec![
            LineItem::new("A", "A", "", 2, Decimal::new(1000, 2)),
            LineItem::new("B", "B", "", 1, Decimal::new(550, 2)),
        ];
        assert_eq!(items_total(&items), Some(Decimal::new(2550, 2)));
        assert_eq!(items_total(&[]), Some(Decimal::ZERO));

        let huge = Decimal::from_str("50000000000000000000000000000").unwrap();
        let items = vec![
            LineItem::new("A", "A", "", 1, huge),
            LineItem::new("B", "B", "", 1, huge),
        ];
        assert_eq!(items_total(&items), None);
    }

    #[test]
    fn test_item_count_does_not_wrap() {
        let items = vec![
            LineItem::new("A", "A", "", u32::MAX, Decimal::ZERO),
            LineItem::new("B", "B", "", 1, Decimal::ZERO),
        ];
        assert_eq!(total_quantity(&items), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_invoice_status_guard() {
        assert!(InvoiceStatus::Unpaid.can_mark_paid());
        assert!(InvoiceStatus::Pending.can_mark_paid());
        assert!(!InvoiceStatus::Paid.can_mark_paid());
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("POS".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("Bank Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}
