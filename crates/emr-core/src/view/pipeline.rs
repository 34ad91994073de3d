//! Collection + query → page + summary.

use super::page::PageInfo;
use super::query::ViewQuery;
use super::summary::Summarize;

/// Result of running a query over a collection.
#[derive(Debug, Clone)]
pub struct ListView<'a, T: Summarize> {
    visible: Vec<&'a T>,
    page: PageInfo,
    summary: T::Summary,
}

impl<'a, T: Summarize> ListView<'a, T> {
    /// All matching records, in collection order.
    pub fn visible(&self) -> &[&'a T] {
        &self.visible
    }

    /// Records on the current page.
    pub fn page_items(&self) -> &[&'a T] {
        &self.visible[self.page.range()]
    }

    pub fn page(&self) -> &PageInfo {
        &self.page
    }

    /// Aggregate over the filtered set (used by reports and exports).
    pub fn summary(&self) -> &T::Summary {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Empty-state message, or `None` when there is something to show.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(T::EMPTY_MESSAGE)
    }

    pub fn into_visible(self) -> Vec<&'a T> {
        self.visible
    }
}

/// Run the pipeline: search AND filters AND date range, then paginate and
/// summarize the filtered set.
pub fn derive_view<'a, T: Summarize>(records: &'a [T], query: &ViewQuery<T::Field>) -> ListView<'a, T> {
    let visible: Vec<&T> = records.iter().filter(|r| query.matches(*r)).collect();
    let page = PageInfo::new(visible.len(), query.page_size(), query.page());
    let summary = T::summarize(visible.iter().copied());

    tracing::debug!(
        total = records.len(),
        matched = visible.len(),
        page = page.number,
        total_pages = page.total_pages,
        "derived list view"
    );

    ListView {
        visible,
        page,
        summary,
    }
}

/// KPI cards always reflect the whole collection, regardless of filters.
pub fn kpis<T: Summarize>(records: &[T]) -> T::Summary {
    T::summarize(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Gender, InvoiceStatus, NewPatient, Patient, PatientField, PatientStatus,
    };
    use crate::view::{DateRange, FilterValue};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_patients() -> Vec<Patient> {
        let rows = [
            ("Ama Mensah", "0241110001", PatientStatus::Active, date(2025, 1, 5)),
            ("Kwame Asante", "0241110002", PatientStatus::Admitted, date(2025, 1, 20)),
            ("Abena Owusu", "0241110003", PatientStatus::Active, date(2025, 2, 2)),
            ("Yaw Darko", "0241110004", PatientStatus::Discharged, date(2025, 2, 14)),
            ("Akosua Boateng", "0241110005", PatientStatus::PendingPayment, date(2025, 3, 1)),
        ];
        rows.iter()
            .enumerate()
            .map(|(i, (name, phone, status, registered))| {
                let form = NewPatient::new(*name, date(1990, 1, 1), Gender::Female, *phone);
                let mut patient =
                    Patient::from_registration(format!("GH-2025-{:05}", i + 1), form, *registered);
                patient.status = *status;
                patient
            })
            .collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let patients = make_patients();
        let view = derive_view(&patients, &ViewQuery::new(10));
        let names: Vec<_> = view.visible().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Ama Mensah", "Kwame Asante", "Abena Owusu", "Yaw Darko", "Akosua Boateng"]
        );
        assert_eq!(view.page().total_pages, 1);
        assert!(view.empty_message().is_none());
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let patients = make_patients();
        let query = ViewQuery::new(10).with_search("OWUSU");
        let view = derive_view(&patients, &query);
        assert_eq!(view.visible().len(), 1);
        assert_eq!(view.visible()[0].name, "Abena Owusu");

        // File number matches too
        let query = ViewQuery::new(10).with_search("gh-2025-0000");
        assert_eq!(derive_view(&patients, &query).visible().len(), 5);
    }

    #[test]
    fn test_filters_and_date_range_combine() {
        let patients = make_patients();
        let query = ViewQuery::new(10)
            .with_filter(PatientField::Status, "Active")
            .with_date_range(DateRange::new(Some(date(2025, 2, 1)), None));
        let view = derive_view(&patients, &query);
        assert_eq!(view.visible().len(), 1);
        assert_eq!(view.visible()[0].name, "Abena Owusu");
    }

    #[test]
    fn test_all_sentinel_is_unconstrained() {
        let patients = make_patients();
        let query = ViewQuery::new(10).with_filter(PatientField::Status, "all");
        assert_eq!(derive_view(&patients, &query).visible().len(), 5);
    }

    #[test]
    fn test_pagination_slices() {
        let patients = make_patients();
        let query = ViewQuery::new(2).with_page(3);
        let view = derive_view(&patients, &query);
        assert_eq!(view.page().total_pages, 3);
        assert_eq!(view.page_items().len(), 1);
        assert_eq!(view.page_items()[0].name, "Akosua Boateng");
    }

    #[test]
    fn test_summary_filtered_vs_kpis_unfiltered() {
        let patients = make_patients();
        let query = ViewQuery::new(10).with_filter(PatientField::Status, "Active");
        let view = derive_view(&patients, &query);
        assert_eq!(view.summary().total, 2);
        assert_eq!(kpis(&patients).total, 5);
        assert_eq!(kpis(&patients).admitted, 1);
    }

    #[test]
    fn test_empty_state() {
        let patients = make_patients();
        let mut query = ViewQuery::new(10);
        query.set_filter(PatientField::Status, FilterValue::Only("Deceased".into()));
        let view = derive_view(&patients, &query);
        assert!(view.is_empty());
        assert_eq!(view.page().total_pages, 0);
        assert_eq!(view.empty_message(), Some("No patients found"));
        assert!(view.page_items().is_empty());
    }

    #[test]
    fn test_unknown_filter_value_is_not_an_error() {
        // A stale dropdown value simply matches nothing
        let patients = make_patients();
        let query = ViewQuery::new(10).with_filter(PatientField::Status, InvoiceStatus::Paid.label());
        assert!(derive_view(&patients, &query).is_empty());
    }
}
