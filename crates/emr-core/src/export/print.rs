//! Printable HTML reports.
//!
//! Rendering is pure: [`render_report`] turns a letterhead, a summary and
//! the filtered records into a self-contained HTML document. Showing it is
//! the job of a [`ReportPresenter`] supplied by the host.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{checksum, export_filename, ExportError, ExportResult, Tabular};
use crate::config::Letterhead;
use crate::view::{ListView, Summary};

const REPORT_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 24px; color: #222; }
.letterhead { text-align: center; border-bottom: 2px solid #1a5276; padding-bottom: 8px; }
.letterhead h1 { margin: 0; color: #1a5276; }
.letterhead p { margin: 2px 0; font-size: 12px; }
h2 { margin: 16px 0 8px; }
.meta { display: grid; grid-template-columns: 1fr 1fr; gap: 4px 24px; font-size: 13px; margin-bottom: 16px; }
.meta span { font-weight: bold; }
table { width: 100%; border-collapse: collapse; font-size: 12px; }
th, td { border: 1px solid #ccc; padding: 4px 6px; text-align: left; }
th { background: #eaf2f8; }
td.empty { text-align: center; font-style: italic; }
@media print { body { margin: 0; } }";

/// A rendered report, independent of how it is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    /// `<report-name>-<YYYY-MM-DD>.html`
    pub filename: String,
    pub html: String,
    /// Hex SHA-256 of `html`
    pub checksum: String,
    pub row_count: usize,
}

/// Render a list view's filtered records and summary.
pub fn render_report<T: Tabular>(letterhead: &Letterhead, view: &ListView<'_, T>, generated_on: NaiveDate) -> ReportDocument {
    let summary = view.summary().entries();
    let rows: Vec<Vec<String>> = view.visible().iter().map(|r| r.cells()).collect();
    let html = render_html(
        letterhead,
        T::TITLE,
        generated_on,
        &summary,
        T::HEADERS,
        &rows,
        T::EMPTY_MESSAGE,
    );
    ReportDocument {
        title: T::TITLE.to_string(),
        filename: export_filename(T::REPORT_NAME, generated_on, "html"),
        checksum: checksum(html.as_bytes()),
        html,
        row_count: rows.len(),
    }
}

fn render_html(
    letterhead: &Letterhead,
    title: &str,
    generated_on: NaiveDate,
    summary: &[(&'static str, String)],
    headers: &[&str],
    rows: &[Vec<String>],
    empty_message: &str,
) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(&format!("<style>\n{}\n</style>\n</head>\n<body>\n", REPORT_STYLE));

    html.push_str("<div class=\"letterhead\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&letterhead.name)));
    for line in [&letterhead.address, &letterhead.phone, &letterhead.email] {
        if !line.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
    }
    html.push_str("</div>\n");

    html.push_str(&format!("<h2>{}</h2>\n<div class=\"meta\">\n", escape_html(title)));
    html.push_str(&format!(
        "<div><span>Generated:</span> {}</div>\n",
        generated_on.format("%Y-%m-%d")
    ));
    for (label, value) in summary {
        html.push_str(&format!(
            "<div><span>{}:</span> {}</div>\n",
            escape_html(label),
            escape_html(value)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<table>\n<thead>\n<tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    if rows.is_empty() {
        html.push_str(&format!(
            "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>\n",
            headers.len().max(1),
            escape_html(empty_message)
        ));
    }
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Host boundary that shows a rendered report (print dialog, file, viewer).
pub trait ReportPresenter: Send + Sync {
    fn present(&self, document: &ReportDocument) -> ExportResult<()>;

    /// Tear down whatever `present` created. Called after the configured
    /// print teardown delay.
    fn teardown(&self, _document: &ReportDocument) -> ExportResult<()> {
        Ok(())
    }
}

/// Writes reports as `.html` files into a directory.
#[derive(Debug, Clone)]
pub struct HtmlFilePresenter {
    dir: PathBuf,
}

impl HtmlFilePresenter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Where `document` is (or would be) written.
    pub fn path_for(&self, document: &ReportDocument) -> PathBuf {
        self.dir.join(&document.filename)
    }
}

impl ReportPresenter for HtmlFilePresenter {
    fn present(&self, document: &ReportDocument) -> ExportResult<()> {
        if !self.dir.is_dir() {
            return Err(ExportError::PresenterUnavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        let path = self.path_for(document);
        std::fs::write(&path, &document.html)?;
        tracing::info!(path = %path.display(), rows = document.row_count, "presented report");
        Ok(())
    }
}

/// Present a report, logging failures. Failed presentations are not retried.
pub fn present_report(presenter: &dyn ReportPresenter, document: &ReportDocument) -> ExportResult<()> {
    presenter.present(document).inspect_err(|e| {
        tracing::warn!(title = %document.title, error = %e, "failed to present report");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BedCategory, NewBedCategory};
    use crate::store::Hospital;
    use crate::view::{derive_view, ViewQuery};
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn hospital() -> Hospital {
        let mut hospital = Hospital::default().with_fixed_date(date());
        hospital
            .add_bed_category(NewBedCategory {
                category_name: "Maternity <A&B>".into(),
                total_beds: 10,
                occupied_beds: 4,
                price_per_day: Decimal::new(20000, 2),
                description: None,
            })
            .unwrap();
        hospital
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_render_report() {
        let hospital = hospital();
        let view = derive_view(hospital.bed_categories(), &ViewQuery::new(10));
        let doc = render_report(&Letterhead::default(), &view, date());

        assert_eq!(doc.filename, "bed-report-2025-06-01.html");
        assert_eq!(doc.row_count, 1);
        assert!(doc.html.contains("<style>"));
        assert!(doc.html.contains("General Hospital"));
        assert!(doc.html.contains("<span>Occupancy Rate:</span> 40.0%"));
        assert!(doc.html.contains("Maternity &lt;A&amp;B&gt;"));
        assert!(!doc.html.contains("<A&B>"));
        assert_eq!(doc.checksum, checksum(doc.html.as_bytes()));
    }

    #[test]
    fn test_render_empty_report() {
        let hospital = hospital();
        let query = ViewQuery::new(10).with_search("no such ward");
        let view = derive_view(hospital.bed_categories(), &query);
        let doc = render_report(&Letterhead::default(), &view, date());

        assert_eq!(doc.row_count, 0);
        assert!(doc.html.contains("colspan=\"7\""));
        assert!(doc.html.contains(<BedCategory as crate::view::Listable>::EMPTY_MESSAGE));
    }

    #[test]
    fn test_file_presenter() {
        let dir = tempfile::tempdir().unwrap();
        let hospital = hospital();
        let view = derive_view(hospital.bed_categories(), &ViewQuery::new(10));
        let doc = render_report(&Letterhead::default(), &view, date());

        let presenter = HtmlFilePresenter::new(dir.path());
        present_report(&presenter, &doc).unwrap();
        let written = std::fs::read_to_string(presenter.path_for(&doc)).unwrap();
        assert_eq!(written, doc.html);
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let presenter = HtmlFilePresenter::new(dir.path().join("missing"));
        let hospital = hospital();
        let view = derive_view(hospital.bed_categories(), &ViewQuery::new(10));
        let doc = render_report(&Letterhead::default(), &view, date());

        assert!(matches!(
            present_report(&presenter, &doc),
            Err(ExportError::PresenterUnavailable(_))
        ));
    }
}
