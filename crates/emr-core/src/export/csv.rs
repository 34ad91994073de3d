//! CSV export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{checksum, ExportResult, Tabular};
use crate::view::ListView;

/// A generated export file, ready to download or write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    /// `<report-name>-<YYYY-MM-DD>.<ext>`
    pub filename: String,
    pub contents: String,
    /// Hex SHA-256 of `contents`
    pub checksum: String,
    pub row_count: usize,
}

impl ExportFile {
    pub fn new(filename: String, contents: String, row_count: usize) -> Self {
        let checksum = checksum(contents.as_bytes());
        Self {
            filename,
            contents,
            checksum,
            row_count,
        }
    }

    /// Write into `dir` under the export's file name.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> ExportResult<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.contents)?;
        tracing::info!(path = %path.display(), checksum = %self.checksum, "wrote export file");
        Ok(path)
    }
}

/// `<report-name>-<YYYY-MM-DD>.<ext>`
pub fn export_filename(report_name: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}-{}.{}", report_name, date.format("%Y-%m-%d"), extension)
}

/// Render records as CSV: a header row of labels, then one row per record
/// in the given order. Every line ends with `\n`.
pub fn to_csv<T: Tabular>(records: &[&T]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, T::HEADERS.iter().copied());
    for record in records {
        let cells = record.cells();
        push_row(&mut csv, cells.iter().map(String::as_str));
    }
    csv
}

/// Export every visible record of a list view (not just the current page).
pub fn export_csv<T: Tabular>(view: &ListView<'_, T>, date: NaiveDate) -> ExportFile {
    let contents = to_csv(view.visible());
    let file = ExportFile::new(
        export_filename(T::REPORT_NAME, date, "csv"),
        contents,
        view.visible().len(),
    );
    tracing::info!(filename = %file.filename, rows = file.row_count, "exported csv");
    file
}

fn push_row<'a>(csv: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            csv.push(',');
        }
        csv.push_str(&escape_csv(cell));
    }
    csv.push('\n');
}

/// Quote a field containing a delimiter, quote or line break; embedded
/// quotes are doubled.
pub fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
