//! CSV and printable report export of filtered list views.

mod csv;
mod print;
mod tabular;

pub use csv::*;
pub use print::*;
pub use tabular::*;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report presenter unavailable: {0}")]
    PresenterUnavailable(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Hex-encoded SHA-256 of an export artifact.
pub fn checksum(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable() {
        let a = checksum(b"Invoice ID,Amount\n");
        let b = checksum(b"Invoice ID,Amount\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, checksum(b"Invoice ID,Amount\r\n"));
        assert_eq!(
            checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
