//! Gzip archive of one outlet's new prices.
//!
//! Files land at `<save>/<enterprise>/rest_<serial>_<YYYYmmddHHMMSS>.xml.gz`.
//! The document is streamed through the encoder into a `.part` file that is
//! renamed into place once complete, so readers never see a partial archive.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use flate2::{Compression, GzBuilder};
use rxprice_core::{NewPrice, PriceSnapshot};

use crate::error::ExportError;
use crate::xml::write_offers;

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Where one outlet's prices are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub save_path: PathBuf,
    pub enterprise_code: i64,
    pub serial_number: i64,
    pub stamp: NaiveDateTime,
}

impl ExportTarget {
    /// Name of the XML document inside the archive.
    #[must_use]
    pub fn document_name(&self) -> String {
        format!(
            "rest_{}_{}.xml",
            self.serial_number,
            self.stamp.format(STAMP_FORMAT)
        )
    }

    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.save_path.join(self.enterprise_code.to_string())
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.directory().join(format!("{}.gz", self.document_name()))
    }
}

/// Earliest snapshot timestamp, or the current UTC time when no row has one.
#[must_use]
pub fn run_stamp(snapshots: &[PriceSnapshot]) -> NaiveDateTime {
    snapshots
        .iter()
        .filter_map(|s| s.effective_at)
        .min()
        .unwrap_or_else(|| Utc::now().naive_utc())
}

/// Writes `rows` to `target` and returns the archive path.
///
/// # Errors
///
/// - [`ExportError::Empty`] if `rows` is empty.
/// - [`ExportError::Io`] if the directory, file or rename fails.
/// - [`ExportError::Xml`] if rendering fails.
pub fn export_prices(target: &ExportTarget, rows: &[NewPrice]) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let dir = target.directory();
    fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    let path = target.path();
    let part = path.with_extension("gz.part");

    if let Err(e) = write_archive(&part, &target.document_name(), rows) {
        // leave no partial file behind
        let _ = fs::remove_file(&part);
        return Err(e);
    }
    fs::rename(&part, &path).map_err(|e| io_err(&path, e))?;

    tracing::info!(
        path = %path.display(),
        rows = rows.len(),
        "exported new prices"
    );
    Ok(path)
}

fn write_archive(part: &Path, document_name: &str, rows: &[NewPrice]) -> Result<(), ExportError> {
    let file = File::create(part).map_err(|e| io_err(part, e))?;
    let encoder = GzBuilder::new()
        .filename(document_name)
        .write(BufWriter::new(file), Compression::default());

    let encoder = write_offers(encoder, rows)?;
    let mut inner = encoder.finish().map_err(|e| io_err(part, e))?;
    inner.flush().map_err(|e| io_err(part, e))?;
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;
