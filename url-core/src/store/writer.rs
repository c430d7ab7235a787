use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{PredictionLog, PredictionRecord, StoreError, CSV_HEADER};

/// CSV-backed [`PredictionLog`]
///
/// Holds every row in memory and rewrites the file through a sibling temp
/// file on each append.
pub struct CsvPredictionStore {
    path: PathBuf,
    rows: Mutex<Vec<PredictionRecord>>,
}

impl CsvPredictionStore {
    /// Open the log at `path`, loading any rows already on disk
    ///
    /// Rows that do not parse are dropped with a warning. The file as found
    /// is first copied to `<name>.bak` so the next rewrite loses nothing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rows = if path.exists() {
            let (rows, skipped) = read_rows(&path)?;
            if skipped > 0 {
                let backup = sibling(&path, ".bak");
                fs::copy(&path, &backup)?;
                tracing::warn!(
                    "Skipped {} unreadable rows in {} (original kept at {})",
                    skipped,
                    path.display(),
                    backup.display()
                );
            }
            rows
        } else {
            Vec::new()
        };

        tracing::info!(
            "Prediction log at {} ({} existing rows)",
            path.display(),
            rows.len()
        );

        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Create a header-only file when none exists
    pub fn ensure_file(&self) -> Result<(), StoreError> {
        let rows = self.rows.lock();
        if !self.path.exists() {
            write_rows(&self.path, &rows)?;
        }
        Ok(())
    }
}

impl PredictionLog for CsvPredictionStore {
    fn append(&self, records: &[PredictionRecord]) -> Result<(), StoreError> {
        let mut rows = self.rows.lock();
        rows.extend_from_slice(records);

        // Rows stay in memory even if the rewrite fails
        write_rows(&self.path, &rows)?;

        tracing::debug!(
            "Appended {} rows to {} (total {})",
            records.len(),
            self.path.display(),
            rows.len()
        );
        Ok(())
    }

    fn read_all(&self) -> Vec<PredictionRecord> {
        self.rows.lock().clone()
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn export_bytes(&self) -> Result<Vec<u8>, StoreError> {
        self.ensure_file()?;
        let _rows = self.rows.lock();
        Ok(fs::read(&self.path)?)
    }
}

/// Parsed rows plus the number that could not be read
fn read_rows(path: &Path) -> Result<(Vec<PredictionRecord>, usize), StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    let mut skipped = 0;
    for record in reader.deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                tracing::warn!("Unreadable row at {}:{}: {}", path.display(), line, e);
                skipped += 1;
            }
        }
    }
    Ok((rows, skipped))
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn write_rows(path: &Path, rows: &[PredictionRecord]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = sibling(path, ".tmp");

    // Header is written explicitly so an empty log still has one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp_path)?;
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
