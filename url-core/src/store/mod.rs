//! Prediction Store - append-only log of classification outcomes
//!
//! Rows are `URL,Prediction,Probability`. The core only ever appends; the
//! whole file is rewritten on each append under one lock so readers never see
//! a half-written table.

pub mod record;
pub mod writer;


use thiserror::Error;

pub use record::PredictionRecord;
pub use writer::CsvPredictionStore;

/// Column header of the prediction log
pub const CSV_HEADER: [&str; 3] = ["URL", "Prediction", "Probability"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("prediction log io: {0}")]
    Io(#[from] std::io::Error),

    #[error("prediction log csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Durable, append-only sink for prediction rows
pub trait PredictionLog: Send + Sync {
    /// Append rows as one unit
    fn append(&self, records: &[PredictionRecord]) -> Result<(), StoreError>;

    /// Every row appended so far, oldest first
    fn read_all(&self) -> Vec<PredictionRecord>;

    /// Number of rows appended so far
    fn count(&self) -> usize {
        self.read_all().len()
    }

    /// Log contents as CSV bytes (header only when empty)
    fn export_bytes(&self) -> Result<Vec<u8>, StoreError>;
}
