pub mod csv_loader;

use std::path::{Path, PathBuf};
use stochrsi_core::{Bar, DataError};

/// A directory of `<instrument>.csv` bar files.
pub struct CsvDataProvider {
    pub directory: PathBuf,
}

impl CsvDataProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Load all bars for an instrument, sorted by timestamp.
    pub fn load_bars(&self, instrument: &str) -> Result<Vec<Bar>, DataError> {
        let file_path = self.directory.join(format!("{}.csv", instrument));
        if !file_path.exists() {
            return Err(DataError::NotFound(format!(
                "CSV file not found: {}",
                file_path.display()
            )));
        }
        csv_loader::load_bars_from_csv(&file_path)
    }

    /// Instruments with a CSV file in the directory.
    pub fn available_instruments(&self) -> Result<Vec<String>, DataError> {
        let mut instruments = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if is_csv(&path) {
                if let Some(stem) = path.file_stem() {
                    instruments.push(stem.to_string_lossy().to_string());
                }
            }
        }
        instruments.sort();
        Ok(instruments)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension().map(|e| e == "csv").unwrap_or(false)
}
