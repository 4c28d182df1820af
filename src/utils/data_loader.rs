//! Data loading utilities

use crate::error::{PrepError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for delimited tabular files.
///
/// Reads a headered CSV or TSV into a [`DataFrame`] with dtype inference.
/// Any I/O or parse failure surfaces as [`PrepError::DataLoadError`].
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set how many rows are sampled for dtype inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        self.load_delimited(path, b',')
    }

    /// Load a delimited file with an explicit separator
    pub fn load_delimited(&self, path: &Path, separator: u8) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            PrepError::DataLoadError(format!("cannot open `{}`: {e}", path.display()))
        })?;

        let parse_opts = CsvParseOptions::default().with_separator(separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                PrepError::DataLoadError(format!("cannot parse `{}`: {e}", path.display()))
            })
    }

    /// Detect the separator from the file extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let separator = if ext == "tsv" { b'\t' } else { b',' };
        self.load_delimited(path, separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "age,city,customer_status").unwrap();
        writeln!(file, "30,NYC,Stayed").unwrap();
        writeln!(file, "40,LA,Churned").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert!(df.column("customer_status").is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new()
            .load_csv(Path::new("no/such/file.csv"))
            .unwrap_err();
        assert!(matches!(err, PrepError::DataLoadError(_)));
    }

    #[test]
    fn test_null_cells_become_nulls() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "age,city").unwrap();
        writeln!(file, "30,NYC").unwrap();
        writeln!(file, ",LA").unwrap();

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.column("age").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_auto_tsv() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "a\tb").unwrap();
        writeln!(file, "1\t2").unwrap();

        let df = DataLoader::new().load_auto(file.path()).unwrap();
        assert_eq!(df.width(), 2);
    }
}
