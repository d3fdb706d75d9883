//! Data sources for eda-lens.
//!
//! A source hands raw delimited bytes to the loader; parsing into an all-text
//! Arrow batch is shared by every source through [`DataSource::read_raw`].

use crate::prelude::*;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::debug;

mod csv;

pub use csv::{parse_csv, CsvOptions, CsvSource};

/// A tabular data source that yields delimited text.
///
/// # Examples
///
/// ```rust,no_run
/// use eda_lens::sources::{CsvSource, DataSource};
///
/// # async fn example() -> eda_lens::error::Result<()> {
/// let source = CsvSource::from_path("data/contagious-diseases/measles.csv");
/// let raw = source.read_raw().await?;
/// println!("{} rows from {}", raw.num_rows(), source.description());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Returns the full contents of the source.
    async fn load_bytes(&self) -> Result<Vec<u8>>;

    /// Parsing options for this source.
    fn options(&self) -> &CsvOptions;

    /// Short name used for the loaded table (usually the file name).
    fn name(&self) -> String;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;

    /// Loads and parses the source into an all-text batch.
    async fn read_raw(&self) -> Result<RecordBatch> {
        let bytes = self.load_bytes().await?;
        debug!(
            source = %self.description(),
            bytes = bytes.len(),
            "Loaded source bytes"
        );
        parse_csv(&bytes, self.options())
    }
}

/// Lists the `*.csv` files directly inside `dir`, sorted by path.
///
/// A directory that does not exist yields an empty list.
pub fn discover_csv_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    use glob::glob;

    let dir = dir.as_ref();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Dataset directory not found");
        return Ok(Vec::new());
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped}/*.csv");
    let matches = glob(&pattern).map_err(|e| {
        EdaError::Configuration(format!("Invalid dataset directory '{}': {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in matches {
        let path = entry.map_err(|e| EdaError::Io(e.into()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    debug!(dir = %dir.display(), files = paths.len(), "Discovered CSV datasets");
    Ok(paths)
}
