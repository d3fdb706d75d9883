//! CSV source implementation.

use super::DataSource;
use crate::prelude::*;
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Options for configuring CSV reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first row holds column names
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Rename repeated headers to `name.1`, `name.2`, ...
    pub mangle_duplicate_headers: bool,
    /// Rows per parsed batch before concatenation
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            mangle_duplicate_headers: true,
            batch_size: 8192,
        }
    }
}

impl CsvOptions {
    fn format(&self) -> Format {
        let mut format = Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote);
        if let Some(escape) = self.escape {
            format = format.with_escape(escape);
        }
        if let Some(comment) = self.comment {
            format = format.with_comment(comment);
        }
        format
    }
}

#[derive(Debug, Clone)]
enum CsvInput {
    Path(PathBuf),
    Bytes { name: String, data: Arc<[u8]> },
}

/// A CSV data source backed by a local file or an uploaded byte stream.
///
/// # Examples
///
/// ```rust
/// use eda_lens::sources::{CsvOptions, CsvSource, DataSource};
///
/// let upload = CsvSource::from_bytes("upload.csv", b"region,cases\nA,1\n".to_vec());
/// assert_eq!(upload.name(), "upload.csv");
///
/// let tsv = CsvSource::from_path("data/cases.tsv").with_options(CsvOptions {
///     delimiter: b'\t',
///     ..Default::default()
/// });
/// assert_eq!(tsv.options().delimiter, b'\t');
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: CsvInput,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a source reading a local file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
            options: CsvOptions::default(),
        }
    }

    /// Creates a source over an in-memory upload.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            input: CsvInput::Bytes {
                name: name.into(),
                data: data.into(),
            },
            options: CsvOptions::default(),
        }
    }

    /// Sets custom options for this CSV source.
    pub fn with_options(mut self, options: CsvOptions) -> Self {
        self.options = options;
        self
    }

    /// The file path, for path-backed sources.
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            CsvInput::Path(path) => Some(path),
            CsvInput::Bytes { .. } => None,
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self), fields(source.type = "csv"))]
    async fn load_bytes(&self) -> Result<Vec<u8>> {
        match &self.input {
            CsvInput::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                EdaError::unreadable_with_source(format!("cannot read {}: {e}", path.display()), e)
            }),
            CsvInput::Bytes { data, .. } => Ok(data.to_vec()),
        }
    }

    fn options(&self) -> &CsvOptions {
        &self.options
    }

    fn name(&self) -> String {
        match &self.input {
            CsvInput::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            CsvInput::Bytes { name, .. } => name.clone(),
        }
    }

    fn description(&self) -> String {
        match &self.input {
            CsvInput::Path(path) => format!("CSV file: {}", path.display()),
            CsvInput::Bytes { name, data } => format!("CSV upload: {name} ({} bytes)", data.len()),
        }
    }
}

/// Parses delimited text into a single batch with every column read as text.
///
/// Structural problems (no header, ragged rows, invalid UTF-8) are reported as
/// `UnreadableTable`. A header-only input produces a zero-row batch.
#[instrument(skip(bytes, options), fields(bytes = bytes.len()))]
pub fn parse_csv(bytes: &[u8], options: &CsvOptions) -> Result<RecordBatch> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(EdaError::unreadable("file is empty"));
    }

    let format = options.format();
    let (header_schema, _) = format
        .infer_schema(Cursor::new(bytes), Some(0))
        .map_err(|e| EdaError::unreadable_with_source(e.to_string(), e))?;

    if header_schema.fields().is_empty() {
        return Err(EdaError::unreadable("no columns found in header row"));
    }

    let raw_names: Vec<String> = header_schema
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let names = if options.mangle_duplicate_headers {
        mangle_headers(&raw_names)
    } else {
        raw_names
    };

    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size.max(1))
        .build(Cursor::new(bytes))
        .map_err(|e| EdaError::unreadable_with_source(e.to_string(), e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| EdaError::unreadable_with_source(e.to_string(), e))?;
    let batch = concat_batches(&schema, &batches)?;

    debug!(
        columns = batch.num_columns(),
        rows = batch.num_rows(),
        batches = batches.len(),
        "Parsed CSV input"
    );
    if batch.num_rows() == 0 {
        info!("CSV input has a header but no data rows");
    }
    Ok(batch)
}

/// Renames blank and repeated headers: blank ones become `Unnamed: {i}` and
/// repeats get a `.1`, `.2`, ... suffix.
fn mangle_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());

    for (i, name) in raw.iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.clone()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
