//! Import service - CSV import & reconciliation engine
//!
//! One invocation: parse the file into rows, map each row to a typed record
//! for the selected entity, validate, check the duplicate index (seeded from
//! the store, updated as the batch accepts rows), persist row by row, and
//! aggregate everything into an `ImportResult`.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{Config, ImportProfile};
use crate::domain::result::{Error, Result};
use crate::domain::{DuplicateKey, EntityKind, ImportRecord, ImportRow, ImportRun};
use crate::ports::RecordStore;

/// Import options for one run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Skip rows whose duplicate key is already stored or already accepted
    /// earlier in the batch; when false, duplicates import as new records
    pub skip_duplicates: bool,
    /// Validate and de-duplicate without writing to the store
    pub dry_run: bool,
    /// Abort the run after this many consecutive storage insert failures
    pub max_consecutive_failures: u32,
    /// Cooperative cancellation, checked between rows
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
            dry_run: false,
            max_consecutive_failures: 5,
            cancel: None,
        }
    }
}

/// Observer for per-row progress
pub trait ProgressObserver {
    fn on_progress(&mut self, current: usize, total: usize);
}

/// No-op observer
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _current: usize, _total: usize) {}
}

/// Adapter turning a closure into an observer
pub struct ProgressFn<F: FnMut(usize, usize)>(pub F);

impl<F: FnMut(usize, usize)> ProgressObserver for ProgressFn<F> {
    fn on_progress(&mut self, current: usize, total: usize) {
        (self.0)(current, total)
    }
}

/// One rejected row
#[derive(Debug, Clone, Serialize)]
pub struct ImportError {
    /// 1-based data row number (header line excluded)
    pub row: usize,
    pub message: String,
}

/// Preview of a record that would be imported (dry-run mode)
#[derive(Debug, Serialize)]
pub struct RecordPreview {
    pub name: String,
    pub summary: String,
    pub key: String,
}

/// Aggregate outcome of one import run
#[derive(Debug, Serialize)]
pub struct ImportResult {
    /// Batch id shared by everything persisted in this run
    pub batch_id: String,
    pub entity: EntityKind,
    /// Rows persisted (or validated, in dry-run mode)
    pub accepted: i64,
    /// Rows skipped because their duplicate key was already seen
    pub duplicates: i64,
    /// Rows rejected by validation or storage
    pub failed: i64,
    /// Data rows processed; rows never started after a cancel are excluded
    pub processed: i64,
    pub dry_run: bool,
    pub cancelled: bool,
    pub errors: Vec<ImportError>,
    /// Record previews (only in dry-run mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RecordPreview>>,
}

impl ImportResult {
    /// Downloadable detail log: one `Row {n}: {message}` line per error
    pub fn error_report(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("Row {}: {}", e.row, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-invocation duplicate key index
///
/// Seeded from stored records at batch start; keys are added only after a
/// row is accepted, so a failed insert does not shadow a later identical row.
struct DuplicateIndex {
    seen: HashSet<DuplicateKey>,
}

impl DuplicateIndex {
    fn seed(store: &dyn RecordStore, kind: EntityKind) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in store.records(kind)? {
            seen.insert(record.duplicate_key());
        }
        Ok(Self { seen })
    }

    fn contains(&self, key: &DuplicateKey) -> bool {
        self.seen.contains(key)
    }

    fn insert(&mut self, key: DuplicateKey) {
        self.seen.insert(key);
    }
}

/// A parsed data row, or the reason it could not be parsed
#[derive(Debug)]
enum RowSlot {
    Row(ImportRow),
    Invalid { line: usize, message: String },
}

/// Import service for CSV imports
pub struct ImportService {
    store: Arc<dyn RecordStore>,
    causeway_dir: PathBuf,
}

impl ImportService {
    pub fn new(store: Arc<dyn RecordStore>, causeway_dir: PathBuf) -> Self {
        Self {
            store,
            causeway_dir,
        }
    }

    /// List saved import profiles
    pub fn list_profiles(&self) -> anyhow::Result<HashMap<String, ImportProfile>> {
        let config = Config::load(&self.causeway_dir)?;
        Ok(config.import_profiles)
    }

    /// Get a saved profile
    pub fn get_profile(&self, name: &str) -> anyhow::Result<Option<ImportProfile>> {
        let config = Config::load(&self.causeway_dir)?;
        Ok(config.import_profiles.get(name).cloned())
    }

    /// Save an import profile
    pub fn save_profile(&self, name: &str, profile: ImportProfile) -> anyhow::Result<()> {
        let mut config = Config::load(&self.causeway_dir)?;
        config.import_profiles.insert(name.to_string(), profile);
        config.save(&self.causeway_dir)?;
        Ok(())
    }

    /// Import records from a CSV file on disk
    pub fn import_path(
        &self,
        path: &Path,
        kind: EntityKind,
        options: &ImportOptions,
        progress: &mut dyn ProgressObserver,
    ) -> Result<ImportResult> {
        let file = File::open(path)
            .map_err(|e| Error::malformed(format!("cannot read {}: {}", path.display(), e)))?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.import_reader(file, &source, kind, options, progress)
    }

    /// Import records from any reader of CSV text
    pub fn import_reader<R: Read>(
        &self,
        reader: R,
        source: &str,
        kind: EntityKind,
        options: &ImportOptions,
        progress: &mut dyn ProgressObserver,
    ) -> Result<ImportResult> {
        let started_at = Utc::now();
        let batch_id = format!("import_{}", started_at.format("%Y%m%d_%H%M%S"));

        let rows = parse_rows(reader)?;
        let total = rows.len();

        let mut index = if options.skip_duplicates {
            Some(DuplicateIndex::seed(self.store.as_ref(), kind)?)
        } else {
            None
        };

        let mut result = ImportResult {
            batch_id,
            entity: kind,
            accepted: 0,
            duplicates: 0,
            failed: 0,
            processed: 0,
            dry_run: options.dry_run,
            cancelled: false,
            errors: Vec::new(),
            records: options.dry_run.then(Vec::new),
        };
        let mut consecutive_failures = 0u32;

        for (i, slot) in rows.into_iter().enumerate() {
            if let Some(cancel) = &options.cancel {
                if cancel.load(Ordering::Relaxed) {
                    result.cancelled = true;
                    break;
                }
            }

            result.processed += 1;

            match slot {
                RowSlot::Invalid { line, message } => {
                    result.failed += 1;
                    result.errors.push(ImportError { row: line, message });
                }
                RowSlot::Row(row) => {
                    let line = row.line();
                    match ImportRecord::from_row(kind, &row) {
                        Err(failures) => {
                            result.failed += 1;
                            result.errors.push(ImportError {
                                row: line,
                                message: failures.join("; "),
                            });
                        }
                        Ok(record) => {
                            let key = record.duplicate_key();
                            let is_duplicate = index
                                .as_ref()
                                .map(|idx| idx.contains(&key))
                                .unwrap_or(false);

                            if is_duplicate {
                                result.duplicates += 1;
                            } else if options.dry_run {
                                result.accepted += 1;
                                if let Some(previews) = result.records.as_mut() {
                                    previews.push(RecordPreview {
                                        name: record.name().to_string(),
                                        summary: record.summary(),
                                        key: key.as_str().to_string(),
                                    });
                                }
                                if let Some(idx) = index.as_mut() {
                                    idx.insert(key);
                                }
                            } else {
                                match self.store.insert(&record) {
                                    Ok(()) => {
                                        consecutive_failures = 0;
                                        result.accepted += 1;
                                        if let Some(idx) = index.as_mut() {
                                            idx.insert(key);
                                        }
                                    }
                                    Err(e) => {
                                        let message = e.to_string();
                                        consecutive_failures += 1;
                                        result.failed += 1;
                                        result.errors.push(ImportError {
                                            row: line,
                                            message: format!("storage error: {}", message),
                                        });
                                        if consecutive_failures >= options.max_consecutive_failures
                                        {
                                            return Err(Error::StorageAborted {
                                                count: consecutive_failures,
                                                last: message,
                                            });
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            progress.on_progress(i + 1, total);
        }

        if !options.dry_run {
            let run = ImportRun {
                id: Uuid::new_v4(),
                batch_id: result.batch_id.clone(),
                entity: kind,
                source: source.to_string(),
                accepted: result.accepted,
                duplicates: result.duplicates,
                failed: result.failed,
                started_at,
                finished_at: Utc::now(),
            };
            self.store.add_run(&run)?;
        }

        Ok(result)
    }
}

/// Parse CSV text into data rows.
///
/// The first line is the header. Quoted fields may contain delimiters and
/// embedded newlines; blank lines are skipped. A data row whose field count
/// does not match the header becomes an invalid slot (reported, not fatal).
/// A missing or empty header line is fatal.
fn parse_rows<R: Read>(reader: R) -> Result<Vec<RowSlot>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| Error::malformed(format!("cannot read header line: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::malformed("missing header line"));
    }

    let headers = Arc::new(headers);
    let mut rows = Vec::new();

    for (idx, record) in csv_reader.records().enumerate() {
        let line = idx + 1;
        match record {
            Ok(record) => {
                if record.len() != headers.len() {
                    rows.push(RowSlot::Invalid {
                        line,
                        message: format!(
                            "expected {} fields, found {}",
                            headers.len(),
                            record.len()
                        ),
                    });
                } else {
                    let values = record.iter().map(|v| v.to_string()).collect();
                    rows.push(RowSlot::Row(ImportRow::new(
                        line,
                        Arc::clone(&headers),
                        values,
                    )));
                }
            }
            Err(e) => rows.push(RowSlot::Invalid {
                line,
                message: format!("unreadable row: {}", e),
            }),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_from(text: &str) -> Vec<RowSlot> {
        parse_rows(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_rows_quoted_comma_stays_one_field() {
        let rows = rows_from("Name,Address\nJohn,\"12 Main St, Springfield\"\n");
        assert_eq!(rows.len(), 1);
        match &rows[0] {
            RowSlot::Row(row) => {
                assert_eq!(row.get("Address"), Some("12 Main St, Springfield"));
            }
            RowSlot::Invalid { message, .. } => panic!("unexpected error: {}", message),
        }
    }

    #[test]
    fn test_parse_rows_quoted_newline_stays_one_row() {
        let rows = rows_from("Name,Notes\nJohn,\"line one\nline two\"\n");
        assert_eq!(rows.len(), 1);
        match &rows[0] {
            RowSlot::Row(row) => {
                assert_eq!(row.get("Notes"), Some("line one\nline two"));
            }
            RowSlot::Invalid { message, .. } => panic!("unexpected error: {}", message),
        }
    }

    #[test]
    fn test_parse_rows_field_count_mismatch_is_per_row() {
        let rows = rows_from("Name,Email\nJohn,john@example.com,extra\nJane,jane@example.com\n");
        assert_eq!(rows.len(), 2);
        match &rows[0] {
            RowSlot::Invalid { line, message } => {
                assert_eq!(*line, 1);
                assert!(message.contains("expected 2 fields, found 3"));
            }
            RowSlot::Row(_) => panic!("expected invalid slot"),
        }
        assert!(matches!(&rows[1], RowSlot::Row(_)));
    }

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let rows = rows_from("Name,Email\n\nJohn,john@example.com\n\n");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_rows_empty_input_is_malformed() {
        let err = parse_rows("".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedFile(_)));
    }

    #[test]
    fn test_error_report_format() {
        let result = ImportResult {
            batch_id: "import_20250115_120000".to_string(),
            entity: EntityKind::Donor,
            accepted: 0,
            duplicates: 0,
            failed: 2,
            processed: 2,
            dry_run: false,
            cancelled: false,
            errors: vec![
                ImportError {
                    row: 1,
                    message: "invalid email".to_string(),
                },
                ImportError {
                    row: 4,
                    message: "invalid amount".to_string(),
                },
            ],
            records: None,
        };

        assert_eq!(
            result.error_report(),
            "Row 1: invalid email\nRow 4: invalid amount"
        );
    }
}
