//! Store port - persistence abstraction

use crate::domain::result::Result;
use crate::domain::{EntityKind, ImportRecord, ImportRun};

/// Record store abstraction
///
/// This trait defines all persistence operations the engine needs.
/// Implementations (adapters) provide the actual storage logic. Inserts are
/// one record per call so the importer can isolate per-row failures.
pub trait RecordStore: Send + Sync {
    // === Schema ===

    /// Ensure tables exist
    fn ensure_schema(&self) -> Result<()>;

    // === Records ===

    /// Bulk read of stored records for one entity kind
    /// (seeds the duplicate index at batch start)
    fn records(&self, kind: EntityKind) -> Result<Vec<ImportRecord>>;

    /// Insert a single record; errors surface per call
    fn insert(&self, record: &ImportRecord) -> Result<()>;

    /// Count stored records for one entity kind
    fn count(&self, kind: EntityKind) -> Result<i64>;

    // === Run history ===

    /// Record a completed import run
    fn add_run(&self, run: &ImportRun) -> Result<()>;

    /// Most recent import runs, newest first
    fn runs(&self, limit: usize) -> Result<Vec<ImportRun>>;
}
