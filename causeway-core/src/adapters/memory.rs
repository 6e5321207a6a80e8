//! In-memory store implementation
//!
//! Backs tests and ephemeral runs where nothing should touch disk.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::result::Result;
use crate::domain::{EntityKind, ImportRecord, ImportRun};
use crate::ports::RecordStore;

/// In-memory record store
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<EntityKind, Vec<ImportRecord>>>,
    runs: Mutex<Vec<ImportRun>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    fn records(&self, kind: EntityKind) -> Result<Vec<ImportRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&kind).cloned().unwrap_or_default())
    }

    fn insert(&self, record: &ImportRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        records
            .entry(record.kind())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn count(&self, kind: EntityKind) -> Result<i64> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&kind).map(|v| v.len()).unwrap_or(0) as i64)
    }

    fn add_run(&self, run: &ImportRun) -> Result<()> {
        let mut runs = self.runs.lock().unwrap();
        runs.push(run.clone());
        Ok(())
    }

    fn runs(&self, limit: usize) -> Result<Vec<ImportRun>> {
        let runs = self.runs.lock().unwrap();
        Ok(runs.iter().rev().take(limit).cloned().collect())
    }
}
