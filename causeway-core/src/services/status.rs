//! Status service - stored record summaries

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{EntityKind, ImportRun};
use crate::ports::RecordStore;

/// Status service for record counts and recent activity
pub struct StatusService {
    store: Arc<dyn RecordStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            donors: self.store.count(EntityKind::Donor)?,
            partners: self.store.count(EntityKind::Partner)?,
            companies: self.store.count(EntityKind::Company)?,
            last_run: self.store.runs(1)?.into_iter().next(),
        })
    }

    /// Most recent import runs, newest first
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<ImportRun>> {
        self.store.runs(limit)
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub donors: i64,
    pub partners: i64,
    pub companies: i64,
    pub last_run: Option<ImportRun>,
}
