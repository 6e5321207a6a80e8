//! Import run audit record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EntityKind;

/// One completed import invocation, recorded for history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: Uuid,
    /// Batch id shared by everything persisted in this run
    pub batch_id: String,
    pub entity: EntityKind,
    /// File name (or caller-supplied label) the rows came from
    pub source: String,
    pub accepted: i64,
    pub duplicates: i64,
    pub failed: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportRun {
    /// Total data rows this run processed
    pub fn processed(&self) -> i64 {
        self.accepted + self.duplicates + self.failed
    }
}
