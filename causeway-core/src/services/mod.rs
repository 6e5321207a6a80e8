//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod import;
mod status;

pub use import::{
    ImportError, ImportOptions, ImportResult, ImportService, NoProgress, ProgressFn,
    ProgressObserver, RecordPreview,
};
pub use status::{StatusService, StatusSummary};
