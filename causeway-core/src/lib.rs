//! Causeway Core - import and reconciliation logic for nonprofit operations
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Donor, Partner, Company, etc.)
//! - **ports**: Trait definitions for external dependencies (RecordStore)
//! - **services**: Business logic orchestration (import engine, status)
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbStore;
use config::Config;
use ports::RecordStore;
use services::{ImportService, StatusService};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    Company, Donor, DuplicateKey, EntityKind, Frequency, ImportRecord, ImportRow, ImportRun,
    Partner,
};
pub use services::{
    ImportError, ImportOptions, ImportResult, NoProgress, ProgressFn, ProgressObserver,
    RecordPreview, StatusSummary,
};

/// Main context for Causeway operations
///
/// This is the primary entry point for all business logic. It holds the
/// database connection, configuration, and all services.
pub struct CausewayContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub import_service: ImportService,
    pub status_service: StatusService,
}

impl CausewayContext {
    /// Create a new Causeway context
    pub fn new(causeway_dir: &Path) -> Result<Self> {
        let config = Config::load(causeway_dir)?;

        let db_path = causeway_dir.join("causeway.duckdb");
        let store = Arc::new(DuckDbStore::new(&db_path)?);

        // Initialize schema
        store.ensure_schema()?;

        // Create services
        let record_store: Arc<dyn RecordStore> = store.clone();
        let import_service =
            ImportService::new(Arc::clone(&record_store), causeway_dir.to_path_buf());
        let status_service = StatusService::new(record_store);

        Ok(Self {
            config,
            store,
            import_service,
            status_service,
        })
    }
}
