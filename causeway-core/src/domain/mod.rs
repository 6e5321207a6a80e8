//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod company;
mod donor;
pub mod fields;
mod partner;
mod record;
pub mod result;
mod run;

pub use company::Company;
pub use donor::Donor;
pub use partner::Partner;
pub use record::{DuplicateKey, EntityKind, Frequency, ImportRecord, ImportRow};
pub use run::ImportRun;
