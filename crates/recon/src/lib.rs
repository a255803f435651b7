//! `ringscan-recon` — mirror-fill reconciliation for ring-substitution scans.
//!
//! Pure engine crate: receives loaded scan records, returns reconciled
//! substituent × substituent matrices, charge tables and summaries.
//! No rendering or output-file dependencies.

pub mod aggregate;
pub mod charges;
pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod matrix;
pub mod model;
pub mod summary;

pub use charges::{build_charge_table, ChargeProfile, ChargeRow, ChargeTable, Descriptor};
pub use config::{LibrarySchema, QuantitySpec};
pub use engine::{reconcile, reconcile_oriented};
pub use error::ReconError;
pub use load::load_library;
pub use matrix::{ReconciledMatrix, RowOrder};
pub use model::{Library, RejectedRecord, Ring, ScanRecord, Substituent};
pub use summary::{summarize, Effect, SummaryRecord};
