// File I/O operations

pub mod csv;
pub mod error;
pub mod manifest;
pub mod output;
pub mod report;

pub use error::IoError;
pub use manifest::{Artifact, ArtifactKind, RunManifest};
pub use output::{ensure_dir, prepare_charge_dir, ChargeDirPolicy};
