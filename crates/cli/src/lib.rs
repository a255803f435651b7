//! `ringscan-cli` — the batch pipeline behind the `ringscan` binary.
//!
//! Exposed as a library so integration tests can drive a full run against
//! a temporary directory.

pub mod pipeline;

pub use pipeline::{check, run, CheckReport, PipelineError};
