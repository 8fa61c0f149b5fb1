//! `legiscrub-recon`: Record reconciliation and cleanup for legislator tables.
//!
//! Pure engine crate: receives loaded tables, returns the cleaned table plus a
//! run report. No CLI or file IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod overrides;
pub mod prune;
pub mod report;

pub use config::PipelineConfig;
pub use engine::{reconcile, run, update, PipelineOutput};
pub use error::ReconError;
pub use model::{Table, Value};
pub use normalize::{remove_accents, strip_accents, DecompositionForm};
pub use report::RunReport;
