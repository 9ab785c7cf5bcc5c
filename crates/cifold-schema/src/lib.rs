//! Data model for scenario runs.
//!
//! Results, scope snapshots, run reports, and the closed set of lifecycle
//! events a reporter consumes. Every other cifold crate depends on these types.

pub mod event;
pub mod report;
pub mod result;
pub mod scope;
pub mod status;
