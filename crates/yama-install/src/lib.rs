//! Install batch validation and dependency-graph cycle detection.
//!
//! A batch is `(installs: ordered map install-name -> parcel, dep-mappings:
//! map (install-name, dep-name) -> install-name)`. Committing a batch
//! atomically runs the four validation checks in order, short-circuiting at
//! the first check that finds any violation: conflicts, missing mappings,
//! invalid mappings, cycles. Failure reports every violation found by the
//! first failing check and commits nothing.

pub mod batch;
pub mod graph;
pub mod parcel;

pub use batch::{InstallBatch, InstallError};
pub use graph::DepGraph;
pub use parcel::Parcel;
