//! Common types shared by every crate in the yama runtime:
//! - Diagnostics (`Dsignal`, `EventCategory`, `DebugEvent`, `DebugSink`)
//! - Source positions for bytecode debug symbols (`SourcePos`)
//! - Domain-wide configuration (`DomainOptions`)

pub mod dsignal;
pub mod options;
pub mod position;
pub mod sink;

pub use dsignal::Dsignal;
pub use options::DomainOptions;
pub use position::SourcePos;
pub use sink::{DebugEvent, DebugSink, EventCategory, EventSeverity, RecordingSink, TracingSink};
