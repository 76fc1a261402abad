//! The debug sink: an append-only, structured event log the domain writes to
//! as it works. Paired with `tracing` instrumentation at the same call
//! sites — the sink is queryable structured state, `tracing` is the live
//! textual log; see the domain's ambient-stack design notes.

use crate::Dsignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Install,
    Import,
    Verify,
    Instantiate,
    Compile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEvent {
    pub category: EventCategory,
    pub severity: EventSeverity,
    pub dsignal: Option<Dsignal>,
    pub message: String,
}

impl DebugEvent {
    pub fn info(category: EventCategory, message: impl Into<String>) -> Self {
        Self { category, severity: EventSeverity::Info, dsignal: None, message: message.into() }
    }

    pub fn from_dsignal(dsignal: Dsignal, severity: EventSeverity, message: impl Into<String>) -> Self {
        Self { category: dsignal.category(), severity, dsignal: Some(dsignal), message: message.into() }
    }
}

/// The capability the domain uses to report what it is doing. Implementors
/// may forward to `tracing`, record events for later inspection, or both.
pub trait DebugSink {
    fn log(&mut self, event: DebugEvent);

    fn raise(&mut self, dsignal: Dsignal, severity: EventSeverity, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.log(DebugEvent::from_dsignal(dsignal, severity, message));
    }
}

/// Forwards every event straight to `tracing` at a level derived from its
/// severity. The default sink for a domain constructed with
/// `Domain::new_default()`.
#[derive(Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn log(&mut self, event: DebugEvent) {
        let code = event.dsignal.map(Dsignal::code).unwrap_or("info");
        match event.severity {
            EventSeverity::Info => tracing::info!(category = ?event.category, code, "{}", event.message),
            EventSeverity::Warning => tracing::warn!(category = ?event.category, code, "{}", event.message),
            EventSeverity::Error => tracing::error!(category = ?event.category, code, "{}", event.message),
        }
    }
}

/// Records every event in memory. Used by tests that want to assert on
/// emitted dsignals without scraping log text.
#[derive(Default)]
pub struct RecordingSink {
    events: Vec<DebugEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DebugEvent] {
        &self.events
    }
}

impl DebugSink for RecordingSink {
    fn log(&mut self, event: DebugEvent) {
        self.events.push(event);
    }
}
