use crate::services::ParcelServices;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use yama_common::{DebugEvent, DebugSink, DomainOptions, RecordingSink, TracingSink};
use yama_install::Parcel;
use yama_instantiate::CommittedDb;
use yama_ir::ModuleDescription;
use yama_resolve::{ImportResolver, RedirectTable};

/// Either sink a domain can be built with. A closed enum rather than a
/// trait object so [`Domain::events`](crate::Domain::events) can read
/// recorded events back out without downcasting.
pub(crate) enum Sink {
    Tracing(TracingSink),
    Recording(RecordingSink),
}

impl DebugSink for Sink {
    fn log(&mut self, event: DebugEvent) {
        match self {
            Sink::Tracing(s) => s.log(event),
            Sink::Recording(s) => s.log(event),
        }
    }
}

impl Sink {
    pub(crate) fn events(&self) -> Vec<DebugEvent> {
        match self {
            Sink::Recording(s) => s.events().to_vec(),
            Sink::Tracing(_) => Vec::new(),
        }
    }
}

pub(crate) struct DomainInner {
    pub(crate) options: DomainOptions,
    pub(crate) sink: Sink,
    pub(crate) parcels: IndexMap<String, Rc<dyn Parcel<ParcelServices>>>,
    pub(crate) dep_mappings: FxHashMap<(String, String), String>,
    pub(crate) redirects: RedirectTable,
    pub(crate) resolver: ImportResolver,
    /// Verified, top-level-resolved modules, keyed by their fully resolved
    /// import path. Separate from the resolver's own memo, which covers
    /// parcel-internal (dependency-mapping-translated) resolutions instead.
    pub(crate) modules: FxHashMap<String, ModuleDescription>,
    pub(crate) committed_types: CommittedDb,
}
