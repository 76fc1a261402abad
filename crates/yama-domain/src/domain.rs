//! [`Domain`] itself, plus the free functions that do the actual resolving:
//! kept outside any `impl` block so they can take just the pieces of state
//! they need (`&Rc<RefCell<DomainInner>>`) instead of a full `&Domain`,
//! which is what lets [`crate::services::ParcelServices`] call back in
//! without holding a `&Domain` of its own.

use crate::builtins::{BuiltinIds, BuiltinParcel};
use crate::inner::{DomainInner, Sink};
use crate::services::ParcelServices;
use crate::uploads::UploadsParcel;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;
use yama_common::{DebugEvent, DebugSink, DomainOptions, EventCategory, EventSeverity, RecordingSink, TracingSink};
use yama_install::{InstallBatch, InstallError, Parcel};
use yama_instantiate::{CommittedDb, DescriptionLookup, InstantiateError, Instantiator, RuntimeType, TypeId};
use yama_ir::{Fullname, ImportPath, ModuleDescription, TypeDescription};
use yama_resolve::{ImportResolver, RedirectTable};
use yama_verify::VerifyError;

pub struct Domain {
    inner: Rc<RefCell<DomainInner>>,
    uploads: Rc<UploadsParcel>,
    builtins: BuiltinIds,
}

impl Domain {
    /// A domain logging to `tracing` at default options. What most callers want.
    pub fn new_default() -> Self {
        Self::bootstrap(DomainOptions::default(), Sink::Tracing(TracingSink::default()))
    }

    pub fn new(options: DomainOptions) -> Self {
        Self::bootstrap(options, Sink::Tracing(TracingSink::default()))
    }

    /// A domain that records every event in memory instead of (or in
    /// addition to) forwarding to `tracing`. See [`Domain::events`].
    pub fn new_recording(options: DomainOptions) -> Self {
        Self::bootstrap(options, Sink::Recording(RecordingSink::default()))
    }

    fn bootstrap(options: DomainOptions, sink: Sink) -> Self {
        let uploads = Rc::new(UploadsParcel::default());
        let inner = Rc::new(RefCell::new(DomainInner {
            options,
            sink,
            parcels: IndexMap::new(),
            dep_mappings: FxHashMap::default(),
            redirects: RedirectTable::new(),
            resolver: ImportResolver::new(),
            modules: FxHashMap::default(),
            committed_types: CommittedDb::new(),
        }));
        {
            let mut guard = inner.borrow_mut();
            guard.parcels.insert("yama".to_owned(), Rc::new(BuiltinParcel) as Rc<dyn Parcel<ParcelServices>>);
            guard.parcels.insert("uploads".to_owned(), uploads.clone() as Rc<dyn Parcel<ParcelServices>>);
            guard.dep_mappings.insert(("uploads".to_owned(), "yama".to_owned()), "yama".to_owned());
        }

        let builtin = |inner: &Rc<RefCell<DomainInner>>, tag: &str| -> TypeId {
            let fullname = Fullname::parse(&format!("yama:{tag}")).expect("builtin tag is a valid ident");
            load_impl(inner, &fullname).expect("the yama parcel installed at construction always provides this type")
        };
        let builtins = BuiltinIds {
            none: builtin(&inner, "None"),
            int: builtin(&inner, "Int"),
            uint: builtin(&inner, "Uint"),
            float: builtin(&inner, "Float"),
            bool_: builtin(&inner, "Bool"),
            char_: builtin(&inner, "Char"),
        };

        Self { inner, uploads, builtins }
    }

    /// Validates and commits a batch of parcels and their dependency
    /// mappings atomically: either every parcel in `batch` is installed, or
    /// none are.
    pub fn install(&self, batch: InstallBatch<ParcelServices>) -> Result<(), Vec<InstallError>> {
        let mut guard = self.inner.borrow_mut();
        let already_installed: FxHashSet<String> = guard.parcels.keys().cloned().collect();
        batch.validate(&already_installed, &guard.dep_mappings)?;
        let (installs, mappings) = batch.into_parts();
        for (name, parcel) in installs {
            guard.sink.log(DebugEvent::info(EventCategory::Install, format!("installed parcel `{name}`")));
            guard.parcels.insert(name, parcel);
        }
        guard.dep_mappings.extend(mappings);
        Ok(())
    }

    pub fn is_installed(&self, install_name: &str) -> bool {
        self.inner.borrow().parcels.contains_key(install_name)
    }

    pub fn install_count(&self) -> usize {
        self.inner.borrow().parcels.len()
    }

    /// Registers a redirect: imports of `before_prefix` seen *inside* a
    /// parcel whose install-name starts with `subject_prefix` are rewritten
    /// to start with `after` instead. Only affects indirect (inside-another-
    /// import) resolution, never a direct `Domain::import`/`load`. Silently
    /// has no effect on a subject parcel whose redirect set is already
    /// frozen (see [`yama_resolve::RedirectTable`]).
    pub fn add_redirect(&self, subject_prefix: ImportPath, before_prefix: ImportPath, after: ImportPath) {
        self.inner.borrow_mut().redirects.add_redirect(subject_prefix, before_prefix, after);
    }

    /// Imports `path` directly against the installed parcels — no
    /// dependency-mapping translation, since there is no subject parcel to
    /// translate relative to. This is how an external caller reaches a
    /// module; a parcel resolving its own imports goes through
    /// [`ParcelServices::import`] instead.
    pub fn import(&self, path: &ImportPath) -> Option<ModuleDescription> {
        import_impl(&self.inner, path)
    }

    pub fn load(&self, fullname: &Fullname) -> Result<TypeId, InstantiateError> {
        load_impl(&self.inner, fullname)
    }

    /// A snapshot of a committed type's resolved shape: its reference
    /// constants and, for callables, its resolved callsig. `id` must have
    /// come from this domain's own `load`.
    pub fn runtime_type(&self, id: TypeId) -> RuntimeType {
        self.inner.borrow().committed_types.get(id).clone()
    }

    /// Registers (or replaces) a module description directly under the
    /// reserved `uploads` install-name, bypassing the parcel/verification
    /// machinery a real `Parcel` would otherwise need. Invalidates any
    /// cached import of the same path so a later `import`/`load` sees the
    /// new module.
    pub fn upload(&self, relative_path: impl Into<String>, module: ModuleDescription) {
        let relative_path = relative_path.into();
        let tail: Vec<String> = relative_path.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect();
        self.uploads.put(relative_path, module);
        let key = ImportPath::join("uploads", &tail).to_string();
        self.inner.borrow_mut().modules.remove(&key);
    }

    pub fn load_none(&self) -> TypeId {
        self.builtins.none
    }

    pub fn load_int(&self) -> TypeId {
        self.builtins.int
    }

    pub fn load_uint(&self) -> TypeId {
        self.builtins.uint
    }

    pub fn load_float(&self) -> TypeId {
        self.builtins.float
    }

    pub fn load_bool(&self) -> TypeId {
        self.builtins.bool_
    }

    pub fn load_char(&self) -> TypeId {
        self.builtins.char_
    }

    /// Every event logged so far, if this domain was built with
    /// [`Domain::new_recording`]; empty otherwise.
    pub fn events(&self) -> Vec<DebugEvent> {
        self.inner.borrow().sink.events()
    }
}

/// Resolves `path` directly against the installed parcels, verifying and
/// caching the result on first success. Shared by [`Domain::import`] and
/// the instantiator's description lookup.
pub(crate) fn import_impl(inner: &Rc<RefCell<DomainInner>>, path: &ImportPath) -> Option<ModuleDescription> {
    let key = path.to_string();
    {
        let guard = inner.borrow();
        if let Some(m) = guard.modules.get(&key) {
            return Some(m.clone());
        }
    }

    let install_name = path.head().to_owned();
    let (parcel, dep_names) = {
        let guard = inner.borrow();
        let parcel = guard.parcels.get(&install_name)?.clone();
        let dep_names = real_dep_names(&guard.dep_mappings, &install_name, parcel.as_ref());
        (parcel, dep_names)
    };
    let relative = path.tail().join("/");
    let services = ParcelServices { inner: inner.clone(), subject_install_name: install_name };
    let module = parcel.import(&services, &relative)?;

    let options = inner.borrow().options.clone();
    let (errors, warnings) = crate::verify::verify_module(&module, &dep_names, &options);
    log_verify_outcome(inner, path, errors, warnings)?;

    inner.borrow_mut().modules.insert(key, module.clone());
    Some(module)
}

/// Resolves `path` as used from inside the parcel installed under
/// `subject_install_name`: through dependency mappings and redirects, then
/// into whichever parcel that lands on. Called by [`ParcelServices::import`].
pub(crate) fn resolve_for_subject(inner: &Rc<RefCell<DomainInner>>, subject_install_name: &str, path: &ImportPath) -> Option<ModuleDescription> {
    let services = ParcelServices { inner: inner.clone(), subject_install_name: subject_install_name.to_owned() };
    let resolved = {
        let mut guard = inner.borrow_mut();
        let DomainInner { resolver, redirects, dep_mappings, parcels, .. } = &mut *guard;
        resolver.resolve(subject_install_name, path, dep_mappings, redirects, parcels, &services)
    };
    let (resolved_path, module) = resolved?;

    let dep_names = {
        let guard = inner.borrow();
        let target_install_name = resolved_path.head();
        let parcel = guard.parcels.get(target_install_name)?;
        real_dep_names(&guard.dep_mappings, target_install_name, parcel.as_ref())
    };
    let options = inner.borrow().options.clone();
    let (errors, warnings) = crate::verify::verify_module(&module, &dep_names, &options);
    log_verify_outcome(inner, &resolved_path, errors, warnings)?;
    Some(module)
}

/// A parcel's constant table entries name their dependencies by the real
/// install-name those dependencies ultimately resolve to, not by the
/// parcel's own local alias for them — a parcel learns that real name (via
/// [`ParcelServices::import`]) before it ever embeds a qualified name in a
/// constant table, the same way it would reach the real module to read its
/// members. `check_type`'s dep_names check is against this translated set,
/// so a parcel cannot reference a real install-name it never declared a
/// mapped dependency on even if it happens to match some other alias.
fn real_dep_names(dep_mappings: &FxHashMap<(String, String), String>, install_name: &str, parcel: &dyn Parcel<ParcelServices>) -> Vec<String> {
    parcel
        .deps()
        .into_iter()
        .filter_map(|alias| dep_mappings.get(&(install_name.to_owned(), alias)).cloned())
        .collect()
}

fn log_verify_outcome(inner: &Rc<RefCell<DomainInner>>, resolved_path: &ImportPath, errors: Vec<VerifyError>, warnings: Vec<VerifyError>) -> Option<()> {
    let mut guard = inner.borrow_mut();
    for w in warnings {
        guard.sink.log(DebugEvent::from_dsignal(w.dsignal, EventSeverity::Warning, w.message));
    }
    if !errors.is_empty() {
        for e in errors {
            guard.sink.log(DebugEvent::from_dsignal(e.dsignal, EventSeverity::Error, e.message));
        }
        return None;
    }
    guard.sink.log(DebugEvent::info(EventCategory::Import, format!("resolved module `{resolved_path}`")));
    Some(())
}

fn load_impl(inner: &Rc<RefCell<DomainInner>>, fullname: &Fullname) -> Result<TypeId, InstantiateError> {
    if let Some(id) = inner.borrow().committed_types.lookup(fullname) {
        return Ok(id);
    }
    let committed_len = inner.borrow().committed_types.len();
    let lookup = DomainLookup { inner };
    let instantiator = Instantiator::new(committed_len, &lookup);
    let (id, staged) = instantiator.instantiate(fullname)?;
    inner.borrow_mut().committed_types.commit(staged);
    tracing::debug!(%fullname, "committed instantiated type");
    Ok(id)
}

struct DomainLookup<'a> {
    inner: &'a Rc<RefCell<DomainInner>>,
}

impl<'a> DescriptionLookup for DomainLookup<'a> {
    fn already_instantiated(&self, fullname: &Fullname) -> Option<TypeId> {
        self.inner.borrow().committed_types.lookup(fullname)
    }

    fn lookup(&self, fullname: &Fullname) -> Option<(ImportPath, TypeDescription)> {
        let module = import_impl(self.inner, &fullname.path)?;
        module.get(&fullname.name).cloned().map(|desc| (fullname.path.clone(), desc))
    }
}
