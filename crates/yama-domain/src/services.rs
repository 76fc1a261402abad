use crate::inner::DomainInner;
use std::cell::RefCell;
use std::rc::Rc;
use yama_ir::{ImportPath, ModuleDescription};

/// Handed to an installed parcel's [`Parcel::import`](yama_install::Parcel::import)
/// so it can resolve its own declared dependencies (including the reserved
/// `self` head) the same way the domain resolves everything else: through
/// dependency mappings, then redirects, then the target parcel itself.
///
/// Deliberately narrow: a parcel can import, not install or load — it
/// describes modules, it does not decide when types get instantiated.
///
/// Must not be called back into from within the very `Parcel::import` call
/// it was handed to: doing so would need a second mutable borrow of the
/// domain's shared state while the first is still open, which panics. No
/// parcel in this workspace does this; it mirrors the "no import while an
/// import is already in flight for this parcel" discipline most module
/// systems enforce to avoid observing a half-built module.
#[derive(Clone)]
pub struct ParcelServices {
    pub(crate) inner: Rc<RefCell<DomainInner>>,
    pub(crate) subject_install_name: String,
}

impl ParcelServices {
    pub fn import(&self, path: &ImportPath) -> Option<ModuleDescription> {
        crate::domain::resolve_for_subject(&self.inner, &self.subject_install_name, path)
    }

    pub fn subject_install_name(&self) -> &str {
        &self.subject_install_name
    }
}
