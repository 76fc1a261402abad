//! The `uploads` parcel: a domain-owned, mutable catch-all for module
//! descriptions supplied directly (by a test, a REPL, or any caller that
//! already has a [`ModuleDescription`] in hand and has no need for a real
//! [`Parcel`] implementation). See [`Domain::upload`](crate::Domain::upload).

use crate::services::ParcelServices;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use yama_install::Parcel;
use yama_ir::ModuleDescription;

#[derive(Default)]
pub(crate) struct UploadsParcel {
    modules: RefCell<FxHashMap<String, ModuleDescription>>,
}

impl UploadsParcel {
    pub(crate) fn put(&self, relative_path: String, module: ModuleDescription) {
        self.modules.borrow_mut().insert(relative_path, module);
    }
}

impl Parcel<ParcelServices> for UploadsParcel {
    /// Declares one alias, `yama`, wired at [`crate::Domain::bootstrap`] to
    /// the real `yama` install-name — without it, `check_type` would reject
    /// any uploaded constant table that names a primitive type.
    fn deps(&self) -> Vec<String> {
        vec!["yama".to_owned()]
    }

    fn import(&self, _services: &ParcelServices, relative_path: &str) -> Option<ModuleDescription> {
        self.modules.borrow().get(relative_path).cloned()
    }
}
