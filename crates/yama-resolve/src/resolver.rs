//! Translates import paths through dependency mappings and redirects into
//! concrete modules, memoizing results.

use crate::RedirectTable;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use yama_install::Parcel;
use yama_ir::{ImportPath, ModuleDescription};

/// The reserved head identifier meaning "this parcel itself".
pub const SELF_HEAD: &str = "self";

#[derive(Default)]
pub struct ImportResolver {
    memo: FxHashMap<String, ModuleDescription>,
}

impl ImportResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `path` as used from inside the parcel installed under
    /// `subject_install_name`, through `dep_mappings`, `redirects`, and
    /// finally `parcels`. Returns the resolved absolute path alongside the
    /// module so callers that need to name what they got (verification,
    /// fullname construction) don't have to redo the translation. Returns
    /// `None` on any resolution failure without distinguishing the cause
    /// here — callers map that to a dsignal.
    ///
    /// `parcels` holds `Rc`, not `Box`: a caller that recurses back into its
    /// own resolution state from within `Parcel::import` (e.g. the domain,
    /// via a capability object a parcel was handed) needs to clone a parcel
    /// handle out and drop every borrow before calling in, and `Rc::clone`
    /// is how it does that cheaply.
    pub fn resolve<S>(
        &mut self,
        subject_install_name: &str,
        path: &ImportPath,
        dep_mappings: &FxHashMap<(String, String), String>,
        redirects: &mut RedirectTable,
        parcels: &IndexMap<String, Rc<dyn Parcel<S>>>,
        services: &S,
    ) -> Option<(ImportPath, ModuleDescription)> {
        let head = path.head();
        let target_install_name = if head == SELF_HEAD {
            subject_install_name.to_owned()
        } else {
            dep_mappings.get(&(subject_install_name.to_owned(), head.to_owned()))?.clone()
        };
        let translated = path.with_head(&target_install_name);
        let resolved = redirects.apply(subject_install_name, &translated);

        let key = resolved.to_string();
        if let Some(cached) = self.memo.get(&key) {
            return Some((resolved, cached.clone()));
        }

        let install_name = resolved.head();
        let parcel = parcels.get(install_name)?;
        let relative = resolved.tail().join("/");
        let module = parcel.import(services, &relative)?;
        self.memo.insert(key, module.clone());
        Some((resolved, module))
    }

    pub fn is_memoized(&self, resolved_path: &str) -> bool {
        self.memo.contains_key(resolved_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yama_ir::UnqualifiedName;

    struct Root;
    impl Parcel<()> for Root {
        fn deps(&self) -> Vec<String> {
            vec![]
        }
        fn import(&self, _services: &(), relative_path: &str) -> Option<ModuleDescription> {
            if relative_path.is_empty() {
                Some(ModuleDescription::new())
            } else {
                None
            }
        }
    }

    #[test]
    fn resolves_via_self_head() {
        let mut resolver = ImportResolver::new();
        let mut redirects = RedirectTable::new();
        let mut parcels: IndexMap<String, Rc<dyn Parcel<()>>> = IndexMap::new();
        parcels.insert("p".to_owned(), Rc::new(Root));
        let dep_mappings = FxHashMap::default();

        let path = ImportPath::parse("self").unwrap();
        let resolved = resolver.resolve("p", &path, &dep_mappings, &mut redirects, &parcels, &());
        assert!(resolved.is_some(), "self head should translate to the subject's own install-name");
    }

    #[test]
    fn resolve_caches_non_empty_results() {
        let mut resolver = ImportResolver::new();
        let mut redirects = RedirectTable::new();
        let mut parcels: IndexMap<String, Rc<dyn Parcel<()>>> = IndexMap::new();
        parcels.insert("p".to_owned(), Rc::new(Root));
        let dep_mappings = FxHashMap::default();
        let path = ImportPath::parse("p").unwrap();
        resolver.resolve("p", &path, &dep_mappings, &mut redirects, &parcels, &());
        assert!(resolver.is_memoized("p"));
        let _ = UnqualifiedName::parse("x");
    }
}
