//! The instantiator proper: placeholder-first cyclic-safe resolution of a
//! fullname against a staging arena, committed atomically by the caller on
//! success.
//!
//! Types are expected to already have passed per-type and per-module
//! verification (the domain runs those before it ever hands a description
//! here — see step 7 of the instantiation algorithm); bytecode is verified
//! separately once every referenced type's shape is known, since symbolic
//! execution needs resolved parameter/return types the constant table alone
//! doesn't carry.

use crate::runtime::{RuntimeCallsig, RuntimeType, StagedChanges, TypeId};
use rustc_hash::FxHashMap;
use yama_common::Dsignal;
use yama_ir::{Fullname, ImportPath, Kind, TypeDescription, TypePayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateError {
    pub dsignal: Dsignal,
    pub message: String,
}

impl InstantiateError {
    fn new(dsignal: Dsignal, message: impl Into<String>) -> Self {
        Self { dsignal, message: message.into() }
    }
}

impl std::fmt::Display for InstantiateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.dsignal, self.message)
    }
}

/// Reserved head a constant table uses to name a type in its own owning
/// module without knowing the real install-name that module ends up
/// published under. Mirrors `yama_resolve::resolver::SELF_HEAD`; duplicated
/// rather than imported since pulling in `yama-resolve` here just for one
/// string constant would invert the crate's dependency direction.
const SELF_HEAD: &str = "self";

/// Rewrites a `self`-headed qualified name to name `module` literally;
/// leaves every other qualified name untouched. `self` always stands for
/// the whole owning module path (never just its install-name head), since
/// at the constant-table level it means "a type in this very module" —
/// unlike the resolver's own `self` handling, which only ever substitutes a
/// subject's install-name head because a parcel's own `import` calls supply
/// the rest of the path themselves.
fn in_module(qn: &Fullname, module: &ImportPath) -> Fullname {
    if qn.path.head() == SELF_HEAD {
        Fullname::new(module.clone(), qn.name.clone())
    } else {
        qn.clone()
    }
}

/// Resolves a fullname to the module it lives in plus its verified type
/// description, and reports whether a fullname is already committed.
/// Implemented by the domain, which owns the import resolver and the
/// committed type database.
///
/// Deliberately does not hand the instantiator a borrowed `&CommittedDb`:
/// `lookup` may recurse back into the domain (a parcel's own `import` can
/// call back in), so every query here must be a short, self-contained
/// borrow rather than one held for the whole instantiation.
pub trait DescriptionLookup {
    fn already_instantiated(&self, fullname: &Fullname) -> Option<TypeId>;
    fn lookup(&self, fullname: &Fullname) -> Option<(ImportPath, TypeDescription)>;
}

pub struct Instantiator<'a, L: DescriptionLookup> {
    committed_len: usize,
    lookup: &'a L,
    new_types: Vec<RuntimeType>,
    new_by_fullname: FxHashMap<Fullname, TypeId>,
    in_progress: FxHashMap<Fullname, TypeId>,
}

impl<'a, L: DescriptionLookup> Instantiator<'a, L> {
    pub fn new(committed_len: usize, lookup: &'a L) -> Self {
        Self {
            committed_len,
            lookup,
            new_types: Vec::new(),
            new_by_fullname: FxHashMap::default(),
            in_progress: FxHashMap::default(),
        }
    }

    fn local_index(&self, id: TypeId) -> usize {
        id.0 as usize - self.committed_len
    }

    /// Instantiates `fullname`. On success, returns its [`TypeId`] plus
    /// everything staged for the caller to [`CommittedDb::commit`]. On
    /// failure the returned error is the only visible effect; simply
    /// dropping `self` discards every placeholder created along the way.
    pub fn instantiate(mut self, fullname: &Fullname) -> Result<(TypeId, StagedChanges), InstantiateError> {
        tracing::debug!(%fullname, "instantiating");
        let id = self.resolve(fullname)?;
        Ok((id, StagedChanges { new_types: self.new_types, new_by_fullname: self.new_by_fullname }))
    }

    fn resolve(&mut self, fullname: &Fullname) -> Result<TypeId, InstantiateError> {
        if let Some(id) = self.lookup.already_instantiated(fullname) {
            return Ok(id);
        }
        if let Some(&id) = self.new_by_fullname.get(fullname) {
            return Ok(id);
        }
        if let Some(&id) = self.in_progress.get(fullname) {
            // Cyclic reference: the in-progress call further up the
            // resolution stack will fill this placeholder in on return.
            return Ok(id);
        }

        let (module, desc) = self
            .lookup
            .lookup(fullname)
            .ok_or_else(|| InstantiateError::new(Dsignal::ItemNotFound, format!("no type description for `{fullname}`")))?;

        let id = self.reserve(fullname.clone(), module.clone(), desc.kind);

        let mut refs = Vec::new();
        for (_, c) in desc.consts.iter() {
            if let Some(qn) = c.qualified_name() {
                refs.push(self.resolve(&in_module(qn, &module))?);
            }
        }

        let callsig = match &desc.payload {
            TypePayload::Callable { callsig, .. } => Some(self.resolve_callsig(&module, &desc, callsig)?),
            _ => None,
        };

        let local = self.local_index(id);
        self.new_types[local].refs = refs;
        self.new_types[local].callsig = callsig;
        self.in_progress.remove(fullname);
        self.new_by_fullname.insert(fullname.clone(), id);
        Ok(id)
    }

    fn resolve_callsig(&mut self, module: &ImportPath, desc: &TypeDescription, callsig: &yama_ir::Callsig) -> Result<RuntimeCallsig, InstantiateError> {
        let mut params = Vec::with_capacity(callsig.params.len());
        for &p in &callsig.params {
            let qn = desc.consts.qualified_name(p).ok_or_else(|| {
                InstantiateError::new(Dsignal::VerifCallsigNotTypeConst, format!("callsig param {p} is not a type constant"))
            })?;
            let qn = in_module(qn, module);
            params.push(self.resolve(&qn)?);
        }
        let return_qn = desc
            .consts
            .qualified_name(callsig.return_index)
            .ok_or_else(|| InstantiateError::new(Dsignal::VerifCallsigNotTypeConst, "callsig return index is not a type constant"))?;
        let return_qn = in_module(return_qn, module);
        let return_type = self.resolve(&return_qn)?;
        Ok(RuntimeCallsig { params, return_type })
    }

    fn reserve(&mut self, fullname: Fullname, module: ImportPath, kind: Kind) -> TypeId {
        let id = TypeId((self.committed_len + self.new_types.len()) as u32);
        self.new_types.push(RuntimeType { module, fullname: fullname.clone(), kind, refs: Vec::new(), callsig: None });
        self.in_progress.insert(fullname, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yama_ir::{CallBehavior, Callsig, Const, ConstTable, UnqualifiedName};

    struct MapLookup(FxHashMap<String, (ImportPath, TypeDescription)>);

    impl DescriptionLookup for MapLookup {
        fn already_instantiated(&self, _fullname: &Fullname) -> Option<TypeId> {
            None
        }

        fn lookup(&self, fullname: &Fullname) -> Option<(ImportPath, TypeDescription)> {
            self.0.get(&fullname.to_string()).cloned()
        }
    }

    #[test]
    fn instantiates_simple_struct() {
        let path = ImportPath::parse("p").unwrap();
        let name = UnqualifiedName::parse("T").unwrap();
        let desc = TypeDescription::new_struct(name.clone(), ConstTable::new());
        let mut map = FxHashMap::default();
        map.insert("p:T".to_owned(), (path, desc));
        let lookup = MapLookup(map);

        let instantiator = Instantiator::new(0, &lookup);
        let (id, staged) = instantiator.instantiate(&Fullname::parse("p:T").unwrap()).unwrap();
        assert_eq!(staged.new_types.len(), 1);
        assert_eq!(staged.new_types[id.0 as usize].fullname.to_string(), "p:T");
    }

    #[test]
    fn resolves_mutually_recursive_function_types() {
        let path = ImportPath::parse("p").unwrap();

        let mut f_consts = ConstTable::new();
        f_consts.push(Const::FunctionType(Fullname::parse("p:g").unwrap(), Callsig::new([], 0)));
        let f_desc = TypeDescription::new_callable(
            UnqualifiedName::parse("f").unwrap(),
            f_consts,
            yama_ir::Kind::Function,
            Callsig::new([], 0),
            0,
            CallBehavior::Native,
            vec![],
            vec![],
        );

        let mut g_consts = ConstTable::new();
        g_consts.push(Const::FunctionType(Fullname::parse("p:f").unwrap(), Callsig::new([], 0)));
        let g_desc = TypeDescription::new_callable(
            UnqualifiedName::parse("g").unwrap(),
            g_consts,
            yama_ir::Kind::Function,
            Callsig::new([], 0),
            0,
            CallBehavior::Native,
            vec![],
            vec![],
        );

        let mut map = FxHashMap::default();
        map.insert("p:f".to_owned(), (path.clone(), f_desc));
        map.insert("p:g".to_owned(), (path, g_desc));
        let lookup = MapLookup(map);

        let instantiator = Instantiator::new(0, &lookup);
        let (f_id, staged) = instantiator.instantiate(&Fullname::parse("p:f").unwrap()).unwrap();
        assert_eq!(staged.new_types.len(), 2);
        let f_rt = &staged.new_types[f_id.0 as usize];
        assert_eq!(f_rt.refs.len(), 1);
        let g_id = f_rt.refs[0];
        let g_rt = &staged.new_types[g_id.0 as usize];
        assert_eq!(g_rt.refs[0], f_id, "g's reference constant must point back to f, proving the cycle resolved");
    }
}
