//! The committed result of instantiation: an arena of runtime type objects
//! addressed by stable index, so cross-references (including cycles) are
//! plain indices rather than owned structure.

use rustc_hash::FxHashMap;
use yama_ir::{Fullname, ImportPath, Kind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCallsig {
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

/// Owning module identity, fullname, kind, resolved reference-constant
/// pointers (one per type constant in the description's constant table, in
/// index order) and, for callable kinds, a resolved callsig.
///
/// `Clone` so callers (the domain's introspection surface, tests) can hand
/// out an owned snapshot without holding the committed DB's `RefCell`
/// borrow open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeType {
    pub module: ImportPath,
    pub fullname: Fullname,
    pub kind: Kind,
    pub refs: Vec<TypeId>,
    pub callsig: Option<RuntimeCallsig>,
}

/// The committed type database. Shared by all callers; lifetime equals the
/// domain's.
#[derive(Debug, Default)]
pub struct CommittedDb {
    arena: Vec<RuntimeType>,
    by_fullname: FxHashMap<Fullname, TypeId>,
}

impl CommittedDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TypeId) -> &RuntimeType {
        &self.arena[id.0 as usize]
    }

    pub fn lookup(&self, fullname: &Fullname) -> Option<TypeId> {
        self.by_fullname.get(fullname).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Merges a successful instantiation's staged output in bulk. No
    /// partial commits: call this only after every reference constant in
    /// `changes` resolved successfully.
    pub fn commit(&mut self, changes: StagedChanges) {
        for rt in changes.new_types {
            self.arena.push(rt);
        }
        for (fullname, id) in changes.new_by_fullname {
            self.by_fullname.insert(fullname, id);
        }
    }
}

/// Everything one instantiation run accumulated in its scratch arena.
/// Discarded wholesale (simply dropped) on failure, merged into a
/// [`CommittedDb`] on success.
#[derive(Debug, Default)]
pub struct StagedChanges {
    pub new_types: Vec<RuntimeType>,
    pub new_by_fullname: FxHashMap<Fullname, TypeId>,
}
