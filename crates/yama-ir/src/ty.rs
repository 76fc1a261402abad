use crate::{Callsig, ConstTable, Instruction};
use yama_common::SourcePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Primitive,
    Function,
    Method,
    Struct,
}

impl Kind {
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method)
    }

    pub fn is_member(self) -> bool {
        matches!(self, Self::Method)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    None,
    Int,
    Uint,
    Float,
    Bool,
    Char,
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallBehavior {
    Native,
    Bytecode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypePayload {
    Primitive(PrimitiveTag),
    Callable {
        callsig: Callsig,
        max_locals: u32,
        behavior: CallBehavior,
        bytecode: Vec<Instruction>,
        debug_symbols: Vec<Option<SourcePos>>,
    },
    Struct,
}

/// A kind-tagged record carrying an unqualified name, a constant table, and
/// kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescription {
    pub name: crate::UnqualifiedName,
    pub consts: ConstTable,
    pub kind: Kind,
    pub payload: TypePayload,
}

impl TypeDescription {
    pub fn new_primitive(name: crate::UnqualifiedName, consts: ConstTable, tag: PrimitiveTag) -> Self {
        Self { name, consts, kind: Kind::Primitive, payload: TypePayload::Primitive(tag) }
    }

    pub fn new_struct(name: crate::UnqualifiedName, consts: ConstTable) -> Self {
        Self { name, consts, kind: Kind::Struct, payload: TypePayload::Struct }
    }

    pub fn new_callable(
        name: crate::UnqualifiedName,
        consts: ConstTable,
        kind: Kind,
        callsig: Callsig,
        max_locals: u32,
        behavior: CallBehavior,
        bytecode: Vec<Instruction>,
        debug_symbols: Vec<Option<SourcePos>>,
    ) -> Self {
        debug_assert!(kind.is_callable());
        Self {
            name,
            consts,
            kind,
            payload: TypePayload::Callable { callsig, max_locals, behavior, bytecode, debug_symbols },
        }
    }
}
