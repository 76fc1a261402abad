//! The symbolic values the bytecode verifier's abstract interpreter tracks
//! in each register.

use yama_ir::Fullname;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCallsig {
    pub params: Vec<Fullname>,
    pub return_type: Fullname,
}

/// A register either holds an ordinary value of some named type, or holds
/// a first-class callable type (pushed by `put_type_const` against a
/// function/method-type constant) ready to be invoked by `call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegType {
    Named(Fullname),
    Callable(Fullname, ResolvedCallsig),
}

impl RegType {
    pub fn type_name(&self) -> &Fullname {
        match self {
            Self::Named(qn) => qn,
            Self::Callable(qn, _) => qn,
        }
    }
}

impl std::fmt::Display for RegType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterState(pub Vec<RegType>);

impl RegisterState {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
