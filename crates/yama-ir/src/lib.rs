//! The shared leaf data model consumed by every other crate in the runtime:
//! qualified names, constant tables, type descriptions, module descriptions
//! and the bytecode instruction encoding.

pub mod bytecode;
pub mod callsig;
pub mod constant;
pub mod module;
pub mod names;
pub mod ty;

pub use bytecode::{Instruction, Opcode, NEWTOP};
pub use callsig::Callsig;
pub use constant::{Const, ConstKind, ConstTable};
pub use module::ModuleDescription;
pub use names::{Fullname, ImportPath, UnqualifiedName};
pub use ty::{CallBehavior, Kind, PrimitiveTag, TypeDescription, TypePayload};
