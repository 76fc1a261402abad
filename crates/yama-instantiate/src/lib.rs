//! Turns verified type descriptions into live runtime type objects,
//! resolving reference constants transitively with placeholder-first cyclic
//! safety, staged against a scratch arena and committed atomically.

pub mod instantiate;
pub mod runtime;

pub use instantiate::{DescriptionLookup, InstantiateError, Instantiator};
pub use runtime::{CommittedDb, RuntimeCallsig, RuntimeType, StagedChanges, TypeId};
