//! Import path resolution through per-parcel dependency mappings, and the
//! prefix-keyed redirect table consulted while resolving indirect imports.

pub mod redirect;
pub mod resolver;

pub use redirect::RedirectTable;
pub use resolver::{ImportResolver, SELF_HEAD};
