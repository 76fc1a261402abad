//! The domain facade: owns every installed parcel, the dependency-mapping
//! and redirect tables, the verified-module cache and the committed runtime
//! type database, and dispatches `install`/`import`/`load`/`upload` out to
//! the crates that implement each concern.
//!
//! A domain is single-threaded cooperative: its state lives behind one
//! `Rc<RefCell<_>>`, not a lock. Every public method takes short, disjoint
//! borrows and drops them before calling into a parcel, so a parcel's
//! `import` can safely resolve its own dependencies through the
//! [`ParcelServices`] it is handed — the one thing it must not do is call
//! back into that handle from within its own `import` (see
//! [`ParcelServices`]'s doc comment).

mod builtins;
mod domain;
mod inner;
mod services;
mod uploads;
mod verify;

pub use domain::Domain;
pub use services::ParcelServices;
pub use yama_instantiate::{InstantiateError, RuntimeCallsig, RuntimeType, TypeId};
