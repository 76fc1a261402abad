//! Per-module checks: every method-kind type's owner prefix must name a
//! type that exists in the same module.

use crate::outcome::VerifyError;
use yama_common::Dsignal;
use yama_ir::{Kind, ModuleDescription, UnqualifiedName};

pub fn check_module(module: &ModuleDescription) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    for (name, desc) in module.iter() {
        if desc.kind != Kind::Method {
            continue;
        }
        let Some(owner) = desc.name.owner() else {
            continue; // already reported by check_type's member-consistency check
        };
        let Some(owner_name) = UnqualifiedName::parse(owner) else {
            continue;
        };
        if module.get(&owner_name).is_none() {
            errors.push(VerifyError::new(
                Dsignal::VerifOwnerNotFound,
                format!("method `{name}`'s owner type `{owner}` does not exist in this module"),
            ));
        }
    }
    errors
}
