//! Per-type checks: member/non-member consistency, constant-table qualified
//! name validation, and callsig sanity.

use crate::outcome::VerifyError;
use yama_common::Dsignal;
use yama_ir::{ConstKind, TypeDescription, TypePayload};

/// `dep_names` are the dependency names declared by the parcel owning this
/// type's module; a constant's qualified name may reference the reserved
/// self-head or any of these, nothing else.
pub fn check_type(desc: &TypeDescription, dep_names: &[String]) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    if desc.name.is_member() != desc.kind.is_member() {
        errors.push(VerifyError::new(
            Dsignal::VerifIllegalMemberName,
            format!("`{}` has an owner::member split but kind {:?} is not a member kind, or vice versa", desc.name, desc.kind),
        ));
    }

    for (idx, c) in desc.consts.iter() {
        if let Some(qn) = c.qualified_name() {
            let head = qn.path.head();
            if head != yama_resolve_self_head() && !dep_names.iter().any(|d| d == head) {
                errors.push(VerifyError::new(
                    Dsignal::VerifIllegalOwnerPrefix,
                    format!("constant {idx} references `{qn}` whose head `{head}` is neither self nor a declared dependency"),
                ));
            }
            let expects_member = c.kind() == ConstKind::MethodType;
            if qn.name.is_member() != expects_member {
                errors.push(VerifyError::new(
                    Dsignal::VerifIllegalOwnerPrefix,
                    format!("constant {idx}'s kind {:?} does not match the member-ness of `{qn}`", c.kind()),
                ));
            }
        }
        if let Some(sig) = c.callsig() {
            check_callsig_indices(&mut errors, desc, sig, idx);
        }
    }

    if let TypePayload::Callable { callsig, .. } = &desc.payload {
        check_callsig_indices(&mut errors, desc, callsig, u32::MAX);
    }

    errors
}

fn yama_resolve_self_head() -> &'static str {
    "self"
}

fn check_callsig_indices(errors: &mut Vec<VerifyError>, desc: &TypeDescription, sig: &yama_ir::Callsig, owner_const: u32) {
    let context = if owner_const == u32::MAX { "the type's own callsig".to_owned() } else { format!("constant {owner_const}'s callsig") };
    for &p in sig.params.iter().chain(std::iter::once(&sig.return_index)) {
        match desc.consts.const_type(p) {
            Some(kind) if kind.is_type_const() => {}
            Some(_) => {
                errors.push(VerifyError::new(
                    Dsignal::VerifCallsigNotTypeConst,
                    format!("{context} references constant {p}, which is not a type constant"),
                ));
            }
            None => {
                errors.push(VerifyError::new(
                    Dsignal::VerifCallsigIndexOutOfBounds,
                    format!("{context} references out-of-bounds constant {p}"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yama_ir::{Callsig, Const, ConstTable, Fullname, Kind as IrKind, TypeDescription, UnqualifiedName};

    #[test]
    fn member_kind_without_owner_split_is_rejected() {
        let name = UnqualifiedName::parse("m").unwrap();
        let desc = TypeDescription::new_callable(
            name,
            ConstTable::new(),
            IrKind::Method,
            Callsig::new([], 0),
            0,
            yama_ir::CallBehavior::Native,
            vec![],
            vec![],
        );
        let errors = check_type(&desc, &[]);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifIllegalMemberName));
    }

    #[test]
    fn unmapped_dependency_head_is_rejected() {
        let name = UnqualifiedName::parse("T").unwrap();
        let mut consts = ConstTable::new();
        consts.push(Const::StructType(Fullname::parse("other:X").unwrap()));
        let desc = TypeDescription::new_struct(name, consts);
        let errors = check_type(&desc, &["alt".to_owned()]);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifIllegalOwnerPrefix));
    }
}
