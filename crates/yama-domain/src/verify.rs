//! Runs a freshly imported module through the static verifier before the
//! domain will hand any of its types to the instantiator or cache it as
//! resolved.

use yama_common::DomainOptions;
use yama_ir::{CallBehavior, Callsig, Fullname, ModuleDescription, TypeDescription, TypePayload};
use yama_verify::{check_module, check_type, verify_bytecode, VerifyContext, VerifyError};

pub(crate) fn verify_module(module: &ModuleDescription, dep_names: &[String], options: &DomainOptions) -> (Vec<VerifyError>, Vec<VerifyError>) {
    let mut errors = check_module(module);
    let mut warnings = Vec::new();

    for (_, desc) in module.iter() {
        errors.extend(check_type(desc, dep_names));

        if let TypePayload::Callable { callsig, max_locals, behavior: CallBehavior::Bytecode, bytecode, debug_symbols } = &desc.payload {
            match resolved_signature(desc, callsig) {
                Some((params, return_type)) => {
                    let ctx = VerifyContext {
                        consts: &desc.consts,
                        params,
                        return_type,
                        max_locals: *max_locals,
                        dead_code_is_error: options.dead_code_is_error,
                        debug_symbols,
                    };
                    let (mut errs, mut warns) = verify_bytecode(bytecode, &ctx);
                    errors.append(&mut errs);
                    warnings.append(&mut warns);
                }
                None => {
                    // `check_type` above already reported the malformed
                    // callsig index; nothing more to verify here.
                }
            }
        }
    }

    (errors, warnings)
}

fn resolved_signature(desc: &TypeDescription, callsig: &Callsig) -> Option<(Vec<Fullname>, Fullname)> {
    let mut params = Vec::with_capacity(callsig.params.len());
    for &p in &callsig.params {
        params.push(desc.consts.qualified_name(p)?.clone());
    }
    let return_type = desc.consts.qualified_name(callsig.return_index)?.clone();
    Some((params, return_type))
}
