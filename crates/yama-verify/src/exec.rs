//! Symbolic register-state execution over the CFG: the core of bytecode
//! verification. Walks every reachable block from the entry block, evaluates
//! each instruction against an abstract register state, and checks that
//! incoming states agree at every block already visited (branch coherence).
//! Blocks never reached are reported as warnings, not errors, unless the
//! domain's options promote dead code to an error.

use crate::{builtins, Block};
use crate::outcome::VerifyError;
use crate::reg::{RegType, RegisterState, ResolvedCallsig};
use std::collections::VecDeque;
use yama_common::{Dsignal, SourcePos};
use yama_ir::{Const, ConstTable, Instruction, Opcode, NEWTOP};

pub struct VerifyContext<'a> {
    pub consts: &'a ConstTable,
    pub params: Vec<yama_ir::Fullname>,
    pub return_type: yama_ir::Fullname,
    pub max_locals: u32,
    pub dead_code_is_error: bool,
    /// One entry per bytecode instruction, carried only to enrich a raised
    /// error's message with the source location it came from; never consulted
    /// for anything that changes verification's pass/fail outcome.
    pub debug_symbols: &'a [Option<SourcePos>],
}

fn pos_at<'a>(ctx: &'a VerifyContext, idx: usize) -> Option<&'a SourcePos> {
    ctx.debug_symbols.get(idx).and_then(Option::as_ref)
}

fn annotate(mut err: VerifyError, pos: Option<&SourcePos>) -> VerifyError {
    if let Some(pos) = pos {
        err.message = format!("{} (at {}:{}:{})", err.message, pos.origin, pos.line, pos.char_offset);
    }
    err
}

/// Verifies one callable's bytecode. Returns `(errors, warnings)`; if
/// `errors` is non-empty the type must not be committed.
pub fn verify_bytecode(bytecode: &[Instruction], ctx: &VerifyContext) -> (Vec<VerifyError>, Vec<VerifyError>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if bytecode.is_empty() {
        errors.push(VerifyError::new(Dsignal::VerifEmptyBytecode, "bytecode must contain at least one instruction"));
        return (errors, warnings);
    }

    let blocks = crate::cfg::build_blocks(bytecode);
    let mut block_of_index = vec![0usize; bytecode.len()];
    for (bi, b) in blocks.iter().enumerate() {
        for i in b.start..b.end {
            block_of_index[i] = bi;
        }
    }

    let mut entry_states: Vec<Option<RegisterState>> = vec![None; blocks.len()];
    let mut visited = vec![false; blocks.len()];
    entry_states[0] = Some(RegisterState::default());
    let mut worklist: VecDeque<usize> = VecDeque::new();
    worklist.push_back(0);

    while let Some(bi) = worklist.pop_front() {
        if visited[bi] {
            continue;
        }
        visited[bi] = true;
        let block = blocks[bi];
        let mut state = entry_states[bi].clone().unwrap_or_default();

        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(block = bi, start = block.start, end = block.end, "symbolic execution entering block");
        }

        for idx in block.start..block.end {
            let instr = bytecode[idx];
            match step(&mut state, instr, ctx) {
                Ok(()) => {}
                Err(e) => errors.push(annotate(e, pos_at(ctx, idx))),
            }
        }

        let last = bytecode[block.end - 1];
        match last.opcode {
            Opcode::Ret => {}
            Opcode::Jump => {
                if let Some(target) = last.jump_target(block.end - 1) {
                    schedule(target, &block_of_index, &state, &mut entry_states, &mut visited, &mut worklist, &mut errors, pos_at(ctx, block.end - 1));
                } else {
                    errors.push(annotate(VerifyError::new(Dsignal::VerifJumpOutOfBounds, "jump target out of bounds"), pos_at(ctx, block.end - 1)));
                }
            }
            Opcode::JumpTrue | Opcode::JumpFalse => {
                if let Some(target) = last.jump_target(block.end - 1) {
                    schedule(target, &block_of_index, &state, &mut entry_states, &mut visited, &mut worklist, &mut errors, pos_at(ctx, block.end - 1));
                } else {
                    errors.push(annotate(VerifyError::new(Dsignal::VerifJumpOutOfBounds, "jump target out of bounds"), pos_at(ctx, block.end - 1)));
                }
                if block.end < bytecode.len() {
                    let next = block_of_index[block.end];
                    merge(&mut entry_states, next, &state, &mut errors);
                    if !visited[next] {
                        worklist.push_back(next);
                    }
                } else {
                    errors.push(VerifyError::new(Dsignal::VerifPutsPcOutOfBounds, "control falls off the end of bytecode"));
                }
            }
            _ => {
                // Falls through: every block boundary other than ret/jump is
                // a conditional or non-branching instruction, so the next
                // block (if any) must exist.
                if block.end < bytecode.len() {
                    let next = block_of_index[block.end];
                    merge(&mut entry_states, next, &state, &mut errors);
                    if !visited[next] {
                        worklist.push_back(next);
                    }
                } else {
                    errors.push(VerifyError::new(Dsignal::VerifPutsPcOutOfBounds, "control falls off the end of bytecode"));
                }
            }
        }
    }

    for (bi, was_visited) in visited.iter().enumerate() {
        if !*was_visited {
            let b = blocks[bi];
            let msg = format!("block [{}, {}) is unreachable from entry", b.start, b.end);
            if ctx.dead_code_is_error {
                errors.push(VerifyError::new(Dsignal::VerifDeadCode, msg));
            } else {
                warnings.push(VerifyError::new(Dsignal::VerifDeadCode, msg));
            }
        }
    }

    (errors, warnings)
}

#[allow(clippy::too_many_arguments)]
fn schedule(
    target: usize,
    block_of_index: &[usize],
    state: &RegisterState,
    entry_states: &mut [Option<RegisterState>],
    visited: &mut [bool],
    worklist: &mut VecDeque<usize>,
    errors: &mut Vec<VerifyError>,
    source: Option<&SourcePos>,
) {
    if target >= block_of_index.len() {
        errors.push(annotate(VerifyError::new(Dsignal::VerifJumpOutOfBounds, format!("jump target {target} is out of bounds")), source));
        return;
    }
    let tb = block_of_index[target];
    merge(entry_states, tb, state, errors);
    if !visited[tb] {
        worklist.push_back(tb);
    }
}

fn merge(entry_states: &mut [Option<RegisterState>], target_block: usize, incoming: &RegisterState, errors: &mut Vec<VerifyError>) {
    match &entry_states[target_block] {
        None => entry_states[target_block] = Some(incoming.clone()),
        Some(existing) => {
            if existing.len() != incoming.len() {
                errors.push(VerifyError::new(
                    Dsignal::VerifViolatesRegisterCoherence,
                    format!("register count mismatch entering block: {} vs {}", existing.len(), incoming.len()),
                ));
                return;
            }
            for (i, (a, b)) in existing.0.iter().zip(incoming.0.iter()).enumerate() {
                if a != b {
                    errors.push(VerifyError::new(
                        Dsignal::VerifViolatesRegisterCoherence,
                        format!("register {i} type mismatch entering block: `{a}` vs `{b}`"),
                    ));
                }
            }
        }
    }
}

fn get_reg(state: &RegisterState, idx: u8) -> Result<RegType, VerifyError> {
    state.0.get(idx as usize).cloned().ok_or_else(|| {
        VerifyError::new(Dsignal::VerifRegisterOutOfBounds, format!("register {idx} out of bounds"))
    })
}

fn pop_top(state: &mut RegisterState) -> Result<RegType, VerifyError> {
    state.0.pop().ok_or_else(|| VerifyError::new(Dsignal::VerifRegisterOutOfBounds, "pop from empty register stack"))
}

fn put_value(state: &mut RegisterState, dest: u8, reinit: bool, value: RegType, ctx: &VerifyContext) -> Result<(), VerifyError> {
    if dest == NEWTOP {
        if state.len() as u32 >= ctx.max_locals {
            return Err(VerifyError::new(Dsignal::VerifMaxLocalsExceeded, format!("register count would exceed max_locals ({})", ctx.max_locals)));
        }
        state.0.push(value);
        Ok(())
    } else {
        let idx = dest as usize;
        if idx >= state.len() {
            return Err(VerifyError::new(Dsignal::VerifRegisterOutOfBounds, format!("register {idx} out of bounds")));
        }
        if !reinit && state.0[idx] != value {
            return Err(VerifyError::new(
                Dsignal::VerifRegisterWrongType,
                format!("register {idx} holds `{}`, cannot overwrite with `{}` without reinit", state.0[idx], value),
            ));
        }
        state.0[idx] = value;
        Ok(())
    }
}

fn object_const_type(c: &Const) -> Option<RegType> {
    match c {
        Const::Int(_) => Some(RegType::Named(builtins::int_type())),
        Const::Uint(_) => Some(RegType::Named(builtins::uint_type())),
        Const::Float(_) => Some(RegType::Named(builtins::float_type())),
        Const::Bool(_) => Some(RegType::Named(builtins::bool_type())),
        Const::Char(_) => Some(RegType::Named(builtins::char_type())),
        _ => None,
    }
}

fn resolve_callsig(sig: &yama_ir::Callsig, consts: &ConstTable) -> Option<ResolvedCallsig> {
    let mut params = Vec::with_capacity(sig.params.len());
    for &p in &sig.params {
        params.push(consts.qualified_name(p)?.clone());
    }
    let return_type = consts.qualified_name(sig.return_index)?.clone();
    Some(ResolvedCallsig { params, return_type })
}

fn resolve_put_value(instr: Instruction, ctx: &VerifyContext) -> Result<RegType, VerifyError> {
    match instr.opcode {
        Opcode::PutNone => Ok(RegType::Named(builtins::none_type())),
        Opcode::PutConst => {
            let c = ctx.consts.get(instr.b as u32).ok_or_else(|| {
                VerifyError::new(Dsignal::VerifCallsigIndexOutOfBounds, format!("constant {} out of bounds", instr.b))
            })?;
            object_const_type(c)
                .ok_or_else(|| VerifyError::new(Dsignal::VerifConstWrongKind, "put_const target is not an object constant"))
        }
        Opcode::PutTypeConst => {
            let c = ctx.consts.get(instr.b as u32).ok_or_else(|| {
                VerifyError::new(Dsignal::VerifCallsigIndexOutOfBounds, format!("constant {} out of bounds", instr.b))
            })?;
            match c {
                Const::FunctionType(qn, sig) | Const::MethodType(qn, sig) => {
                    let resolved = resolve_callsig(sig, ctx.consts).ok_or_else(|| {
                        VerifyError::new(Dsignal::VerifCallsigNotTypeConst, "callable constant's callsig references a non-type constant")
                    })?;
                    Ok(RegType::Callable(qn.clone(), resolved))
                }
                Const::PrimitiveType(qn) | Const::StructType(qn) => Ok(RegType::Named(qn.clone())),
                _ => Err(VerifyError::new(Dsignal::VerifConstNotTypeConst, "put_type_const target is not a type constant")),
            }
        }
        Opcode::PutArg => ctx
            .params
            .get(instr.b as usize)
            .cloned()
            .map(RegType::Named)
            .ok_or_else(|| VerifyError::new(Dsignal::VerifArgCountMismatch, format!("no parameter at index {}", instr.b))),
        Opcode::DefaultInit => {
            let c = ctx.consts.get(instr.b as u32).ok_or_else(|| {
                VerifyError::new(Dsignal::VerifCallsigIndexOutOfBounds, format!("constant {} out of bounds", instr.b))
            })?;
            c.qualified_name()
                .cloned()
                .map(RegType::Named)
                .ok_or_else(|| VerifyError::new(Dsignal::VerifConstNotTypeConst, "default_init target is not a type constant"))
        }
        _ => unreachable!("resolve_put_value only called for put-like opcodes"),
    }
}

fn call(state: &mut RegisterState, instr: Instruction, discard_result: bool, ctx: &VerifyContext) -> Result<(), VerifyError> {
    let n = instr.a as usize;
    if n == 0 || n > state.len() {
        return Err(VerifyError::new(Dsignal::VerifRegisterOutOfBounds, "call pops more registers than are available"));
    }
    let start = state.len() - n;
    let callable = state.0[start].clone();
    let args: Vec<RegType> = state.0[start + 1..].to_vec();
    state.0.truncate(start);

    let RegType::Callable(_, sig) = callable else {
        return Err(VerifyError::new(Dsignal::VerifArgTypeMismatch, format!("`{callable}` is not callable")));
    };

    if sig.params.len() != args.len() {
        return Err(VerifyError::new(
            Dsignal::VerifArgCountMismatch,
            format!("expected {} arguments, got {}", sig.params.len(), args.len()),
        ));
    }
    for (expected, actual) in sig.params.iter().zip(args.iter()) {
        if expected != actual.type_name() {
            return Err(VerifyError::new(
                Dsignal::VerifArgTypeMismatch,
                format!("argument type mismatch: expected `{expected}`, got `{actual}`"),
            ));
        }
    }

    if !discard_result {
        put_value(state, instr.b, instr.reinit, RegType::Named(sig.return_type), ctx)?;
    }
    Ok(())
}

fn step(state: &mut RegisterState, instr: Instruction, ctx: &VerifyContext) -> Result<(), VerifyError> {
    match instr.opcode {
        Opcode::Noop => Ok(()),
        Opcode::Pop => {
            let n = (instr.a as usize).min(state.len());
            let new_len = state.len() - n;
            state.0.truncate(new_len);
            Ok(())
        }
        Opcode::PutNone | Opcode::PutConst | Opcode::PutTypeConst | Opcode::PutArg | Opcode::DefaultInit => {
            let value = resolve_put_value(instr, ctx)?;
            put_value(state, instr.a, instr.reinit, value, ctx)
        }
        Opcode::Copy => {
            let src = get_reg(state, instr.a)?;
            put_value(state, instr.b, instr.reinit, src, ctx)
        }
        Opcode::Call => call(state, instr, false, ctx),
        Opcode::CallNr => call(state, instr, true, ctx),
        Opcode::Ret => {
            let rt = get_reg(state, instr.a)?;
            if rt.type_name() != &ctx.return_type {
                return Err(VerifyError::new(
                    Dsignal::VerifReturnTypeMismatch,
                    format!("returned `{rt}`, expected `{}`", ctx.return_type),
                ));
            }
            Ok(())
        }
        Opcode::Jump => Ok(()),
        Opcode::JumpTrue | Opcode::JumpFalse => {
            let top = pop_top(state)?;
            if top.type_name() != &builtins::bool_type() {
                return Err(VerifyError::new(Dsignal::VerifConditionNotBool, format!("branch condition has type `{top}`, expected `yama:Bool`")));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yama_ir::{Callsig, Const, ConstTable, Fullname};

    fn none_ty() -> Fullname {
        Fullname::parse("yama:None").unwrap()
    }

    fn int_ty() -> Fullname {
        Fullname::parse("yama:Int").unwrap()
    }

    #[test]
    fn straight_line_return_passes() {
        let mut consts = ConstTable::new();
        let three = consts.push(Const::Int(3));
        let bytecode =
            vec![Instruction::new(Opcode::PutConst).with_a(NEWTOP).with_b(three as u8), Instruction::new(Opcode::Ret).with_a(0)];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: int_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, warnings) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn jump_target_equal_to_bytecode_len_is_out_of_bounds() {
        // `jump_target(0)` for `sBx = 0` is `0 + 1 + 0 = 1`, exactly
        // `bytecode.len()`: one past the last valid index, not the last one.
        let consts = ConstTable::new();
        let bytecode = vec![Instruction::new(Opcode::Jump).with_sbx(0)];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifJumpOutOfBounds));
    }

    #[test]
    fn copy_and_pop_round_trip() {
        let mut consts = ConstTable::new();
        let three = consts.push(Const::Int(3));
        let bytecode = vec![
            Instruction::new(Opcode::PutConst).with_a(NEWTOP).with_b(three as u8),
            Instruction::new(Opcode::Copy).with_a(0).with_b(NEWTOP),
            Instruction::new(Opcode::Pop).with_a(1),
            Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: int_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, warnings) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn call_with_wrong_arg_count_is_rejected() {
        let mut consts = ConstTable::new();
        let int_const = consts.push(Const::PrimitiveType(int_ty()));
        let none_const = consts.push(Const::PrimitiveType(none_ty()));
        let func_const = consts.push(Const::FunctionType(Fullname::parse("p:f").unwrap(), Callsig::new([int_const], none_const)));
        let bytecode = vec![
            Instruction::new(Opcode::PutTypeConst).with_a(NEWTOP).with_b(func_const as u8),
            Instruction::new(Opcode::CallNr).with_a(1),
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifArgCountMismatch));
    }

    #[test]
    fn call_with_wrong_arg_type_is_rejected() {
        let mut consts = ConstTable::new();
        let int_const = consts.push(Const::PrimitiveType(int_ty()));
        let none_const = consts.push(Const::PrimitiveType(none_ty()));
        let func_const = consts.push(Const::FunctionType(Fullname::parse("p:f").unwrap(), Callsig::new([int_const], none_const)));
        let bytecode = vec![
            Instruction::new(Opcode::PutTypeConst).with_a(NEWTOP).with_b(func_const as u8),
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::CallNr).with_a(2),
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifArgTypeMismatch));
    }

    #[test]
    fn jump_true_on_non_bool_condition_is_rejected() {
        let consts = ConstTable::new();
        let bytecode = vec![
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::JumpTrue).with_sbx(0),
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifConditionNotBool));
    }

    #[test]
    fn exceeding_max_locals_is_rejected() {
        let consts = ConstTable::new();
        let bytecode = vec![
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 1, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifMaxLocalsExceeded));
    }

    #[test]
    fn diverging_branches_joining_with_different_register_counts_violate_coherence() {
        let mut consts = ConstTable::new();
        let cond = consts.push(Const::Bool(true));
        let bytecode = vec![
            /* 0 */ Instruction::new(Opcode::PutConst).with_a(NEWTOP).with_b(cond as u8),
            /* 1 */ Instruction::new(Opcode::JumpTrue).with_sbx(2),
            /* 2 */ Instruction::new(Opcode::PutNone).with_a(NEWTOP),
            /* 3 */ Instruction::new(Opcode::Jump).with_sbx(0),
            /* 4 */ Instruction::new(Opcode::Ret).with_a(0),
        ];
        let ctx = VerifyContext { consts: &consts, params: vec![], return_type: none_ty(), max_locals: 4, dead_code_is_error: false, debug_symbols: &[] };
        let (errors, _) = verify_bytecode(&bytecode, &ctx);
        assert!(errors.iter().any(|e| e.dsignal == Dsignal::VerifViolatesRegisterCoherence));
    }
}
