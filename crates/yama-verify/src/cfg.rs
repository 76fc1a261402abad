//! Control-flow graph construction: division points and the blocks between
//! them.

use std::collections::BTreeSet;
use yama_ir::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

/// Division points: `0`, `len`, the index immediately after every jump or
/// `ret`, and the destination of every in-bounds jump.
pub fn division_points(bytecode: &[Instruction]) -> Vec<usize> {
    let mut points = BTreeSet::new();
    points.insert(0);
    points.insert(bytecode.len());
    for (i, instr) in bytecode.iter().enumerate() {
        if instr.opcode.is_terminator() {
            points.insert((i + 1).min(bytecode.len()));
        }
        if let Some(target) = instr.jump_target(i) {
            if target < bytecode.len() {
                points.insert(target);
            }
        }
    }
    points.into_iter().collect()
}

/// Blocks are the half-open intervals between consecutive division points.
pub fn build_blocks(bytecode: &[Instruction]) -> Vec<Block> {
    let points = division_points(bytecode);
    points.windows(2).map(|w| Block { start: w[0], end: w[1] }).collect()
}
