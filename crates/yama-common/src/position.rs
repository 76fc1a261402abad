//! Source position types attached to bytecode as optional debug symbols.
//! The verifier never inspects these beyond formatting diagnostics.

/// A single origin/offset/line triple, binding one bytecode offset back to
/// the source text the compiler produced it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    pub origin: String,
    pub char_offset: u32,
    pub line: u32,
}

impl SourcePos {
    pub fn new(origin: impl Into<String>, char_offset: u32, line: u32) -> Self {
        Self { origin: origin.into(), char_offset, line }
    }
}
