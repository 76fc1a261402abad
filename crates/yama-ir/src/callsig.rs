use smallvec::SmallVec;

/// An ordered list of parameter constant-indices plus one return constant-index.
/// All indices must address type constants of the owning constant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsig {
    pub params: SmallVec<[u32; 4]>,
    pub return_index: u32,
}

impl Callsig {
    pub fn new(params: impl IntoIterator<Item = u32>, return_index: u32) -> Self {
        Self { params: params.into_iter().collect(), return_index }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}
