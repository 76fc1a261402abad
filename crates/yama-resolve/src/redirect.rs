//! Prefix-keyed, longest-match redirects, frozen per subject parcel on
//! first use.
//!
//! Every cross-module lookup in this crate funnels through
//! [`ImportResolver::resolve`], which always calls [`RedirectTable::apply`]
//! before consulting the memoized module table — avoiding divergent
//! resolutions between a path's first and later uses is the entire point
//! of freezing.

use rustc_hash::FxHashMap;
use yama_ir::ImportPath;

#[derive(Debug, Clone)]
struct Redirect {
    subject_prefix: ImportPath,
    before_prefix: ImportPath,
    after: ImportPath,
}

#[derive(Debug, Default)]
pub struct RedirectTable {
    redirects: Vec<Redirect>,
    /// Per-subject snapshot of applicable redirects, taken at first
    /// consultation. Once present, later `add_redirect` calls have no
    /// effect on that subject even though they still mutate `redirects`.
    frozen: FxHashMap<String, Vec<usize>>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_redirect(&mut self, subject_prefix: ImportPath, before_prefix: ImportPath, after: ImportPath) {
        self.redirects.push(Redirect { subject_prefix, before_prefix, after });
    }

    /// Rewrites `path` as seen from a parcel installed under
    /// `subject_install_name`, applying the most specific applicable
    /// redirect (longest subject-prefix match, then longest before-prefix
    /// match). Freezes this subject's redirect set on first call.
    pub fn apply(&mut self, subject_install_name: &str, path: &ImportPath) -> ImportPath {
        let subject_path = ImportPath::parse(subject_install_name)
            .unwrap_or_else(|| ImportPath::join(subject_install_name, &[]));

        let indices = self.frozen.entry(subject_install_name.to_owned()).or_insert_with(|| {
            self.redirects
                .iter()
                .enumerate()
                .filter(|(_, r)| subject_path.starts_with(&r.subject_prefix))
                .map(|(i, _)| i)
                .collect()
        });

        let mut best: Option<usize> = None;
        for &idx in indices.iter() {
            let r = &self.redirects[idx];
            if !path.starts_with(&r.before_prefix) {
                continue;
            }
            best = match best {
                None => Some(idx),
                Some(b_idx) => {
                    let b = &self.redirects[b_idx];
                    let candidate_key =
                        (r.subject_prefix.segments().len(), r.before_prefix.segments().len());
                    let best_key = (b.subject_prefix.segments().len(), b.before_prefix.segments().len());
                    if candidate_key > best_key {
                        Some(idx)
                    } else {
                        Some(b_idx)
                    }
                }
            };
        }

        match best {
            Some(idx) => {
                let r = &self.redirects[idx];
                path.rewrite_prefix(&r.before_prefix, &r.after)
            }
            None => path.clone(),
        }
    }
}
