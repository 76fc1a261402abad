//! Staged (install-name -> parcel) bindings plus (install-name, dep-name) ->
//! install-name dependency mappings, validated and committed atomically.

use crate::{DepGraph, Parcel};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use yama_common::Dsignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    NameConflict { install_name: String },
    MissingMapping { install_name: String, dep_name: String },
    InvalidMapping { install_name: String, dep_name: String, reason: String },
    Cycle { nodes: Vec<String> },
}

impl InstallError {
    pub fn dsignal(&self) -> Dsignal {
        match self {
            Self::NameConflict { .. } => Dsignal::InstallNameConflict,
            Self::MissingMapping { .. } => Dsignal::MissingDepMapping,
            Self::InvalidMapping { .. } => Dsignal::InvalidDepMapping,
            Self::Cycle { .. } => Dsignal::DepGraphCycle,
        }
    }
}

pub struct InstallBatch<S> {
    installs: IndexMap<String, Rc<dyn Parcel<S>>>,
    dep_mappings: FxHashMap<(String, String), String>,
}

impl<S> Default for InstallBatch<S> {
    fn default() -> Self {
        Self { installs: IndexMap::new(), dep_mappings: FxHashMap::default() }
    }
}

impl<S> InstallBatch<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_parcel(&mut self, install_name: impl Into<String>, parcel: Rc<dyn Parcel<S>>) {
        self.installs.insert(install_name.into(), parcel);
    }

    pub fn add_mapping(
        &mut self,
        install_name: impl Into<String>,
        dep_name: impl Into<String>,
        target_install_name: impl Into<String>,
    ) {
        self.dep_mappings.insert((install_name.into(), dep_name.into()), target_install_name.into());
    }

    /// Runs the four validation checks in order, short-circuiting at the
    /// first check with any violation. Returns the committed install-names
    /// and the merged dep-mapping table on success.
    pub fn validate(
        &self,
        already_installed: &FxHashSet<String>,
        already_mapped: &FxHashMap<(String, String), String>,
    ) -> Result<(), Vec<InstallError>> {
        // 1. Install-name conflicts.
        let conflicts: Vec<InstallError> = self
            .installs
            .keys()
            .filter(|name| already_installed.contains(name.as_str()))
            .map(|name| InstallError::NameConflict { install_name: name.clone() })
            .collect();
        if !conflicts.is_empty() {
            return Err(conflicts);
        }

        // 2. Missing mappings: every dep-name declared by each parcel must be mapped.
        let mut missing = Vec::new();
        for (install_name, parcel) in &self.installs {
            for dep_name in parcel.deps() {
                let mapped = self.dep_mappings.contains_key(&(install_name.clone(), dep_name.clone()))
                    || already_mapped.contains_key(&(install_name.clone(), dep_name.clone()));
                if !mapped {
                    missing.push(InstallError::MissingMapping { install_name: install_name.clone(), dep_name });
                }
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        // 3. Invalid mappings.
        let mut invalid = Vec::new();
        for ((install_name, dep_name), target) in &self.dep_mappings {
            let Some(parcel) = self.installs.get(install_name) else {
                invalid.push(InstallError::InvalidMapping {
                    install_name: install_name.clone(),
                    dep_name: dep_name.clone(),
                    reason: "install-name not present in this batch".to_owned(),
                });
                continue;
            };
            if !parcel.deps().iter().any(|d| d == dep_name) {
                invalid.push(InstallError::InvalidMapping {
                    install_name: install_name.clone(),
                    dep_name: dep_name.clone(),
                    reason: "dep-name not declared by this parcel".to_owned(),
                });
                continue;
            }
            if !self.installs.contains_key(target) && !already_installed.contains(target.as_str()) {
                invalid.push(InstallError::InvalidMapping {
                    install_name: install_name.clone(),
                    dep_name: dep_name.clone(),
                    reason: "mapping target is not installed".to_owned(),
                });
            }
        }
        if !invalid.is_empty() {
            return Err(invalid);
        }

        // 4. No cycles across batch union already-installed.
        let mut graph = DepGraph::new();
        for ((from, _dep), to) in already_mapped.iter().chain(self.dep_mappings.iter()) {
            graph.add_edge(from, to);
        }
        if let Some(nodes) = graph.find_cycle() {
            return Err(vec![InstallError::Cycle { nodes }]);
        }

        Ok(())
    }

    pub fn install_names(&self) -> impl Iterator<Item = &str> {
        self.installs.keys().map(String::as_str)
    }

    pub fn dep_mappings(&self) -> &FxHashMap<(String, String), String> {
        &self.dep_mappings
    }

    pub fn into_parts(self) -> (IndexMap<String, Rc<dyn Parcel<S>>>, FxHashMap<(String, String), String>) {
        (self.installs, self.dep_mappings)
    }
}

// Re-exported so callers don't need a direct rustc_hash dependency just to
// call `validate`.
pub use rustc_hash::FxHashSet;
