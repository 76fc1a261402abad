//! The dependency graph whose nodes are install-names and whose edges are
//! dep-mappings. Cycle detection uses iterative DFS over unprocessed nodes
//! with a visited stack; an island set short-circuits re-exploration of
//! subgraphs already proven acyclic.

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Default)]
pub struct DepGraph {
    edges: FxHashMap<String, Vec<String>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.entry(from.to_owned()).or_default().push(to.to_owned());
    }

    /// Returns the cycle as a slice of node names (first occurrence to the
    /// back-edge) if one exists, `None` if the graph is acyclic.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut island: FxHashSet<String> = FxHashSet::default();
        let mut all_nodes: FxHashSet<String> = FxHashSet::default();
        for (from, tos) in &self.edges {
            all_nodes.insert(from.clone());
            all_nodes.extend(tos.iter().cloned());
        }

        for start in &all_nodes {
            if island.contains(start) {
                continue;
            }
            if let Some(cycle) = self.dfs_from(start, &mut island) {
                return Some(cycle);
            }
        }
        None
    }

    fn dfs_from(&self, start: &str, island: &mut FxHashSet<String>) -> Option<Vec<String>> {
        // (node, next child index to visit)
        let mut stack: Vec<(String, usize)> = vec![(start.to_owned(), 0)];
        let mut on_stack: FxHashSet<String> = FxHashSet::default();
        on_stack.insert(start.to_owned());

        while let Some((node, child_idx)) = stack.last().cloned() {
            let children = self.edges.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            if child_idx < children.len() {
                stack.last_mut().unwrap().1 += 1;
                let child = &children[child_idx];
                if on_stack.contains(child) {
                    // Found a back-edge: slice from the first occurrence of
                    // `child` on the stack to here.
                    let pos = stack.iter().position(|(n, _)| n == child).unwrap();
                    let mut cycle: Vec<String> = stack[pos..].iter().map(|(n, _)| n.clone()).collect();
                    cycle.push(child.clone());
                    return Some(cycle);
                }
                if !island.contains(child) {
                    on_stack.insert(child.clone());
                    stack.push((child.clone(), 0));
                }
            } else {
                on_stack.remove(&node);
                island.insert(node.clone());
                stack.pop();
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acyclic_graph_reports_no_cycle() {
        let mut g = DepGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "c");
        assert!(g.find_cycle().is_none());
    }

    #[test]
    fn direct_cycle_detected() {
        let mut g = DepGraph::new();
        g.add_edge("a", "x");
        g.add_edge("b", "y");
        g.add_edge("x", "b");
        g.add_edge("y", "a");
        let cycle = g.find_cycle().expect("expected a cycle");
        assert!(cycle.len() >= 2);
    }

    #[test]
    fn self_cycle_detected() {
        let mut g = DepGraph::new();
        g.add_edge("a", "a");
        assert!(g.find_cycle().is_some());
    }
}
