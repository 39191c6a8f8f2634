//! Traversal helpers: flag-filtered iteration, breadth-first levels and depth-bounded descent.
//!
//! Levels are a property of the last [`Graph::compute_levels`] call. `each_level` and the helpers
//! built on it (`get_subnodes`, `get_parents`, `is_descendant_of`) only follow edges that go one
//! level deeper (or shallower, for parents), so they treat the breadth-first layering as a tree.

use super::{EdgeRef, Graph};
use std::collections::VecDeque;
use std::ops::ControlFlow;

/// Named boolean flags used by the filtered traversals.
///
/// A traversal filter is a list of flag names; elements reporting any of them as set are
/// skipped.
pub trait Flags {
    fn has_flag(&self, _name: &str) -> bool {
        false
    }
}

impl Flags for () {}

fn passes<T: Flags + ?Sized>(value: &T, filter: &[&str]) -> bool {
    !filter.iter().any(|name| value.has_flag(name))
}

impl<N, E> Graph<N, E> {
    /// Calls `action` for every node not rejected by `filter`, in insertion order.
    pub fn each_node<F>(&self, filter: &[&str], mut action: F)
    where
        N: Flags,
        F: FnMut(&str, &N),
    {
        for e in self.live_entries() {
            if passes(&e.label, filter) {
                action(&e.id, &e.label);
            }
        }
    }

    /// Alias of [`Graph::each_node`].
    pub fn each<F>(&self, filter: &[&str], action: F)
    where
        N: Flags,
        F: FnMut(&str, &N),
    {
        self.each_node(filter, action);
    }

    /// Calls `action` for every edge incident to `node`, with `node` as `node_from`.
    pub fn each_edge<F>(&self, node: &str, filter: &[&str], mut action: F)
    where
        E: Flags,
        F: FnMut(EdgeRef<'_, E>),
    {
        let Some(entry) = self.entry(node) else {
            return;
        };
        for (to, &slot) in &entry.adjacencies {
            let Some(edge) = self.edges[slot].as_ref() else {
                continue;
            };
            if passes(&edge.data, filter) {
                action(EdgeRef {
                    node_from: &entry.id,
                    node_to: to,
                    data: &edge.data,
                });
            }
        }
    }

    /// Breadth-first traversal from `root` storing each reached node's depth.
    ///
    /// Nodes rejected by `filter` are neither visited nor expanded, and every node not reached
    /// ends up without a depth. Returns `false` when `root` does not exist.
    pub fn compute_levels(&mut self, root: &str, start_depth: usize, filter: &[&str]) -> bool
    where
        N: Flags,
    {
        for e in self.nodes.iter_mut().flatten() {
            e.depth = None;
        }
        let Some(root_ix) = self.index_of(root) else {
            return false;
        };
        self.slot_mut(root_ix).depth = Some(start_depth);

        let mut queue: VecDeque<usize> = VecDeque::from([root_ix]);
        let mut next: Vec<usize> = Vec::new();
        while let Some(ix) = queue.pop_front() {
            let entry = self.slot(ix);
            let depth = entry.depth.unwrap_or(start_depth);
            next.clear();
            for to in entry.adjacencies.keys() {
                let Some(to_ix) = self.index_of(to) else {
                    continue;
                };
                let child = self.slot(to_ix);
                if child.depth.is_none() && passes(&child.label, filter) {
                    next.push(to_ix);
                }
            }
            for &to_ix in &next {
                let child = self.slot_mut(to_ix);
                if child.depth.is_none() {
                    child.depth = Some(depth + 1);
                    queue.push_back(to_ix);
                }
            }
        }
        true
    }

    /// Breadth-first traversal from `root`, passing each node's distance from the root.
    ///
    /// Unlike [`Graph::compute_levels`] this does not store anything on the graph.
    pub fn each_bfs<F>(&self, root: &str, filter: &[&str], mut action: F)
    where
        N: Flags,
        F: FnMut(&str, &N, usize),
    {
        let Some(root_ix) = self.index_of(root) else {
            return;
        };
        let mut seen = vec![false; self.nodes.len()];
        seen[root_ix] = true;
        let mut queue: VecDeque<(usize, usize)> = VecDeque::from([(root_ix, 0)]);
        while let Some((ix, depth)) = queue.pop_front() {
            let entry = self.slot(ix);
            action(&entry.id, &entry.label, depth);
            for to in entry.adjacencies.keys() {
                let Some(to_ix) = self.index_of(to) else {
                    continue;
                };
                if !seen[to_ix] && passes(&self.slot(to_ix).label, filter) {
                    seen[to_ix] = true;
                    queue.push_back((to_ix, depth + 1));
                }
            }
        }
    }

    /// Depth-first descent below `node` visiting nodes whose depth relative to `node` lies in
    /// `level_begin..=level_end` (`None` means unbounded).
    ///
    /// `action` receives the absolute depth and stops the whole walk by returning
    /// [`ControlFlow::Break`]. Descent only follows edges into strictly deeper nodes.
    pub fn each_level<'a, F>(
        &'a self,
        node: &str,
        level_begin: usize,
        level_end: Option<usize>,
        mut action: F,
    ) where
        F: FnMut(&'a str, &'a N, usize) -> ControlFlow<()>,
    {
        let Some(root_ix) = self.index_of(node) else {
            return;
        };
        let base = self.slot(root_ix).depth.unwrap_or(0);
        let lo = base.saturating_add(level_begin);
        let hi = level_end.map_or(usize::MAX, |end| base.saturating_add(end));

        let mut stack: Vec<(usize, usize)> = vec![(root_ix, base)];
        while let Some((ix, depth)) = stack.pop() {
            let entry = self.slot(ix);
            if depth >= lo && depth <= hi && action(&entry.id, &entry.label, depth).is_break() {
                return;
            }
            if depth >= hi {
                continue;
            }
            // Reverse so children come off the stack in adjacency order.
            for to in entry.adjacencies.keys().rev() {
                let Some(to_ix) = self.index_of(to) else {
                    continue;
                };
                if let Some(child_depth) = self.slot(to_ix).depth {
                    if child_depth > depth {
                        stack.push((to_ix, child_depth));
                    }
                }
            }
        }
    }

    /// Every node below `node` (including itself).
    pub fn each_subgraph<F>(&self, node: &str, mut action: F)
    where
        F: FnMut(&str, &N),
    {
        self.each_level(node, 0, None, |id, label, _| {
            action(id, label);
            ControlFlow::Continue(())
        });
    }

    /// Direct children of `node`.
    pub fn each_subnode<F>(&self, node: &str, mut action: F)
    where
        F: FnMut(&str, &N),
    {
        self.each_level(node, 1, Some(1), |id, label, _| {
            action(id, label);
            ControlFlow::Continue(())
        });
    }

    pub fn any_subnode<F>(&self, node: &str, mut cond: F) -> bool
    where
        F: FnMut(&str, &N) -> bool,
    {
        let mut found = false;
        self.each_level(node, 1, Some(1), |id, label, _| {
            if cond(id, label) {
                found = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        found
    }

    /// Nodes below `node` starting at relative depth `level`.
    pub fn get_subnodes(&self, node: &str, level: usize) -> Vec<&str> {
        self.get_subnodes_between(node, level, None)
    }

    pub fn get_subnodes_between(
        &self,
        node: &str,
        level_begin: usize,
        level_end: Option<usize>,
    ) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.each_level(node, level_begin, level_end, |id, _, _| {
            out.push(id);
            ControlFlow::Continue(())
        });
        out
    }

    /// Neighbors of `node` one or more levels closer to the root.
    pub fn get_parents(&self, node: &str) -> Vec<&str> {
        let Some(entry) = self.entry(node) else {
            return Vec::new();
        };
        let Some(depth) = entry.depth else {
            return Vec::new();
        };
        entry
            .adjacencies
            .keys()
            .filter(|to| self.depth(to).is_some_and(|d| d < depth))
            .map(String::as_str)
            .collect()
    }

    /// Whether `id` is reachable from `node` by repeatedly moving to parents.
    pub fn is_descendant_of(&self, node: &str, id: &str) -> bool {
        if !self.has_node(node) {
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack: Vec<&str> = vec![node];
        while let Some(current) = stack.pop() {
            if current == id {
                return true;
            }
            for parent in self.get_parents(current) {
                if let Some(ix) = self.index_of(parent) {
                    if !seen[ix] {
                        seen[ix] = true;
                        stack.push(parent);
                    }
                }
            }
        }
        false
    }
}
