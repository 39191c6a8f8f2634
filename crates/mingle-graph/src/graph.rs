//! Undirected graph container.
//!
//! Nodes are keyed by string id and kept in insertion order. Each node owns an ordered adjacency
//! map (neighbor id -> edge slot), so an edge is stored once in the edge arena and referenced from
//! both endpoints. Removing a node tombstones its slot to keep iteration order stable; slots are
//! compacted lazily once tombstones dominate.

use rustc_hash::FxBuildHasher;

mod entries;
mod json;
mod traverse;

use entries::{Adjacency, EdgeEntry, NodeEntry};
pub use json::{EdgeJson, GraphJson, NodeJson};
pub use traverse::Flags;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

const COMPACT_MIN_DEAD: usize = 64;

/// An edge seen from one of its endpoints.
///
/// `node_from` is always the node the edge was reached from, whichever endpoint the edge was
/// created with.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a, E> {
    pub node_from: &'a str,
    pub node_to: &'a str,
    pub data: &'a E,
}

#[derive(Debug, Clone)]
pub struct Graph<N, E = ()> {
    nodes: Vec<Option<NodeEntry<N>>>,
    node_index: HashMap<String, usize>,

    edges: Vec<Option<EdgeEntry<E>>>,
    free_edges: Vec<usize>,
    edge_count: usize,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            free_edges: Vec::new(),
            edge_count: 0,
        }
    }

    fn slot(&self, ix: usize) -> &NodeEntry<N> {
        self.nodes[ix]
            .as_ref()
            .expect("node index should only point at live slots")
    }

    fn slot_mut(&mut self, ix: usize) -> &mut NodeEntry<N> {
        self.nodes[ix]
            .as_mut()
            .expect("node index should only point at live slots")
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    fn entry(&self, id: &str) -> Option<&NodeEntry<N>> {
        self.index_of(id).map(|ix| self.slot(ix))
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut NodeEntry<N>> {
        let ix = self.index_of(id)?;
        Some(self.slot_mut(ix))
    }

    fn live_entries(&self) -> impl Iterator<Item = &NodeEntry<N>> {
        self.nodes.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.free_edges.clear();
        self.edge_count = 0;
    }

    pub fn node_count(&self) -> usize {
        self.node_index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.node_index.is_empty()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Adds a node, or returns the existing node's label when `id` is already present.
    pub fn add_node(&mut self, id: impl Into<String>, label: N) -> &mut N {
        let id = id.into();
        let ix = match self.node_index.get(&id) {
            Some(&ix) => ix,
            None => {
                let ix = self.nodes.len();
                self.nodes.push(Some(NodeEntry {
                    id: id.clone(),
                    label,
                    adjacencies: Adjacency::default(),
                    depth: None,
                }));
                self.node_index.insert(id, ix);
                ix
            }
        };
        &mut self.slot_mut(ix).label
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.entry(id).map(|e| &e.label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.entry_mut(id).map(|e| &mut e.label)
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &N)> {
        self.live_entries().map(|e| (e.id.as_str(), &e.label))
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.live_entries().map(|e| e.id.clone()).collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &N> {
        self.live_entries().map(|e| &e.label)
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for e in self.nodes.iter_mut().flatten() {
            f(&e.id, &mut e.label);
        }
    }

    /// First node (in insertion order) matching `pred`.
    pub fn find_node<F>(&self, mut pred: F) -> Option<&str>
    where
        F: FnMut(&str, &N) -> bool,
    {
        self.live_entries()
            .find(|e| pred(&e.id, &e.label))
            .map(|e| e.id.as_str())
    }

    /// Depth assigned by the last [`Graph::compute_levels`] call.
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.entry(id).and_then(|e| e.depth)
    }

    /// Connects `a` and `b`. Returns the existing edge data when they are already adjacent, and
    /// `None` when either endpoint is missing.
    pub fn add_edge(&mut self, a: &str, b: &str, data: E) -> Option<&mut E> {
        let a_ix = self.index_of(a)?;
        let b_ix = self.index_of(b)?;

        if let Some(&slot) = self.slot(a_ix).adjacencies.get(b) {
            return self.edges[slot].as_mut().map(|e| &mut e.data);
        }

        let entry = EdgeEntry {
            a: a.to_string(),
            b: b.to_string(),
            data,
        };
        let slot = match self.free_edges.pop() {
            Some(slot) => {
                self.edges[slot] = Some(entry);
                slot
            }
            None => {
                self.edges.push(Some(entry));
                self.edges.len() - 1
            }
        };
        self.slot_mut(a_ix).adjacencies.insert(b.to_string(), slot);
        if a_ix != b_ix {
            self.slot_mut(b_ix).adjacencies.insert(a.to_string(), slot);
        }
        self.edge_count += 1;
        self.edges[slot].as_mut().map(|e| &mut e.data)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.entry(a)
            .is_some_and(|e| e.adjacencies.contains_key(b))
    }

    /// Alias of [`Graph::has_edge`], named after the node-centric view.
    pub fn adjacent_to(&self, a: &str, b: &str) -> bool {
        self.has_edge(a, b)
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&E> {
        let slot = *self.entry(a)?.adjacencies.get(b)?;
        self.edges[slot].as_ref().map(|e| &e.data)
    }

    pub fn edge_mut(&mut self, a: &str, b: &str) -> Option<&mut E> {
        let slot = *self.entry(a)?.adjacencies.get(b)?;
        self.edges[slot].as_mut().map(|e| &mut e.data)
    }

    fn release_edge(&mut self, slot: usize) -> Option<E> {
        let entry = self.edges[slot].take()?;
        self.free_edges.push(slot);
        self.edge_count -= 1;
        Some(entry.data)
    }

    pub fn remove_edge(&mut self, a: &str, b: &str) -> Option<E> {
        let slot = self.entry_mut(a)?.adjacencies.shift_remove(b)?;
        if a != b {
            if let Some(other) = self.entry_mut(b) {
                other.adjacencies.shift_remove(a);
            }
        }
        self.release_edge(slot)
    }

    /// Removes a node together with all of its incident edges.
    pub fn remove_node(&mut self, id: &str) -> Option<N> {
        let ix = self.node_index.remove(id)?;
        let entry = self.nodes[ix].take()?;

        for (neighbor, slot) in entry.adjacencies {
            if neighbor != id {
                if let Some(other) = self.entry_mut(&neighbor) {
                    other.adjacencies.shift_remove(id);
                }
            }
            self.release_edge(slot);
        }

        self.maybe_compact();
        Some(entry.label)
    }

    fn maybe_compact(&mut self) {
        let live = self.node_index.len();
        let dead = self.nodes.len() - live;
        if dead < COMPACT_MIN_DEAD || dead <= live {
            return;
        }
        self.nodes.retain(Option::is_some);
        self.node_index.clear();
        for (ix, e) in self.nodes.iter().enumerate() {
            if let Some(e) = e {
                self.node_index.insert(e.id.clone(), ix);
            }
        }
    }

    /// Adjacent node ids in edge insertion order.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + use<'a, N, E> {
        self.entry(id)
            .into_iter()
            .flat_map(|e| e.adjacencies.keys().map(String::as_str))
    }

    pub fn degree(&self, id: &str) -> usize {
        self.entry(id).map_or(0, |e| e.adjacencies.len())
    }

    /// Every edge exactly once, oriented the way it was created.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_, E>> {
        self.edges.iter().flatten().map(|e| EdgeRef {
            node_from: e.a.as_str(),
            node_to: e.b.as_str(),
            data: &e.data,
        })
    }
}
