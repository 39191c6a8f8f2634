//! Internal storage entries for [`Graph`](super::Graph).

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

/// Neighbor id -> edge slot, in insertion order.
pub(in crate::graph) type Adjacency = IndexMap<String, usize, FxBuildHasher>;

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry<N> {
    pub(in crate::graph) id: String,
    pub(in crate::graph) label: N,
    pub(in crate::graph) adjacencies: Adjacency,
    /// Depth assigned by the last `compute_levels` call, `None` when unreached.
    pub(in crate::graph) depth: Option<usize>,
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry<E> {
    pub(in crate::graph) a: String,
    pub(in crate::graph) b: String,
    pub(in crate::graph) data: E,
}
