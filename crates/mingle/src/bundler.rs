//! The MINGLE loop: greedy pairing over the proximity graph, then coalescing each group into one
//! new node, repeated until a round saves no ink.

use crate::error::{Error, Result};
use crate::expand::{self, ExpandedEdge, UnbundledEdge};
use crate::geom::{Coords, Point};
use crate::ink;
use crate::model::{Bundle, EdgeInput, EdgeNode, NodeIx, NodeKind};
use crate::options::BundlerOptions;
use crate::proximity::{self, RTreeIndex, SpatialIndex};
use mingle_graph::Graph;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, info, trace};

/// Summary of one MINGLE round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    /// 1-based.
    pub round: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub merges: usize,
    pub gain: f64,
    /// Ink of the graph after coalescing.
    pub total_ink: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MingleReport {
    pub rounds: Vec<RoundStats>,
    pub total_gain: f64,
}

/// Round-local group state.
#[derive(Debug)]
enum Group {
    Single(NodeIx),
    Merged(Bundle),
}

impl Group {
    fn members(&self) -> &[NodeIx] {
        match self {
            Self::Single(ix) => std::slice::from_ref(ix),
            Self::Merged(b) => &b.members,
        }
    }
}

/// Edge bundler over an arena of immutable nodes.
///
/// The graph holds the current top-level nodes (labels are arena indices); the arena keeps every
/// node ever created so merge trees stay reachable from their roots.
#[derive(Debug, Clone)]
pub struct Bundler {
    options: BundlerOptions,
    arena: Vec<EdgeNode>,
    graph: Graph<NodeIx>,
    ids: FxHashMap<String, NodeIx>,
    rounds: usize,
}

impl Default for Bundler {
    fn default() -> Self {
        Self {
            options: BundlerOptions::default(),
            arena: Vec::new(),
            graph: Graph::new(),
            ids: FxHashMap::default(),
            rounds: 0,
        }
    }
}

impl Bundler {
    pub fn new(options: BundlerOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    /// Loads edges and builds the proximity graph.
    pub fn from_edges<I>(options: BundlerOptions, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = EdgeInput>,
    {
        let mut bundler = Self::new(options)?;
        bundler.set_nodes(edges)?;
        bundler.build_nearest_neighbor_graph();
        Ok(bundler)
    }

    pub fn options(&self) -> &BundlerOptions {
        &self.options
    }

    /// Replaces all state with one leaf per input edge. Nothing is kept when an edge is invalid.
    pub fn set_nodes<I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = EdgeInput>,
    {
        let mut arena = Vec::new();
        let mut ids = FxHashMap::default();
        let mut graph = Graph::new();
        for edge in edges {
            let coords = edge.coords()?;
            let weight = edge.weight()?;
            let alpha = edge.alpha()?;
            if ids.contains_key(&edge.id) {
                return Err(Error::DuplicateNode { id: edge.id });
            }
            let ix = NodeIx::new(arena.len());
            ids.insert(edge.id.clone(), ix);
            graph.add_node(edge.id.clone(), ix);
            arena.push(
                EdgeNode::leaf(ix, edge.id, edge.name, coords, weight, edge.data.color)
                    .with_alpha(alpha),
            );
        }
        debug!(nodes = arena.len(), "loaded edges");
        self.arena = arena;
        self.ids = ids;
        self.graph = graph;
        self.rounds = 0;
        Ok(())
    }

    pub fn build_nearest_neighbor_graph(&mut self) {
        self.build_nearest_neighbor_graph_with::<RTreeIndex<String>>();
    }

    /// Connects every current node to its `k` nearest neighbors using the index `I`.
    pub fn build_nearest_neighbor_graph_with<I: SpatialIndex<String>>(&mut self) {
        let arena = &self.arena;
        proximity::build_proximity_graph::<I, _, _, _>(&mut self.graph, self.options.k, |ix| {
            arena[ix.index()].coords.as_array()
        });
    }

    pub fn graph(&self) -> &Graph<NodeIx> {
        &self.graph
    }

    /// Every node ever created, leaves first.
    pub fn arena(&self) -> &[EdgeNode] {
        &self.arena
    }

    pub fn node(&self, ix: NodeIx) -> &EdgeNode {
        &self.arena[ix.index()]
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeIx> {
        self.ids.get(id).copied()
    }

    /// Current top-level nodes in graph order.
    pub fn roots(&self) -> Vec<NodeIx> {
        self.graph.labels().copied().collect()
    }

    /// Original input edges.
    pub fn leaves(&self) -> impl Iterator<Item = NodeIx> + '_ {
        self.arena
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| NodeIx::new(i))
    }

    pub fn rounds_run(&self) -> usize {
        self.rounds
    }

    pub fn node_ink(&self, ix: NodeIx) -> f64 {
        ink::node_ink(&self.arena, ix)
    }

    /// Ink of everything currently drawn.
    pub fn total_ink(&self) -> f64 {
        self.graph
            .labels()
            .map(|&ix| ink::node_ink(&self.arena, ix))
            .sum()
    }

    /// Optimal bundle of `members`, which must be current top-level nodes.
    pub fn combine_members(&self, members: Vec<NodeIx>) -> Bundle {
        let weight = members.iter().map(|&ix| self.node(ix).weight).sum();
        let mut bundle = Bundle {
            members,
            m1: Point::ZERO,
            m2: Point::ZERO,
            ink: 0.0,
            weight,
        };
        ink::optimize_bundle(
            &self.arena,
            &mut bundle,
            self.options.angle_strength,
            self.options.tau,
        );
        bundle
    }

    /// The bundle two nodes would form.
    pub fn get_combined_node(&self, a: NodeIx, b: NodeIx) -> Bundle {
        if a == b {
            return self.combine_members(vec![a]);
        }
        self.combine_members(vec![a, b])
    }

    /// Runs rounds until one saves no ink, the graph has collapsed to one node, or `max_rounds`
    /// is reached.
    pub fn mingle(&mut self) -> MingleReport {
        let mut report = MingleReport::default();
        loop {
            if self.graph.node_count() <= 1 {
                break;
            }
            if self
                .options
                .max_rounds
                .is_some_and(|max| report.rounds.len() >= max)
            {
                break;
            }
            let stats = self.mingle_round();
            report.total_gain += stats.gain;
            report.rounds.push(stats);
            if !(stats.gain > 0.0) {
                break;
            }
        }
        info!(
            rounds = report.rounds.len(),
            total_gain = report.total_gain,
            nodes = self.graph.node_count(),
            "mingle finished"
        );
        report
    }

    /// One round: greedy pairing, then coalescing.
    pub fn mingle_round(&mut self) -> RoundStats {
        self.rounds += 1;
        let nodes_before = self.graph.node_count();
        let (groups, gain, merges) = self.assign_groups();
        self.coalesce(groups);

        let stats = RoundStats {
            round: self.rounds,
            nodes_before,
            nodes_after: self.graph.node_count(),
            merges,
            gain,
            total_ink: self.total_ink(),
        };
        debug!(
            round = stats.round,
            nodes_before = stats.nodes_before,
            nodes_after = stats.nodes_after,
            merges = stats.merges,
            gain = stats.gain,
            total_ink = stats.total_ink,
            "mingle round"
        );
        stats
    }

    fn assign_groups(&self) -> (Vec<Group>, f64, usize) {
        let mut group_of: Vec<Option<usize>> = vec![None; self.arena.len()];
        let mut groups: Vec<Group> = Vec::new();
        let mut gain = 0.0;
        let mut merges = 0usize;

        for (id, &n) in self.graph.nodes() {
            if group_of[n.index()].is_some() {
                continue;
            }
            let n_ink = self.node_ink(n);

            let mut neighbors: Vec<NodeIx> = self
                .graph
                .neighbors(id)
                .filter_map(|other| self.graph.node(other).copied())
                .collect();
            neighbors.sort_unstable();

            // Strict comparison over ascending indices: the lowest index wins ties.
            let mut best: Option<(f64, NodeIx, Bundle)> = None;
            for m in neighbors {
                let (partner, m_ink) = match group_of[m.index()].map(|g| &groups[g]) {
                    Some(Group::Merged(b)) => (b.members.as_slice(), b.ink),
                    Some(group @ Group::Single(_)) => (group.members(), self.node_ink(m)),
                    None => (std::slice::from_ref(&m), self.node_ink(m)),
                };
                let mut members = Vec::with_capacity(partner.len() + 1);
                members.push(n);
                members.extend_from_slice(partner);
                let combined = self.combine_members(members);
                let value = combined.ink - (n_ink + m_ink);
                if best.as_ref().is_none_or(|(v, _, _)| value < *v) {
                    best = Some((value, m, combined));
                }
            }

            match best {
                Some((value, m, combined)) if -value > 0.0 => {
                    let g = match group_of[m.index()] {
                        Some(g) => g,
                        None => {
                            groups.push(Group::Single(m));
                            group_of[m.index()] = Some(groups.len() - 1);
                            groups.len() - 1
                        }
                    };
                    trace!(
                        node = id,
                        with = self.node(m).id(),
                        saving = -value,
                        members = combined.members.len(),
                        "bundled"
                    );
                    group_of[n.index()] = Some(g);
                    groups[g] = Group::Merged(combined);
                    gain += -value;
                    merges += 1;
                }
                _ => {
                    groups.push(Group::Single(n));
                    group_of[n.index()] = Some(groups.len() - 1);
                }
            }
        }
        (groups, gain, merges)
    }

    /// Replaces every multi-member group with a new node that inherits the group's outside
    /// adjacencies. Groups are handled in creation order; new nodes are appended to the graph.
    fn coalesce(&mut self, groups: Vec<Group>) {
        for group in groups {
            let Group::Merged(bundle) = group else {
                continue;
            };
            let ix = self.push_coalesced(&bundle);
            let id = self.arena[ix.index()].id.clone();

            let mut outside: Vec<String> = Vec::new();
            for &member in &bundle.members {
                let member_id = &self.arena[member.index()].id;
                for other in self.graph.neighbors(member_id) {
                    let in_group = self
                        .graph
                        .node(other)
                        .is_some_and(|o| bundle.members.contains(o));
                    if !in_group && !outside.iter().any(|seen| seen == other) {
                        outside.push(other.to_string());
                    }
                }
            }
            for &member in &bundle.members {
                self.graph.remove_node(&self.arena[member.index()].id);
            }
            self.graph.add_node(id.clone(), ix);
            for other in &outside {
                self.graph.add_edge(&id, other, ());
            }
        }
    }

    fn push_coalesced(&mut self, bundle: &Bundle) -> NodeIx {
        let base = bundle
            .members
            .iter()
            .map(|&m| self.arena[m.index()].id.as_str())
            .collect::<Vec<_>>()
            .join("-");
        let id = self.unique_id(base);

        let mut node_array: Vec<NodeIx> = bundle
            .members
            .iter()
            .flat_map(|&m| self.arena[m.index()].node_array.iter().copied())
            .collect();
        if let Some(sort) = &self.options.sort {
            let arena = &self.arena;
            node_array.sort_by(|&a, &b| sort.compare(&arena[a.index()], &arena[b.index()]));
        }

        let ix = NodeIx::new(self.arena.len());
        self.ids.insert(id.clone(), ix);
        self.arena.push(EdgeNode::with_kind(
            id,
            None,
            Coords::new(bundle.m1, bundle.m2),
            bundle.weight,
            None,
            NodeKind::Coalesced {
                parents: bundle.members.clone(),
                parents_ink: bundle.ink,
            },
            node_array,
        ));
        ix
    }

    pub(crate) fn unique_id(&self, base: String) -> String {
        if !self.ids.contains_key(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}#{n}");
            if !self.ids.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn expand_edges(&self, ix: NodeIx) -> &[ExpandedEdge] {
        expand::expand_edges(&self.arena, ix)
    }

    pub fn unbundle_edges(&self, ix: NodeIx, delta: f64) -> Cow<'_, [UnbundledEdge]> {
        expand::unbundle_edges(&self.arena, ix, delta)
    }

    /// Polylines of every leaf, grouped by current top-level node in graph order.
    pub fn unbundle_all(&self, delta: f64) -> Vec<UnbundledEdge> {
        self.graph
            .labels()
            .flat_map(|&ix| self.unbundle_edges(ix, delta).into_owned())
            .collect()
    }

    pub(crate) fn restore(
        options: BundlerOptions,
        arena: Vec<EdgeNode>,
        graph: Graph<NodeIx>,
    ) -> Self {
        let ids = arena
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeIx::new(i)))
            .collect();
        Self {
            options,
            arena,
            graph,
            ids,
            rounds: 0,
        }
    }
}
