//! Serialized form of a bundled graph: `{ nodes, edges }` with merge trees nested under
//! `data.parents`.
//!
//! Building and restoring records walks the merge trees with explicit stacks. Parsing text still
//! goes through serde_json, which stops at 128 nested JSON values; every tree level nests three
//! of them (record, `data`, `parents`), so [`Bundler::from_json_str`] accepts trees up to about 40
//! levels deep. Deeper trees can be restored from a [`BundlerJson`] value directly.

use crate::bundler::Bundler;
use crate::error::{Error, Result};
use crate::geom::Coords;
use crate::ink;
use crate::model::{Color, EdgeNode, NodeIx, NodeKind, check_alpha, deserialize_id};
use crate::options::BundlerOptions;
use mingle_graph::{Graph, GraphJson};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub type BundlerJson = GraphJson<NodeRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data: NodeRecordData,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecordData {
    pub coords: Coords,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<NodeRecord>,
    /// Leaf ids in stacking order; only present on coalesced nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_array: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents_ink: Option<f64>,
}

impl Bundler {
    pub fn to_json(&self) -> BundlerJson {
        self.graph().to_json_with(|_, &ix| self.node_record(ix))
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let json = self.to_json();
        Ok(if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        })
    }

    /// Record of `root` with its whole merge tree, built leaves first.
    fn node_record(&self, root: NodeIx) -> NodeRecord {
        let mut stack = vec![(root, false)];
        let mut done: Vec<NodeRecord> = Vec::new();
        while let Some((ix, parents_done)) = stack.pop() {
            let node = self.node(ix);
            if !parents_done && !node.is_leaf() {
                stack.push((ix, true));
                stack.extend(node.parents().iter().rev().map(|&p| (p, false)));
                continue;
            }
            // The records of this node's parents are the last ones finished, in order.
            let parents = done.split_off(done.len() - node.parents().len());
            done.push(self.record_of(node, parents));
        }
        done.pop().expect("root record")
    }

    fn record_of(&self, node: &EdgeNode, parents: Vec<NodeRecord>) -> NodeRecord {
        let (node_array, parents_ink) = match node.kind() {
            NodeKind::Leaf => (Vec::new(), None),
            NodeKind::Coalesced { parents_ink, .. } => (
                node.node_array()
                    .iter()
                    .map(|&leaf| self.node(leaf).id().to_string())
                    .collect(),
                Some(*parents_ink),
            ),
        };
        NodeRecord {
            id: node.id().to_string(),
            name: node.name().map(str::to_string),
            data: NodeRecordData {
                coords: node.coords(),
                weight: node.weight(),
                color: node.color().cloned(),
                alpha: node.alpha(),
                parents,
                node_array,
                parents_ink,
            },
        }
    }

    /// Rebuilds a bundler from [`Bundler::to_json`] output. The merge trees come back intact, so
    /// expansion and unbundling work without re-running MINGLE.
    pub fn from_json(json: BundlerJson, options: BundlerOptions) -> Result<Self> {
        options.validate()?;
        let mut restorer = Restorer::default();
        let mut top = Vec::with_capacity(json.nodes.len());
        for record in json.nodes {
            let id = record.id.clone();
            top.push((id, restorer.restore(record)?));
        }
        let graph = Graph::from_json_with(
            GraphJson {
                nodes: top,
                edges: json.edges,
            },
            |(id, ix)| (id, ix),
        )?;
        Ok(Bundler::restore(options, restorer.arena, graph))
    }

    pub fn from_json_str(json: &str, options: BundlerOptions) -> Result<Self> {
        Self::from_json(serde_json::from_str(json)?, options)
    }
}

#[derive(Default)]
struct Restorer {
    arena: Vec<EdgeNode>,
    ids: FxHashMap<String, NodeIx>,
}

enum Step {
    Enter(NodeRecord),
    /// Parents already taken out of the record and restored.
    Exit(NodeRecord, usize),
}

impl Restorer {
    /// Restores `root` and its merge tree, parents before the nodes they were merged into.
    fn restore(&mut self, root: NodeRecord) -> Result<NodeIx> {
        let mut steps = vec![Step::Enter(root)];
        let mut done: Vec<NodeIx> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(mut record) => {
                    if self.ids.contains_key(&record.id) {
                        return Err(Error::DuplicateNode { id: record.id });
                    }
                    let parents = std::mem::take(&mut record.data.parents);
                    steps.push(Step::Exit(record, parents.len()));
                    steps.extend(parents.into_iter().rev().map(Step::Enter));
                }
                Step::Exit(record, count) => {
                    let parents = done.split_off(done.len() - count);
                    done.push(self.push_node(record, parents)?);
                }
            }
        }
        Ok(done.pop().expect("root node"))
    }

    fn push_node(&mut self, record: NodeRecord, parents: Vec<NodeIx>) -> Result<NodeIx> {
        if self.ids.contains_key(&record.id) {
            return Err(Error::DuplicateNode { id: record.id });
        }
        let data = record.data;
        if data.coords.0.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_input(&record.id, "coords must be finite"));
        }
        let alpha = check_alpha(&record.id, data.alpha)?;

        let ix = NodeIx::new(self.arena.len());
        if parents.is_empty() {
            self.ids.insert(record.id.clone(), ix);
            self.arena.push(
                EdgeNode::leaf(
                    ix,
                    record.id,
                    record.name,
                    data.coords,
                    data.weight,
                    data.color,
                )
                .with_alpha(alpha),
            );
            return Ok(ix);
        }

        let node_array = if data.node_array.is_empty() {
            parents
                .iter()
                .flat_map(|&p| self.arena[p.index()].node_array.iter().copied())
                .collect()
        } else {
            data.node_array
                .iter()
                .map(|leaf| self.leaf_ix(leaf))
                .collect::<Result<Vec<_>>>()?
        };
        let parents_ink = data.parents_ink.unwrap_or_else(|| {
            ink::bundle_ink(
                &self.arena,
                &parents,
                data.coords.start(),
                data.coords.end(),
            )
        });

        self.ids.insert(record.id.clone(), ix);
        self.arena.push(
            EdgeNode::with_kind(
                record.id,
                record.name,
                data.coords,
                data.weight,
                data.color,
                NodeKind::Coalesced {
                    parents,
                    parents_ink,
                },
                node_array,
            )
            .with_alpha(alpha),
        );
        Ok(ix)
    }

    fn leaf_ix(&self, id: &str) -> Result<NodeIx> {
        self.ids
            .get(id)
            .copied()
            .filter(|ix| self.arena[ix.index()].is_leaf())
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }
}
