//! Serializable graph model.
//!
//! Node records own their id so callers can pick their own node shape via
//! [`Graph::to_json_with`] / [`Graph::from_json_with`]; [`NodeJson`] is the default shape.

use super::Graph;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>, E: Deserialize<'de> + Default"))]
pub struct GraphJson<R, E = ()> {
    pub nodes: Vec<R>,
    pub edges: Vec<EdgeJson<E>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeJson<N> {
    pub id: String,
    pub data: N,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "E: Deserialize<'de> + Default")
)]
pub struct EdgeJson<E> {
    pub node_from: String,
    pub node_to: String,
    #[serde(default)]
    pub data: E,
}

impl<N, E> Graph<N, E> {
    /// Serializes nodes in insertion order and every edge once.
    pub fn to_json_with<R, F>(&self, mut node: F) -> GraphJson<R, E>
    where
        E: Clone,
        F: FnMut(&str, &N) -> R,
    {
        GraphJson {
            nodes: self.nodes().map(|(id, label)| node(id, label)).collect(),
            edges: self
                .edges()
                .map(|e| EdgeJson {
                    node_from: e.node_from.to_string(),
                    node_to: e.node_to.to_string(),
                    data: e.data.clone(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> GraphJson<NodeJson<N>, E>
    where
        N: Clone,
        E: Clone,
    {
        self.to_json_with(|id, label| NodeJson {
            id: id.to_string(),
            data: label.clone(),
        })
    }

    /// Rebuilds a graph; `node` splits each record into its id and label.
    pub fn from_json_with<R, F>(json: GraphJson<R, E>, mut node: F) -> Result<Self>
    where
        F: FnMut(R) -> (String, N),
    {
        let mut g = Self::new();
        for record in json.nodes {
            let (id, label) = node(record);
            if g.has_node(&id) {
                return Err(Error::DuplicateNode { id });
            }
            g.add_node(id, label);
        }
        for edge in json.edges {
            for id in [&edge.node_from, &edge.node_to] {
                if !g.has_node(id) {
                    return Err(Error::UnknownNode { id: id.clone() });
                }
            }
            g.add_edge(&edge.node_from, &edge.node_to, edge.data);
        }
        Ok(g)
    }

    pub fn from_json(json: GraphJson<NodeJson<N>, E>) -> Result<Self> {
        Self::from_json_with(json, |n| (n.id, n.data))
    }
}
