//! Input records and the merge-tree arena.
//!
//! Every node in the arena is one edge segment. Leaves come straight from input; coalesced nodes
//! are created once per merge and point back at the nodes they replaced. Nodes are never changed
//! after creation, so their memoized values (ink, expanded paths, unbundled paths) never go stale.

use crate::error::{Error, Result};
use crate::expand::{ExpandedEdge, UnbundledEdge};
use crate::geom::{Coords, Point};
use mingle_graph::Flags;
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::OnceCell;

/// Index of a node in the bundler's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIx(pub(crate) u32);

impl NodeIx {
    pub(crate) fn new(ix: usize) -> Self {
        Self(u32::try_from(ix).expect("arena exceeds u32::MAX nodes"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Flags for NodeIx {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Solid(String),
    Gradient([String; 2]),
}

impl Color {
    /// Color at the start of the edge.
    pub fn start(&self) -> &str {
        match self {
            Self::Solid(c) => c,
            Self::Gradient([from, _]) => from,
        }
    }
}

/// One input edge: `{ id, name?, data: { coords: [x0, y0, x1, y1], weight?, color?, alpha? } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub data: EdgeData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(default)]
    pub coords: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Stroke opacity in `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl EdgeInput {
    pub fn new(id: impl Into<String>, coords: [f64; 4]) -> Self {
        Self {
            id: id.into(),
            name: None,
            data: EdgeData {
                coords: Some(coords.to_vec()),
                weight: None,
                color: None,
                alpha: None,
            },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.data.weight = Some(weight);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.data.color = Some(color);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.data.alpha = Some(alpha);
        self
    }

    /// Checked endpoints: exactly four finite numbers.
    pub fn coords(&self) -> Result<Coords> {
        let Some(raw) = self.data.coords.as_deref() else {
            return Err(Error::invalid_input(&self.id, "missing coords"));
        };
        let Ok(arr) = <[f64; 4]>::try_from(raw) else {
            return Err(Error::invalid_input(
                &self.id,
                format!("coords must have 4 numbers, got {}", raw.len()),
            ));
        };
        if arr.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_input(&self.id, "coords must be finite"));
        }
        Ok(Coords(arr))
    }

    /// Checked weight, defaulting to 1.
    pub fn weight(&self) -> Result<f64> {
        match self.data.weight {
            None => Ok(1.0),
            Some(w) if w.is_finite() && w >= 0.0 => Ok(w),
            Some(w) => Err(Error::invalid_input(
                &self.id,
                format!("weight must be a non-negative number, got {w}"),
            )),
        }
    }

    pub fn alpha(&self) -> Result<Option<f64>> {
        check_alpha(&self.id, self.data.alpha)
    }
}

pub(crate) fn check_alpha(id: &str, alpha: Option<f64>) -> Result<Option<f64>> {
    match alpha {
        Some(a) if !(0.0..=1.0).contains(&a) => Err(Error::invalid_input(
            id,
            format!("alpha must be within 0..=1, got {a}"),
        )),
        other => Ok(other),
    }
}

/// Parses a JSON array of edge records.
pub fn parse_edges(json: &str) -> Result<Vec<EdgeInput>> {
    Ok(serde_json::from_str(json)?)
}

/// Accepts string or integer ids.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf,
    Coalesced {
        parents: Vec<NodeIx>,
        /// Ink of the bundle this node was created from.
        parents_ink: f64,
    },
}

#[derive(Debug, Clone)]
pub struct EdgeNode {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) coords: Coords,
    pub(crate) weight: f64,
    pub(crate) color: Option<Color>,
    pub(crate) alpha: Option<f64>,
    pub(crate) kind: NodeKind,
    /// Leaves under this node in stacking order; a leaf lists only itself.
    pub(crate) node_array: Vec<NodeIx>,

    pub(crate) ink: OnceCell<f64>,
    pub(crate) branch_ink: OnceCell<f64>,
    pub(crate) expanded: OnceCell<Vec<ExpandedEdge>>,
    pub(crate) unbundled: [OnceCell<Vec<UnbundledEdge>>; 2],
}

impl EdgeNode {
    pub(crate) fn leaf(
        ix: NodeIx,
        id: String,
        name: Option<String>,
        coords: Coords,
        weight: f64,
        color: Option<Color>,
    ) -> Self {
        Self::with_kind(id, name, coords, weight, color, NodeKind::Leaf, vec![ix])
    }

    pub(crate) fn with_kind(
        id: String,
        name: Option<String>,
        coords: Coords,
        weight: f64,
        color: Option<Color>,
        kind: NodeKind,
        node_array: Vec<NodeIx>,
    ) -> Self {
        Self {
            id,
            name,
            coords,
            weight,
            color,
            alpha: None,
            kind,
            node_array,
            ink: OnceCell::new(),
            branch_ink: OnceCell::new(),
            expanded: OnceCell::new(),
            unbundled: [OnceCell::new(), OnceCell::new()],
        }
    }

    pub(crate) fn with_alpha(mut self, alpha: Option<f64>) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn parents(&self) -> &[NodeIx] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Coalesced { parents, .. } => parents,
        }
    }

    pub fn node_array(&self) -> &[NodeIx] {
        &self.node_array
    }

    /// Compromise points of a coalesced node (its own endpoints); `None` for leaves.
    pub fn compromise_points(&self) -> Option<(Point, Point)> {
        match self.kind {
            NodeKind::Leaf => None,
            NodeKind::Coalesced { .. } => Some((self.coords.start(), self.coords.end())),
        }
    }
}

/// A candidate merge: members routed through `m1` and `m2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub members: Vec<NodeIx>,
    pub m1: Point,
    pub m2: Point,
    /// Ink of the members routed through `m1`/`m2`, including the trunk `m1 -> m2`.
    pub ink: f64,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_ids_may_be_numbers() {
        let edges = parse_edges(
            r#"[{"id": 7, "data": {"coords": [0, 0, 1, 1]}},
                {"id": "x", "name": "X", "data": {"coords": [0, 0, 2, 2], "weight": 3}}]"#,
        )
        .unwrap();
        assert_eq!(edges[0].id, "7");
        assert_eq!(edges[1].name.as_deref(), Some("X"));
        assert_eq!(edges[1].weight().unwrap(), 3.0);
        assert_eq!(edges[0].weight().unwrap(), 1.0);
    }

    #[test]
    fn colors_are_solid_or_gradient() {
        let edges = parse_edges(
            r##"[{"id": "a", "data": {"coords": [0, 0, 1, 1], "color": "#f00"}},
                 {"id": "b", "data": {"coords": [0, 0, 1, 1], "color": ["#f00", "#00f"]}}]"##,
        )
        .unwrap();
        assert_eq!(edges[0].data.color, Some(Color::Solid("#f00".into())));
        assert_eq!(edges[1].data.color.as_ref().map(Color::start), Some("#f00"));
    }

    #[test]
    fn malformed_coords_are_rejected() {
        let missing = EdgeInput {
            id: "m".into(),
            name: None,
            data: EdgeData::default(),
        };
        assert!(matches!(missing.coords(), Err(Error::InvalidInput { .. })));

        let mut short = EdgeInput::new("s", [0.0; 4]);
        short.data.coords = Some(vec![0.0, 1.0, 2.0]);
        assert!(matches!(short.coords(), Err(Error::InvalidInput { .. })));

        let nan = EdgeInput::new("n", [0.0, f64::NAN, 1.0, 1.0]);
        assert!(matches!(nan.coords(), Err(Error::InvalidInput { .. })));

        let heavy = EdgeInput::new("w", [0.0; 4]).with_weight(-1.0);
        assert!(matches!(heavy.weight(), Err(Error::InvalidInput { .. })));

        let faint = EdgeInput::new("a", [0.0; 4]).with_alpha(1.5);
        assert!(matches!(faint.alpha(), Err(Error::InvalidInput { .. })));
        let nan = EdgeInput::new("a", [0.0; 4]).with_alpha(f64::NAN);
        assert!(matches!(nan.alpha(), Err(Error::InvalidInput { .. })));
        assert_eq!(EdgeInput::new("a", [0.0; 4]).with_alpha(0.25).alpha().unwrap(), Some(0.25));
    }
}
