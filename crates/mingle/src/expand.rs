//! Merge-tree expansion into per-leaf polylines, and continuous unbundling.
//!
//! Expanding a node walks its parents down to the leaves. Each leaf's polyline runs from the leaf's
//! start, through the start-side compromise point of every ancestor (outermost last), along the
//! root's trunk and back out through the end-side points to the leaf's end. Every vertex remembers
//! the node that contributed it, which drives stacking at render time.

use crate::geom::Point;
use crate::model::{EdgeNode, NodeIx};
use std::borrow::Cow;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Node that contributed this vertex.
    pub node: NodeIx,
    pub pos: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedEdge {
    pub leaf: NodeIx,
    pub points: Vec<ControlPoint>,
}

/// A polyline vertex ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosItem {
    pub node: NodeIx,
    /// Fully bundled position.
    pub pos: Point,
    /// Position at the requested bundling strength.
    pub unbundled_pos: Point,
    /// Unit normal of the bundled polyline at this vertex; zero where the tangent vanishes.
    pub normal: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnbundledEdge {
    pub leaf: NodeIx,
    pub items: Vec<PosItem>,
}

impl UnbundledEdge {
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.items.iter().map(|item| item.unbundled_pos)
    }
}

/// Control polylines of every leaf under `ix`, memoized on the node.
pub fn expand_edges(arena: &[EdgeNode], ix: NodeIx) -> &[ExpandedEdge] {
    arena[ix.index()].expanded.get_or_init(|| expand(arena, ix))
}

fn expand(arena: &[EdgeNode], root: NodeIx) -> Vec<ExpandedEdge> {
    let mut out = Vec::new();
    let mut stack: Vec<(NodeIx, VecDeque<ControlPoint>)> = vec![(root, VecDeque::new())];
    while let Some((ix, mut path)) = stack.pop() {
        let node = &arena[ix.index()];
        let coords = node.coords;
        if path.is_empty() {
            path.push_back(ControlPoint {
                node: ix,
                pos: coords.midpoint(),
            });
        }
        path.push_front(ControlPoint {
            node: ix,
            pos: coords.start(),
        });
        path.push_back(ControlPoint {
            node: ix,
            pos: coords.end(),
        });

        let parents = node.parents();
        if parents.is_empty() {
            out.push(ExpandedEdge {
                leaf: ix,
                points: path.into(),
            });
            continue;
        }
        // Reversed so the first parent's leaves come out first.
        for &p in parents.iter().rev() {
            stack.push((p, path.clone()));
        }
    }
    out
}

/// Polylines of every leaf under `ix` at bundling strength `delta`.
///
/// `delta = 1` keeps the control points; `delta = 0` projects every interior point onto the
/// leaf's own chord. Results for exactly 0 and 1 are memoized on the node.
pub fn unbundle_edges(arena: &[EdgeNode], ix: NodeIx, delta: f64) -> Cow<'_, [UnbundledEdge]> {
    let slot = if delta == 0.0 {
        Some(0)
    } else if delta == 1.0 {
        Some(1)
    } else {
        None
    };
    let expanded = expand_edges(arena, ix);
    match slot {
        Some(slot) => Cow::Borrowed(
            arena[ix.index()].unbundled[slot]
                .get_or_init(|| unbundle(expanded, delta))
                .as_slice(),
        ),
        None => Cow::Owned(unbundle(expanded, delta)),
    }
}

fn unbundle(expanded: &[ExpandedEdge], delta: f64) -> Vec<UnbundledEdge> {
    expanded
        .iter()
        .map(|edge| UnbundledEdge {
            leaf: edge.leaf,
            items: unbundle_polyline(&edge.points, delta),
        })
        .collect()
}

fn unbundle_polyline(points: &[ControlPoint], delta: f64) -> Vec<PosItem> {
    let n = points.len();
    let Some(last) = n.checked_sub(1) else {
        return Vec::new();
    };
    let x0 = points[0].pos;
    let xk = points[last].pos;
    let chord = xk - x0;
    let chord2 = chord.dot(chord);

    points
        .iter()
        .enumerate()
        .map(|(i, cp)| {
            let tangent = match i {
                _ if n < 2 => Point::ZERO,
                0 => points[1].pos - points[0].pos,
                i if i == last => points[last].pos - points[last - 1].pos,
                i => points[i + 1].pos - points[i - 1].pos,
            };
            let unbundled_pos = if i == 0 || i == last {
                cp.pos
            } else {
                let c = if chord2 > 0.0 {
                    (cp.pos - x0).dot(chord) / chord2
                } else {
                    0.0
                };
                let projected = x0 + chord * c;
                projected.lerp(cp.pos, delta)
            };
            PosItem {
                node: cp.node,
                pos: cp.pos,
                unbundled_pos,
                normal: tangent.perp().normalized(),
            }
        })
        .collect()
}
