//! Ink accounting and compromise-point optimization.
//!
//! "Ink" is the total drawn length of a set of edges. A bundle routes each member from its start
//! to `m1`, along the shared trunk `m1 -> m2`, and from `m2` to its end; members that are
//! themselves coalesced nodes carry the ink of their own sub-tree below them.

use crate::geom::Point;
use crate::model::{Bundle, EdgeNode, NodeIx, NodeKind};

/// The golden ratio.
pub const PHI: f64 = 1.618_033_988_749_895;

const RESPHI: f64 = 2.0 - PHI;

/// Initial bracket `(a, b, c)` of the compromise-point search over `x ∈ [0, 1]`.
pub const SEARCH_BRACKET: (f64, f64, f64) = (0.0, 1.0, 0.72);

/// The relative tolerance never shrinks below the bracket once the minimum sits near zero,
/// so the search is capped.
const MAX_SEARCH_STEPS: usize = 64;

/// Ink of a node on its own: a leaf's length, or for a coalesced node the routed length of its
/// whole sub-tree including its own trunk.
pub fn node_ink(arena: &[EdgeNode], ix: NodeIx) -> f64 {
    let node = &arena[ix.index()];
    *node.ink.get_or_init(|| match node.kind {
        NodeKind::Leaf => node.coords.length(),
        NodeKind::Coalesced { .. } => node.coords.length() + branch_ink(arena, ix),
    })
}

/// Ink below a node's own segment: zero for leaves, and for a coalesced node the edges fanning
/// out from its endpoints to each parent's endpoints, recursively.
pub fn branch_ink(arena: &[EdgeNode], ix: NodeIx) -> f64 {
    let node = &arena[ix.index()];
    if let Some(&v) = node.branch_ink.get() {
        return v;
    }

    let mut total = 0.0;
    let mut stack = vec![ix];
    while let Some(cur) = stack.pop() {
        let n = &arena[cur.index()];
        let NodeKind::Coalesced { parents, .. } = &n.kind else {
            continue;
        };
        let (start, end) = (n.coords.start(), n.coords.end());
        for &p in parents {
            let parent = &arena[p.index()];
            total += start.dist(parent.coords.start()) + end.dist(parent.coords.end());
            match parent.branch_ink.get() {
                Some(&v) => total += v,
                None => stack.push(p),
            }
        }
    }

    *node.branch_ink.get_or_init(|| total)
}

/// Ink of `members` routed through `m1`/`m2`, trunk included.
pub fn bundle_ink(arena: &[EdgeNode], members: &[NodeIx], m1: Point, m2: Point) -> f64 {
    let fan: f64 = members
        .iter()
        .map(|&ix| {
            let c = arena[ix.index()].coords;
            m1.dist(c.start()) + m2.dist(c.end()) + branch_ink(arena, ix)
        })
        .sum();
    fan + m1.dist(m2)
}

fn angle_between(u: Point, v: Point) -> f64 {
    let denom = u.norm() * v.norm();
    if !(denom > 0.0) || !denom.is_finite() {
        return 0.0;
    }
    (u.dot(v) / denom).clamp(-1.0, 1.0).acos()
}

/// Largest angle between a member's fan edge and the trunk, over both ends of every member.
pub fn max_turning_angle(arena: &[EdgeNode], members: &[NodeIx], m1: Point, m2: Point) -> f64 {
    let trunk = m1 - m2;
    let mut max = 0.0_f64;
    for &ix in members {
        let c = arena[ix.index()].coords;
        max = max.max(angle_between(c.start() - m1, trunk));
        max = max.max(angle_between(c.end() - m2, trunk * -1.0));
    }
    max
}

/// Mean start point and mean end point of `members`.
pub fn centroids(arena: &[EdgeNode], members: &[NodeIx]) -> (Point, Point) {
    if members.is_empty() {
        return (Point::ZERO, Point::ZERO);
    }
    let (mut top, mut bottom) = (Point::ZERO, Point::ZERO);
    for &ix in members {
        let c = arena[ix.index()].coords;
        top = top + c.start();
        bottom = bottom + c.end();
    }
    let n = members.len() as f64;
    (top * (1.0 / n), bottom * (1.0 / n))
}

/// Places the compromise points at `x / 2` and `1 - x / 2` along the centroid chord, stores them
/// and their ink on `bundle`, and returns the bend-penalized ink.
pub fn cost(
    arena: &[EdgeNode],
    bundle: &mut Bundle,
    (top, bottom): (Point, Point),
    x: f64,
    angle_strength: f64,
) -> f64 {
    let half = x / 2.0;
    bundle.m1 = top.lerp(bottom, half);
    bundle.m2 = top.lerp(bottom, 1.0 - half);
    bundle.ink = bundle_ink(arena, &bundle.members, bundle.m1, bundle.m2);
    let angle = max_turning_angle(arena, &bundle.members, bundle.m1, bundle.m2);
    bundle.ink * (1.0 + angle.sin() / angle_strength)
}

/// Golden-section search for a minimum of `f` bracketed by `a` and `c`, with interior point `b`.
///
/// Stops once `|c - a| < tau * (|b| + |x|)` and returns the bracket midpoint.
pub fn golden_section_search<F>(a: f64, b: f64, c: f64, tau: f64, mut f: F) -> f64
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b, mut c) = (a, b, c);
    let mut fb = f(b);
    for _ in 0..MAX_SEARCH_STEPS {
        let upper = c - b > b - a;
        let x = if upper {
            b + RESPHI * (c - b)
        } else {
            b - RESPHI * (b - a)
        };
        if (c - a).abs() < tau * (b.abs() + x.abs()) {
            break;
        }
        let fx = f(x);
        if fx < fb {
            if upper {
                a = b;
            } else {
                c = b;
            }
            b = x;
            fb = fx;
        } else if upper {
            c = x;
        } else {
            a = x;
        }
    }
    (c + a) / 2.0
}

/// Finds the compromise points of `bundle` and leaves them, and their ink, on it.
pub fn optimize_bundle(arena: &[EdgeNode], bundle: &mut Bundle, angle_strength: f64, tau: f64) {
    let ends = centroids(arena, &bundle.members);
    let (a, b, c) = SEARCH_BRACKET;
    let x = golden_section_search(a, b, c, tau, |x| {
        cost(arena, bundle, ends, x, angle_strength)
    });
    cost(arena, bundle, ends, x, angle_strength);
}
