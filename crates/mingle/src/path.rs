//! Backend-agnostic drawing commands for unbundled polylines.
//!
//! Three styles are provided: straight segments, quadratic joins and a two-cubic bezier through
//! the bundle trunk. The quadratic style also spreads the leaves of a bundle side by side along
//! the vertex normals so their strokes stack instead of overlapping.

use crate::expand::{PosItem, UnbundledEdge};
use crate::geom::Point;
use crate::model::{EdgeNode, NodeIx};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    Line,
    #[default]
    Quadratic,
    Bezier,
}

impl FromStr for CurveStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "quadratic" | "quad" => Ok(Self::Quadratic),
            "bezier" | "cubic" => Ok(Self::Bezier),
            other => Err(format!("unknown curve style `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathOptions {
    /// In `[0, 1]`: how much of each segment is given to the rounded joins.
    pub curviness: f64,
    /// Gap between stacked strokes, scaled by `delta`.
    pub margin: f64,
    /// Bundling strength the polylines were unbundled at.
    pub delta: f64,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            curviness: 0.0,
            margin: 0.0,
            delta: 1.0,
        }
    }
}

/// Offset of `pos` along `item.normal` that places `leaf` at its slot in the stacking order of
/// the node owning `item`.
///
/// The leaves before and after `leaf` (weight plus `margin` each) are balanced around the
/// bundle center. A leaf missing from the owner's order sorts past the end.
pub fn stack_offset(
    arena: &[EdgeNode],
    leaf: NodeIx,
    item: &PosItem,
    pos: Point,
    margin: f64,
    delta: f64,
) -> Point {
    let order = arena[item.node.index()].node_array();
    let index = order.iter().position(|&n| n == leaf).unwrap_or(usize::MAX);
    let (mut before, mut after) = (0.0, 0.0);
    for (k, &n) in order.iter().enumerate() {
        let len = arena[n.index()].weight() + margin;
        if k < index {
            before += len;
        } else if k > index {
            after += len;
        }
    }
    let shift = (before - (before + after) / 2.0) * delta.min(1.0);
    pos + item.normal * shift
}

pub fn line_path(edge: &UnbundledEdge) -> Vec<PathCommand> {
    edge.points()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 {
                PathCommand::MoveTo(p)
            } else {
                PathCommand::LineTo(p)
            }
        })
        .collect()
}

/// Straight runs joined by quadratic curves around each vertex, with stacking offsets.
pub fn quadratic_path(
    arena: &[EdgeNode],
    edge: &UnbundledEdge,
    options: &PathOptions,
) -> Vec<PathCommand> {
    let items = &edge.items;
    let n = items.len();
    let margin = options.margin * options.delta;
    let curviness = options.curviness;
    let mut out = Vec::with_capacity(n * 4);

    let mut quad_start: Option<Point> = None;
    let mut pos_start: Option<Point> = None;
    for j in 1..n {
        let item = &items[j];
        let pos0 = pos_start.unwrap_or(items[j - 1].unbundled_pos);
        let pos = stack_offset(
            arena,
            edge.leaf,
            item,
            item.unbundled_pos,
            margin,
            options.delta,
        );
        let mid = pos0.midpoint(pos);
        let pos1 = pos0.lerp(mid, if j == 1 { 0.0 } else { curviness });
        let pos2 = mid.lerp(pos, if j == n - 1 { 1.0 } else { 1.0 - curviness });
        if let Some(start) = quad_start {
            out.push(PathCommand::MoveTo(start));
            out.push(PathCommand::QuadTo {
                ctrl: pos0,
                to: pos1,
            });
        }
        out.push(PathCommand::MoveTo(pos1));
        out.push(PathCommand::LineTo(pos2));
        quad_start = Some(pos2);
        pos_start = Some(pos);
    }
    out
}

/// Two cubics meeting at the trunk midpoint; polylines of three points or fewer stay straight.
pub fn bezier_path(edge: &UnbundledEdge, options: &PathOptions) -> Vec<PathCommand> {
    let pts: Vec<Point> = edge.points().collect();
    let n = pts.len();
    let (Some(&start), Some(&end)) = (pts.first(), pts.last()) else {
        return Vec::new();
    };
    if n <= 3 {
        return vec![PathCommand::MoveTo(start), PathCommand::LineTo(end)];
    }

    let pct = options.curviness;
    let mid = (n - 1) / 2;
    let midpoint = pts[mid];
    let mut out = vec![PathCommand::MoveTo(start)];

    let (c1, c2) = (pts[1], pts[mid - 1]);
    out.push(PathCommand::CubicTo {
        ctrl1: c1,
        ctrl2: c2,
        to: midpoint.lerp(c2, 1.0 - pct),
    });
    let (c1, c2) = (pts[mid + 1], pts[n - 2]);
    if pct != 1.0 {
        out.push(PathCommand::LineTo(midpoint.lerp(c1, 1.0 - pct)));
    }
    out.push(PathCommand::CubicTo {
        ctrl1: c1,
        ctrl2: c2,
        to: end,
    });
    out
}

pub fn build_path(
    arena: &[EdgeNode],
    edge: &UnbundledEdge,
    style: CurveStyle,
    options: &PathOptions,
) -> Vec<PathCommand> {
    match style {
        CurveStyle::Line => line_path(edge),
        CurveStyle::Quadratic => quadratic_path(arena, edge, options),
        CurveStyle::Bezier => bezier_path(edge, options),
    }
}

/// Path number: at most three fractional digits, no `-0`.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 1000.0).round() / 1000.0;
    let s = r.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

/// SVG `d` attribute for `commands`.
pub fn svg_path_data(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    let pt = |d: &mut String, p: Point| {
        let _ = write!(d, "{},{}", fmt_num(p.x), fmt_num(p.y));
    };
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        match *cmd {
            PathCommand::MoveTo(p) => {
                d.push('M');
                pt(&mut d, p);
            }
            PathCommand::LineTo(p) => {
                d.push('L');
                pt(&mut d, p);
            }
            PathCommand::QuadTo { ctrl, to } => {
                d.push('Q');
                pt(&mut d, ctrl);
                d.push(' ');
                pt(&mut d, to);
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                d.push('C');
                pt(&mut d, ctrl1);
                d.push(' ');
                pt(&mut d, ctrl2);
                d.push(' ');
                pt(&mut d, to);
            }
        }
    }
    d
}
