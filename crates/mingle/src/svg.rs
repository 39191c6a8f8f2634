//! Standalone SVG output of a bundled graph.

use crate::bundler::Bundler;
use crate::model::Color;
use crate::path::{CurveStyle, PathOptions, build_path, fmt_num, svg_path_data};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SvgOptions {
    pub curve: CurveStyle,
    pub path: PathOptions,
    /// Defaults to the drawing's bounds plus `padding`.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: f64,
    /// Stroke for edges without a color.
    pub stroke: String,
    /// Multiplies every stroke width.
    pub scale: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            curve: CurveStyle::default(),
            path: PathOptions::default(),
            width: None,
            height: None,
            padding: 10.0,
            stroke: "gray".to_string(),
            scale: 1.0,
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders every leaf at the strength in `options.path.delta`.
pub fn render_svg(bundler: &Bundler, options: &SvgOptions) -> String {
    let arena = bundler.arena();
    let edges = bundler.unbundle_all(options.path.delta);

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in edges.iter().flat_map(|e| e.points()) {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if !min_x.is_finite() {
        (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
    }
    let pad = options.padding;
    let (vx, vy) = (min_x - pad, min_y - pad);
    let (vw, vh) = (max_x - min_x + 2.0 * pad, max_y - min_y + 2.0 * pad);
    let width = options.width.unwrap_or(vw);
    let height = options.height.unwrap_or(vh);

    let mut defs = String::new();
    let mut body = String::new();
    for (i, edge) in edges.iter().enumerate() {
        let leaf = &arena[edge.leaf.index()];
        let stroke = match leaf.color() {
            None => escape_xml(&options.stroke),
            Some(Color::Solid(c)) => escape_xml(c),
            Some(Color::Gradient([from, to])) => {
                let c = leaf.coords();
                let _ = write!(
                    defs,
                    r#"<linearGradient id="g{i}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}"><stop offset="0" stop-color="{from}"/><stop offset="0.4" stop-color="{from}"/><stop offset="0.6" stop-color="{to}"/><stop offset="1" stop-color="{to}"/></linearGradient>"#,
                    fmt_num(c.0[0]),
                    fmt_num(c.0[1]),
                    fmt_num(c.0[2]),
                    fmt_num(c.0[3]),
                    from = escape_xml(from),
                    to = escape_xml(to),
                );
                format!("url(#g{i})")
            }
        };
        let commands = build_path(arena, edge, options.curve, &options.path);
        let stroke_width = leaf.weight().max(1.0) * options.scale;
        let _ = write!(
            body,
            r#"<path data-id="{}" d="{}" fill="none" stroke="{}" stroke-width="{}""#,
            escape_xml(leaf.id()),
            svg_path_data(&commands),
            stroke,
            fmt_num(stroke_width),
        );
        if let Some(alpha) = leaf.alpha() {
            let _ = write!(body, r#" stroke-opacity="{}""#, fmt_num(alpha));
        }
        body.push_str("/>");
    }

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        fmt_num(width),
        fmt_num(height),
        fmt_num(vx),
        fmt_num(vy),
        fmt_num(vw),
        fmt_num(vh),
    );
    if !defs.is_empty() {
        out.push_str("<defs>");
        out.push_str(&defs);
        out.push_str("</defs>");
    }
    out.push_str(&body);
    out.push_str("</svg>\n");
    out
}
