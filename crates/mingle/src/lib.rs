//! MINGLE edge bundling.
//!
//! Edges with fixed endpoints are treated as points in 4-D endpoint space. Proximate edges are
//! merged greedily into bundles routed through two shared compromise points whenever that lowers
//! the total drawn length ("ink"), round after round, producing a merge tree per bundle. The tree
//! is then expanded into per-edge polylines that can be blended continuously between straight
//! chords (`delta = 0`) and fully bundled routes (`delta = 1`).
//!
//! ```no_run
//! use mingle::{Bundler, BundlerOptions, EdgeInput};
//!
//! let edges = vec![
//!     EdgeInput::new("a", [0.0, 0.0, 10.0, 0.0]),
//!     EdgeInput::new("b", [0.0, 1.0, 10.0, 1.0]),
//! ];
//! let mut bundler = Bundler::from_edges(BundlerOptions::default(), edges)?;
//! let report = bundler.mingle();
//! for edge in bundler.unbundle_all(0.8) {
//!     let points: Vec<_> = edge.points().collect();
//!     println!("{} {:?}", bundler.node(edge.leaf).id(), points);
//! }
//! # let _ = report;
//! # Ok::<(), mingle::Error>(())
//! ```

pub use mingle_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bundler;
pub mod error;
pub mod expand;
pub mod geom;
pub mod ink;
pub mod json;
pub mod model;
pub mod options;
pub mod path;
pub mod proximity;
pub mod svg;
pub mod util;

pub use bundler::{Bundler, MingleReport, RoundStats};
pub use error::{Error, Result};
pub use expand::{ControlPoint, ExpandedEdge, PosItem, UnbundledEdge};
pub use geom::{Coords, Point};
pub use json::{BundlerJson, NodeRecord, NodeRecordData};
pub use model::{Bundle, Color, EdgeData, EdgeInput, EdgeNode, NodeIx, NodeKind, parse_edges};
pub use options::{AngleProfile, BundlerOptions, NodeSort};
pub use path::{CurveStyle, PathCommand, PathOptions};
pub use proximity::{BruteForceIndex, RTreeIndex, SpatialIndex};
pub use svg::{SvgOptions, render_svg};
