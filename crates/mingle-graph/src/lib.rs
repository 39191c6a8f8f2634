//! Graph container APIs used by `mingle`.
//!
//! The container is undirected: every edge is reachable from both endpoints, and traversal
//! helpers always present the edge from the point of view of the node being walked.
//!
//! This crate contains the core [`Graph`] container, breadth-first level bookkeeping used by the
//! hierarchical traversal helpers, and a serde-friendly [`GraphJson`] model.

pub mod error;
pub mod graph;

pub use error::{Error, Result};
pub use graph::{EdgeJson, EdgeRef, Flags, Graph, GraphJson, NodeJson};
