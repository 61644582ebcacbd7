#![forbid(unsafe_code)]

//! Automatic layout for BPMN process graphs.
//!
//! The pipeline turns a [`graph::ProcessGraph`] into diagram coordinates:
//!
//! 1. [`classify`] tags nodes as Join / Split / start / end from their flow degree.
//! 2. [`sequence`] orders nodes topologically, dropping backward flows to break cycles.
//! 3. [`grid`] assigns integer `(row, column)` cells, fanning split branches out symmetrically.
//! 4. [`coordinate`] maps cells to pixels.
//! 5. [`route`] computes a 2- or 3-point polyline per flow.
//!
//! Layout is deterministic: the same graph and config always produce the same output.

pub use bpmn_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod classify;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod grid;
pub mod index;
pub mod pipeline;
pub mod route;
pub mod sequence;

pub use classify::{Classification, Role, Roles, classify_graph};
pub use config::LayoutConfig;
pub use error::{LayoutError, Result};
pub use grid::{Grid, GridCell, PlacementRequest};
pub use pipeline::{FlowRoute, Layout, LayoutSummary, NodeLayout, compute_layout, layout};
