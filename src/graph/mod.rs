//! Graph-level building blocks: the node trait, timestamped parameter
//! automation, and the shared effect processors.
//!
//! Everything the control surface does to a running sound goes through a
//! [`param::Param`] lane: control code writes future-dated curves, the render
//! pass evaluates them sample-accurately. Nodes themselves never observe the
//! control thread directly.

/// Modulated dual-tap chorus.
pub mod chorus;
/// Core trait shared by renderable nodes.
pub mod node;
/// Timestamped parameter automation lanes.
pub mod param;
/// Multi-tap feedback reverb.
pub mod reverb;

pub use node::{GraphNode, RenderCtx};
pub use param::Param;
