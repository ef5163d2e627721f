//! Render pipeline: what to draw for the current projection

pub mod edges;
pub mod frame;

pub use edges::{EdgeKey, EdgeScene, EdgeSpec, EdgeSprite};
pub use frame::{Backdrop, NodeMarker, NodeRole, RenderFrame, Tooltip, hit_test};
