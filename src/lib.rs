//! Interactive route globe: an orthographic 3D globe and a Mercator 2D map
//! showing a network of nodes and the directed routes between them.
//!
//! The [`engine::GlobeEngine`] holds all projection, camera and animation
//! state and is independent of any renderer; [`visualization::GlobePlugin`]
//! hosts it in a Bevy window.

pub mod camera;
pub mod core;
pub mod data;
pub mod engine;
pub mod network;
pub mod render;
pub mod visualization;
