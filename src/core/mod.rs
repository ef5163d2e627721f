//! Core geometry and projection types
//!
//! Pure math with no ECS dependencies: coordinates, spherical geometry,
//! the two projection families, viewport baselines and configuration.

pub mod config;
pub mod coordinates;
pub mod error;
pub mod geo;
pub mod projection;
pub mod view_state;

pub use config::GlobeConfig;
pub use coordinates::GeoPoint;
pub use error::{FitError, GeoError};
pub use geo::{PathGeometry, ScreenBounds, angular_distance, bounds_in_projection, centroid, densify_great_circle};
pub use projection::{Projection, ProjectionMode, Rotation};
pub use view_state::{ScaleExtent, ViewBaseline, ViewStateStore, ViewportSize};
