//! Error types for geographic input and camera fitting

use thiserror::Error;

/// Invalid geographic input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("invalid latitude: {0:?}")]
    InvalidLatitude(f64),
    #[error("invalid longitude: {0:?}")]
    InvalidLongitude(f64),
}

/// Reasons a zoom-to-fit computation could not produce a usable target.
///
/// These are recovered inside the engine and never reach the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("no points to frame")]
    EmptyPointSet,
    #[error("point set has no measurable extent")]
    DegenerateBounds,
    #[error("fit produced a non-finite camera parameter")]
    NonFinite,
}
