//! Camera: live projection state, gestures and zoom-to-fit transitions

pub mod easing;
pub mod interaction;
pub mod state;
pub mod transition;
pub mod zoom;

pub use interaction::{InteractionController, PointerRelease};
pub use state::{GlobeCamera, ProjectionState};
pub use transition::{CameraTransitions, FitGoal, FitOutcome, FitSignature, TransitionKind};
pub use zoom::ZoomTransform;
