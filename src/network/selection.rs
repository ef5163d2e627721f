//! Origin/destination selection and the click state machine

use crate::network::NodeId;

/// The caller-owned selection as seen by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub origin: Option<NodeId>,
    pub destination: Option<NodeId>,
}

/// Logical selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    None,
    OriginOnly,
    Both,
    /// Destination without an origin. Only reachable through a caller writing
    /// the selection directly; treated like `None` for visibility.
    DestinationOnly,
}

impl Selection {
    pub fn new(origin: Option<NodeId>, destination: Option<NodeId>) -> Self {
        Self {
            origin,
            destination,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        match (&self.origin, &self.destination) {
            (None, None) => SelectionPhase::None,
            (Some(_), None) => SelectionPhase::OriginOnly,
            (Some(_), Some(_)) => SelectionPhase::Both,
            (None, Some(_)) => SelectionPhase::DestinationOnly,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.origin.is_none() && self.destination.is_none()
    }
}

/// The two outward hooks through which the engine changes the selection.
pub trait SelectionHandler {
    fn set_origin(&mut self, origin: Option<NodeId>);
    fn set_destination(&mut self, destination: Option<NodeId>);
}

impl SelectionHandler for Selection {
    fn set_origin(&mut self, origin: Option<NodeId>) {
        self.origin = origin;
    }

    fn set_destination(&mut self, destination: Option<NodeId>) {
        self.destination = destination;
    }
}

/// Apply a click on `clicked` to the current selection through `handler`.
///
/// - nothing selected: `clicked` becomes the origin
/// - clicking the current origin: both are cleared
/// - otherwise, with an origin set: `clicked` becomes the destination
pub fn apply_node_click(current: &Selection, clicked: &NodeId, handler: &mut dyn SelectionHandler) {
    match &current.origin {
        None => {
            handler.set_origin(Some(clicked.clone()));
            handler.set_destination(None);
        }
        Some(origin) if origin == clicked => clear(handler),
        Some(_) => handler.set_destination(Some(clicked.clone())),
    }
}

/// A click on the map background clears the selection.
pub fn apply_background_click(handler: &mut dyn SelectionHandler) {
    clear(handler);
}

fn clear(handler: &mut dyn SelectionHandler) {
    handler.set_origin(None);
    handler.set_destination(None);
}
