//! Core traits for storemap

use crate::{color::Tint, scene::NodeId};

/// Something whose nodes carry a mutable tint (the visual state a search changes)
pub trait Tintable {
    /// Set the tint of a node. Returns false if the node cannot be tinted.
    fn set_tint(&mut self, id: NodeId, tint: Tint) -> bool;

    /// Current tint of a node, if it has one
    fn tint(&self, id: NodeId) -> Option<Tint>;
}
