// Touch input - one batch per platform touch callback

use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Position on the touch surface, `[0,1]` on both axes, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Opaque touch identity.
///
/// Only equality and stability for the life of one contact are relied on.
pub trait TouchId: Eq + Hash + Clone {}

impl<T: Eq + Hash + Clone> TouchId for T {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchContact<K> {
    pub id: K,
    pub position: NormalizedPosition,
}

impl<K> TouchContact<K> {
    pub fn new(id: K, x: f64, y: f64) -> Self {
        Self {
            id,
            position: NormalizedPosition::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// Contacts still on the surface plus the identities that just lifted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchBatch<K> {
    pub phase: TouchPhase,
    #[serde(default = "Vec::new")]
    pub touching: Vec<TouchContact<K>>,
    #[serde(default = "Vec::new")]
    pub ended: Vec<K>,
}

impl<K> TouchBatch<K> {
    pub fn began(touching: Vec<TouchContact<K>>) -> Self {
        Self {
            phase: TouchPhase::Began,
            touching,
            ended: Vec::new(),
        }
    }

    pub fn moved(touching: Vec<TouchContact<K>>) -> Self {
        Self {
            phase: TouchPhase::Moved,
            touching,
            ended: Vec::new(),
        }
    }

    pub fn ended(touching: Vec<TouchContact<K>>, ended: Vec<K>) -> Self {
        Self {
            phase: TouchPhase::Ended,
            touching,
            ended,
        }
    }

    pub fn cancelled(touching: Vec<TouchContact<K>>, ended: Vec<K>) -> Self {
        Self {
            phase: TouchPhase::Cancelled,
            touching,
            ended,
        }
    }

    pub fn is_ending(&self) -> bool {
        matches!(self.phase, TouchPhase::Ended | TouchPhase::Cancelled)
    }
}
