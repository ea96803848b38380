//! Fundamental types used across the workspace.

use nalgebra::{Matrix4, Vector2, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: f64 throughout; the filter runs indefinitely on live data.
// ---------------------------------------------------------------------------

/// 4-element constant-velocity state: [x, y, vx, vy]
pub type StateVec = Vector4<f64>;

/// 4×4 state-space matrix (transition, observation, covariances)
pub type StateCov = Matrix4<f64>;

/// 2D position in the anchor frame (meters)
pub type Position2 = Vector2<f64>;

// ---------------------------------------------------------------------------
// Identifier types
// ---------------------------------------------------------------------------

/// Dense track index, assigned in first-seen order starting at 0.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackIndex(pub usize);

impl fmt::Display for TrackIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
