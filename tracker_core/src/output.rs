//! Position delivery to the visualization side.
//!
//! The pipeline hands every emitted position to a [`PositionSink`] exactly
//! once, synchronously, in processing order.

use crate::types::TrackIndex;
use serde::{Deserialize, Serialize};

/// One emitted position for one tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub track: TrackIndex,
    pub identifier: String,
    /// Final x, rounded toward +∞
    pub x: f64,
    /// Final y, rounded toward +∞
    pub y: f64,
    /// Buffered left-anchor range, rounded toward +∞ for display
    pub left_range: f64,
    /// Buffered right-anchor range, rounded toward +∞ for display
    pub right_range: f64,
    pub left_display: String,
    pub right_display: String,
}

/// Consumer of emitted positions.
pub trait PositionSink {
    fn on_position(&mut self, update: &PositionUpdate);
}

impl PositionSink for Vec<PositionUpdate> {
    fn on_position(&mut self, update: &PositionUpdate) {
        self.push(update.clone());
    }
}

impl<F: FnMut(&PositionUpdate)> PositionSink for F {
    fn on_position(&mut self, update: &PositionUpdate) {
        self(update)
    }
}

/// Round toward positive infinity at `places` decimal places.
///
/// Values within float noise of a step (e.g. `2.4000000000000004`) snap to
/// that step instead of being pushed up to the next one.
pub fn round_up(value: f64, places: u32) -> f64 {
    let m = 10f64.powi(places as i32);
    let scaled = value * m;
    let nearest = scaled.round();
    if (scaled - nearest).abs() <= SNAP_TOLERANCE * nearest.abs().max(1.0) {
        nearest / m
    } else {
        scaled.ceil() / m
    }
}

/// Relative tolerance under which a scaled value counts as an exact step.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Display label for an anchor's range.
pub fn range_label(side: sensor_models::AnchorSide, meters: f64) -> String {
    format!("{side} Anchor\n{meters} m")
}

// ---------------------------------------------------------------------------
// Scene mapping
// ---------------------------------------------------------------------------

/// Maps an anchor-frame position onto a 3D scene ground plane (y up).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTransform {
    /// Scene units per meter
    pub scale: f64,
    pub x_offset: f64,
    pub z_offset: f64,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            scale: 20.0,
            x_offset: 20.0,
            z_offset: -20.0,
        }
    }
}

impl SceneTransform {
    /// `[-y·scale + x_offset, 0, x·scale + z_offset]`; NaN inputs count as 0.
    pub fn apply(&self, x: f64, y: f64) -> [f64; 3] {
        let x = if x.is_nan() { 0.0 } else { x };
        let y = if y.is_nan() { 0.0 } else { y };
        [
            -y * self.scale + self.x_offset,
            0.0,
            x * self.scale + self.z_offset,
        ]
    }
}
