//! Anchor geometry and anchor-name routing.
//!
//! # Frame convention
//! The right anchor sits at the origin and the left anchor at `(baseline, 0)`.
//! Tags are assumed to be in the half-plane `y >= 0`; two ranges cannot
//! disambiguate the mirrored solution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two anchors a range sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorSide {
    Left,
    Right,
}

impl fmt::Display for AnchorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSide::Left => write!(f, "Left"),
            AnchorSide::Right => write!(f, "Right"),
        }
    }
}

/// Policy for anchor names that match neither configured short name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorRouting {
    /// Unknown names are dropped.
    #[default]
    Strict,
    /// Anything that is not the left name is routed to the right slot.
    Permissive,
}

/// The two fixed anchors: their short names and separation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub left_name: String,
    pub right_name: String,
    /// Distance between the two anchors (meters)
    pub baseline: f64,
    pub routing: AnchorRouting,
}

impl AnchorPair {
    pub fn new(
        left_name: impl Into<String>,
        right_name: impl Into<String>,
        baseline: f64,
        routing: AnchorRouting,
    ) -> Self {
        Self {
            left_name: left_name.into(),
            right_name: right_name.into(),
            baseline,
            routing,
        }
    }

    /// Resolve a telemetry anchor short-name to a side, or `None` if the
    /// routing policy rejects it.
    pub fn route(&self, name: &str) -> Option<AnchorSide> {
        if name == self.left_name {
            return Some(AnchorSide::Left);
        }
        match self.routing {
            AnchorRouting::Permissive => Some(AnchorSide::Right),
            AnchorRouting::Strict if name == self.right_name => Some(AnchorSide::Right),
            AnchorRouting::Strict => None,
        }
    }

    /// Short name reported by the given anchor.
    pub fn name(&self, side: AnchorSide) -> &str {
        match side {
            AnchorSide::Left => &self.left_name,
            AnchorSide::Right => &self.right_name,
        }
    }

    /// Anchor position in the localization frame.
    pub fn position(&self, side: AnchorSide) -> (f64, f64) {
        match side {
            AnchorSide::Left => (self.baseline, 0.0),
            AnchorSide::Right => (0.0, 0.0),
        }
    }

    /// True range from an anchor to the point `(x, y)`.
    pub fn range_to(&self, side: AnchorSide, x: f64, y: f64) -> f64 {
        let (ax, ay) = self.position(side);
        let dx = x - ax;
        let dy = y - ay;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Physical characteristics of one ranging anchor, used by the simulator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnchorParams {
    /// Range noise: half-width of the uniform error band (meters)
    pub range_noise: f64,
    /// Probability that a scheduled ranging exchange produces no report
    pub p_dropout: f64,
    /// Ranging rate (Hz)
    pub refresh_rate: f64,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            range_noise: 0.1, // 10 cm, typical DW1000 line-of-sight
            p_dropout: 0.05,
            refresh_rate: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(routing: AnchorRouting) -> AnchorPair {
        AnchorPair::new("83", "84", 5.0, routing)
    }

    #[test]
    fn strict_routing_drops_unknown_names() {
        let anchors = pair(AnchorRouting::Strict);
        assert_eq!(anchors.route("83"), Some(AnchorSide::Left));
        assert_eq!(anchors.route("84"), Some(AnchorSide::Right));
        assert_eq!(anchors.route("85"), None);
    }

    #[test]
    fn permissive_routing_defaults_to_right() {
        let anchors = pair(AnchorRouting::Permissive);
        assert_eq!(anchors.route("83"), Some(AnchorSide::Left));
        assert_eq!(anchors.route("84"), Some(AnchorSide::Right));
        assert_eq!(anchors.route("85"), Some(AnchorSide::Right));
    }

    #[test]
    fn ranges_follow_frame_convention() {
        let anchors = pair(AnchorRouting::Strict);
        // 3-4-5 triangle with the tag above the right anchor's side
        assert!((anchors.range_to(AnchorSide::Right, 1.8, 2.4) - 3.0).abs() < 1e-12);
        assert!((anchors.range_to(AnchorSide::Left, 1.8, 2.4) - 4.0).abs() < 1e-12);
    }
}
