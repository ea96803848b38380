//! Track: latest anchor ranges, Kalman estimator and rolling smoother for one tag.

use crate::{
    kf::{KalmanConfig, KalmanEstimator},
    smoother::RollingSmoother,
    types::TrackIndex,
};
use sensor_models::{AnchorSide, NO_READING};

/// All estimation state for one tag. Created on first sight, never removed.
#[derive(Clone, Debug)]
pub struct TrackState {
    pub index: TrackIndex,
    pub identifier: String,
    /// Latest range from the left anchor, or `NO_READING`
    pub left_range: f64,
    /// Latest range from the right anchor, or `NO_READING`
    pub right_range: f64,
    pub kf: KalmanEstimator,
    pub smoother: RollingSmoother,
    /// Number of positions emitted for this track
    pub emitted: u64,
}

impl TrackState {
    pub fn new(
        index: TrackIndex,
        identifier: impl Into<String>,
        kf_config: &KalmanConfig,
        window: usize,
    ) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            left_range: NO_READING,
            right_range: NO_READING,
            kf: KalmanEstimator::new(kf_config),
            smoother: RollingSmoother::new(window),
            emitted: 0,
        }
    }

    /// Overwrite the buffered range for one anchor.
    pub fn set_range(&mut self, side: AnchorSide, meters: f64) {
        match side {
            AnchorSide::Left => self.left_range = meters,
            AnchorSide::Right => self.right_range = meters,
        }
    }

    pub fn range(&self, side: AnchorSide) -> f64 {
        match side {
            AnchorSide::Left => self.left_range,
            AnchorSide::Right => self.right_range,
        }
    }

    /// True once both anchors have a non-zero reading.
    pub fn ranges_ready(&self) -> bool {
        self.left_range != NO_READING && self.right_range != NO_READING
    }
}
