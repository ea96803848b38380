//! Accuracy metrics: RMSE of emitted positions against ground truth.

use crate::output::PositionUpdate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Accumulated position error statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackingMetrics {
    /// Number of updates evaluated
    pub n_matched: u64,
    /// Updates whose identifier had no ground truth
    pub n_unmatched: u64,
    /// Sum of squared position errors (for RMSE)
    pub sum_sq_pos_err: f64,
    /// Largest single position error seen (meters)
    pub max_pos_err: f64,
    /// Per-identifier (sum of squared error, count)
    pub per_tag: HashMap<String, (f64, u64)>,
}

impl TrackingMetrics {
    /// Root-mean-square position error (meters, 2D).
    pub fn rmse_position(&self) -> f64 {
        if self.n_matched == 0 {
            return 0.0;
        }
        (self.sum_sq_pos_err / self.n_matched as f64).sqrt()
    }

    /// RMSE for a single tag.
    pub fn rmse_for(&self, identifier: &str) -> Option<f64> {
        self.per_tag
            .get(identifier)
            .filter(|(_, n)| *n > 0)
            .map(|(sum, n)| (sum / *n as f64).sqrt())
    }

    /// Score one emitted update against the true position of its tag.
    pub fn accumulate(&mut self, update: &PositionUpdate, truth: Option<(f64, f64)>) {
        let Some((tx, ty)) = truth else {
            self.n_unmatched += 1;
            return;
        };
        let dx = update.x - tx;
        let dy = update.y - ty;
        let sq = dx * dx + dy * dy;
        self.sum_sq_pos_err += sq;
        self.max_pos_err = self.max_pos_err.max(sq.sqrt());
        self.n_matched += 1;
        let entry = self.per_tag.entry(update.identifier.clone()).or_default();
        entry.0 += sq;
        entry.1 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrackIndex;
    use approx::assert_abs_diff_eq;

    fn update(id: &str, x: f64, y: f64) -> PositionUpdate {
        PositionUpdate {
            track: TrackIndex(0),
            identifier: id.into(),
            x,
            y,
            left_range: 0.0,
            right_range: 0.0,
            left_display: String::new(),
            right_display: String::new(),
        }
    }

    #[test]
    fn rmse_over_updates() {
        let mut m = TrackingMetrics::default();
        m.accumulate(&update("a", 3.0, 4.0), Some((0.0, 0.0))); // err 5
        m.accumulate(&update("a", 1.0, 1.0), Some((1.0, 1.0))); // err 0
        m.accumulate(&update("b", 0.0, 0.0), None);
        assert_eq!(m.n_matched, 2);
        assert_eq!(m.n_unmatched, 1);
        assert_abs_diff_eq!(m.rmse_position(), (25.0f64 / 2.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(m.max_pos_err, 5.0, epsilon = 1e-12);
        assert_eq!(m.rmse_for("b"), None);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(TrackingMetrics::default().rmse_position(), 0.0);
    }
}
