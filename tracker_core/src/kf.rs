//! Kalman filter: constant-velocity 2D position smoothing, one per track.
//!
//! # Design choices
//! - Linear KF, constant-velocity (CV) motion model.
//! - All matrices are fixed 4×4 (`nalgebra::Matrix4`) so the observation
//!   matrix H simply zeroes the velocity rows; only position is observed.
//! - A singular innovation covariance is not fatal: the correction step is
//!   skipped and the predicted position is returned.
//!
//! ## State vector
//! x = [px, py, vx, vy]ᵀ
//!
//! ## CV Transition model
//! F = I₄ + dt · [[0₂ I₂]; [0₂ 0₂]]
//!
//! ## Noise
//! Q = q · I₄,  R = r · I₄,  P₀ = I₄

use crate::types::{Position2, StateCov, StateVec};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the CV Kalman filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Prediction horizon per update (seconds)
    pub dt: f64,
    /// Process noise. Higher = trust measurements more.
    pub process_noise: f64,
    /// Measurement noise. Higher = trust the motion model more.
    pub measurement_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            process_noise: 0.1,
            measurement_noise: 1.0,
        }
    }
}

/// Per-track constant-velocity Kalman estimator.
#[derive(Clone, Debug)]
pub struct KalmanEstimator {
    /// State estimate [x, y, vx, vy]
    state: StateVec,
    /// Estimate error covariance P
    cov: StateCov,
    /// State transition F
    transition: StateCov,
    /// Observation matrix H
    observation: StateCov,
    /// Process noise covariance Q
    process_noise: StateCov,
    /// Measurement noise covariance R
    measurement_noise: StateCov,
    /// Cycles where S could not be inverted
    singular_updates: u64,
}

impl KalmanEstimator {
    /// Create a filter starting at the origin with zero velocity.
    pub fn new(config: &KalmanConfig) -> Self {
        Self::with_initial_position(config, Position2::zeros())
    }

    pub fn with_initial_position(config: &KalmanConfig, initial: Position2) -> Self {
        Self {
            state: StateVec::new(initial.x, initial.y, 0.0, 0.0),
            cov: StateCov::identity(),
            transition: Self::transition_matrix(config.dt),
            observation: Self::observation_matrix(),
            process_noise: StateCov::identity() * config.process_noise,
            measurement_noise: StateCov::identity() * config.measurement_noise,
            singular_updates: 0,
        }
    }

    /// Build state transition matrix F for timestep dt.
    pub fn transition_matrix(dt: f64) -> StateCov {
        let mut f = StateCov::identity();
        // position += velocity * dt
        f[(0, 2)] = dt;
        f[(1, 3)] = dt;
        f
    }

    /// H selects [x, y]; the velocity rows are zero.
    pub fn observation_matrix() -> StateCov {
        let mut h = StateCov::zeros();
        h[(0, 0)] = 1.0;
        h[(1, 1)] = 1.0;
        h
    }

    /// Predict one `dt` ahead: x ← F·x,  P ← F·P·Fᵀ + Q.
    pub fn predict(&mut self) {
        self.state = self.transition * self.state;
        self.cov = self.transition * self.cov * self.transition.transpose() + self.process_noise;
    }

    /// Run one predict + correct cycle on a position observation and return
    /// the corrected position (or the predicted one if S is singular).
    /// Non-finite observations leave the filter untouched.
    pub fn update(&mut self, observation: &Position2) -> Position2 {
        if !(observation.x.is_finite() && observation.y.is_finite()) {
            warn!("ignoring non-finite observation");
            return self.position();
        }
        self.predict();

        let h = &self.observation;

        // Innovation: ν = z − H·x  (velocity components of z are zero)
        let z = StateVec::new(observation.x, observation.y, 0.0, 0.0);
        let innovation = z - h * self.state;

        // Innovation covariance: S = H·P·Hᵀ + R
        let s = h * self.cov * h.transpose() + self.measurement_noise;

        let s_inv = match Self::checked_inverse(&s) {
            Some(inv) => inv,
            None => {
                self.singular_updates += 1;
                warn!(
                    singular_updates = self.singular_updates,
                    "innovation covariance is singular; returning predicted position"
                );
                return self.position();
            }
        };

        // Kalman gain: K = P·Hᵀ·S⁻¹
        let k = self.cov * h.transpose() * s_inv;

        self.state += k * innovation;
        self.cov = (StateCov::identity() - k * h) * self.cov;

        self.position()
    }

    /// Determinant-gated inverse.
    fn checked_inverse(m: &StateCov) -> Option<StateCov> {
        if m.determinant() == 0.0 {
            return None;
        }
        m.try_inverse()
    }

    pub fn position(&self) -> Position2 {
        Position2::new(self.state[0], self.state[1])
    }

    pub fn velocity(&self) -> Position2 {
        Position2::new(self.state[2], self.state[3])
    }

    pub fn state(&self) -> &StateVec {
        &self.state
    }

    pub fn cov(&self) -> &StateCov {
        &self.cov
    }

    /// Number of update cycles that fell back to the predicted state.
    pub fn singular_updates(&self) -> u64 {
        self.singular_updates
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
