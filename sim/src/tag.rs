//! Tag trajectory models and state propagation.
//!
//! Each tag has a true 2D state [px, py, vx, vy] in the anchor frame and a
//! `MotionSpec` describing how it moves. The simulator steps each tag
//! forward in time.

use serde::{Deserialize, Serialize};

/// Describes how a tag moves.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MotionSpec {
    /// Does not move.
    Stationary,
    /// Constant velocity, reflecting off the walls of an axis-aligned room
    /// given as `min` / `max` corners.
    Bounce { min: [f64; 2], max: [f64; 2] },
    /// Walk a closed loop of waypoints at constant `speed` (m/s).
    Waypoints { waypoints: Vec<[f64; 2]>, speed: f64 },
}

/// A simulated tag with ground-truth state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tag {
    /// Identifier the tag reports in telemetry
    pub identifier: String,
    /// True state [px, py, vx, vy]
    pub state: [f64; 4],
    pub motion: MotionSpec,
    /// Index of the waypoint currently being approached
    #[serde(default)]
    pub next_waypoint: usize,
}

impl Tag {
    pub fn new(
        identifier: impl Into<String>,
        position: [f64; 2],
        velocity: [f64; 2],
        motion: MotionSpec,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            state: [position[0], position[1], velocity[0], velocity[1]],
            motion,
            next_waypoint: 0,
        }
    }

    /// Propagate true state by `dt` seconds according to motion spec.
    pub fn step(&mut self, dt: f64) {
        let s = &mut self.state;
        match &self.motion {
            MotionSpec::Stationary => {
                s[2] = 0.0;
                s[3] = 0.0;
            }
            MotionSpec::Bounce { min, max } => {
                s[0] += s[2] * dt;
                s[1] += s[3] * dt;
                for axis in 0..2 {
                    if s[axis] < min[axis] {
                        s[axis] = 2.0 * min[axis] - s[axis];
                        s[axis + 2] = s[axis + 2].abs();
                    } else if s[axis] > max[axis] {
                        s[axis] = 2.0 * max[axis] - s[axis];
                        s[axis + 2] = -s[axis + 2].abs();
                    }
                }
            }
            MotionSpec::Waypoints { waypoints, speed } => {
                if waypoints.is_empty() {
                    return;
                }
                let mut budget = speed * dt;
                let mut zero_hops = 0;
                // Consume the step distance across as many waypoints as needed
                while budget > 0.0 {
                    let wp = waypoints[self.next_waypoint % waypoints.len()];
                    let dx = wp[0] - s[0];
                    let dy = wp[1] - s[1];
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist <= budget {
                        s[0] = wp[0];
                        s[1] = wp[1];
                        budget -= dist;
                        self.next_waypoint = (self.next_waypoint + 1) % waypoints.len();
                        if dist == 0.0 {
                            zero_hops += 1;
                            if zero_hops > waypoints.len() {
                                break;
                            }
                        }
                    } else {
                        s[0] += budget * dx / dist;
                        s[1] += budget * dy / dist;
                        s[2] = speed * dx / dist;
                        s[3] = speed * dy / dist;
                        budget = 0.0;
                    }
                }
            }
        }
    }

    /// 2D position
    pub fn pos_2d(&self) -> [f64; 2] {
        [self.state[0], self.state[1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stationary_stays_put() {
        let mut tag = Tag::new("s", [1.0, 2.0], [0.5, 0.5], MotionSpec::Stationary);
        for _ in 0..10 {
            tag.step(0.1);
        }
        assert_eq!(tag.pos_2d(), [1.0, 2.0]);
    }

    #[test]
    fn bounce_reflects_off_walls() {
        let mut tag = Tag::new(
            "b",
            [0.9, 1.0],
            [1.0, 0.0],
            MotionSpec::Bounce { min: [0.0, 0.5], max: [1.0, 3.0] },
        );
        tag.step(0.3); // would reach 1.2 → reflected to 0.8
        assert_abs_diff_eq!(tag.state[0], 0.8, epsilon = 1e-12);
        assert!(tag.state[2] < 0.0);
    }

    #[test]
    fn waypoints_loop() {
        let mut tag = Tag::new(
            "w",
            [0.0, 1.0],
            [0.0, 0.0],
            MotionSpec::Waypoints {
                waypoints: vec![[1.0, 1.0], [1.0, 2.0], [0.0, 1.0]],
                speed: 1.0,
            },
        );
        tag.step(1.5); // past the first corner, halfway up the second leg
        assert_abs_diff_eq!(tag.state[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tag.state[1], 1.5, epsilon = 1e-12);
        assert_eq!(tag.next_waypoint, 1);
    }
}
