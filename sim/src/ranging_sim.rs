//! UWB ranging simulator.
//!
//! Generates telemetry lines `<anchor>,<range>,<tag>` with:
//! - uniform range noise
//! - dropout probability per exchange
//! - occasional garbled lines (transport corruption)

use crate::tag::Tag;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sensor_models::{AnchorPair, AnchorParams, AnchorSide, TelemetryRecord};
use serde::{Deserialize, Serialize};

/// Smallest range a simulated anchor will report (meters).
const MIN_REPORTED_RANGE: f64 = 0.01;

/// One configured anchor in the simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimAnchor {
    pub side: AnchorSide,
    pub params: AnchorParams,
    /// Next scheduled ranging time
    pub next_scan_time: f64,
}

impl SimAnchor {
    pub fn new(side: AnchorSide, params: AnchorParams, phase: f64) -> Self {
        Self {
            side,
            params,
            next_scan_time: phase,
        }
    }

    /// Check if this anchor should range at the current simulation time.
    pub fn should_scan(&self, t: f64) -> bool {
        t >= self.next_scan_time
    }

    /// Advance the schedule by one ranging interval.
    pub fn advance_schedule(&mut self) {
        self.next_scan_time += 1.0 / self.params.refresh_rate;
    }
}

/// A simulated telemetry line with the truth behind it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimedLine {
    /// Simulation time of the ranging exchange
    pub time: f64,
    pub line: String,
    /// True tag position when the range was taken (None for garbled lines)
    pub truth: Option<[f64; 2]>,
}

/// Generates telemetry from a set of tags and the two anchors.
pub struct RangingSimulator {
    pub anchors: AnchorPair,
    pub sim_anchors: [SimAnchor; 2],
    /// Probability that an emitted line is truncated in transit
    pub p_garble: f64,
    rng: ChaCha8Rng,
}

impl RangingSimulator {
    pub fn new(anchors: AnchorPair, params: AnchorParams, p_garble: f64, seed: u64) -> Self {
        // Offset the right anchor by half a period so reports interleave
        let half = 0.5 / params.refresh_rate;
        Self {
            anchors,
            sim_anchors: [
                SimAnchor::new(AnchorSide::Left, params.clone(), 0.0),
                SimAnchor::new(AnchorSide::Right, params, half),
            ],
            p_garble,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate all lines for anchors that fire at or before `sim_time`.
    pub fn generate(&mut self, tags: &[Tag], sim_time: f64) -> Vec<TimedLine> {
        let mut lines = Vec::new();

        for anchor in &mut self.sim_anchors {
            if !anchor.should_scan(sim_time) {
                continue;
            }
            let scan_time = anchor.next_scan_time;
            anchor.advance_schedule();
            let name = self.anchors.name(anchor.side).to_string();

            for tag in tags {
                if self.rng.gen::<f64>() < anchor.params.p_dropout {
                    continue;
                }

                let [tx, ty] = tag.pos_2d();
                let range = self.anchors.range_to(anchor.side, tx, ty);
                let noise = anchor.params.range_noise;
                let noisy = (range + self.rng.gen::<f64>() * noise * 2.0 - noise)
                    .max(MIN_REPORTED_RANGE);

                let record = TelemetryRecord {
                    anchor: name.clone(),
                    range: (noisy * 100.0).round() / 100.0,
                    identifier: tag.identifier.clone(),
                };

                if self.rng.gen::<f64>() < self.p_garble {
                    // Lost the trailing field
                    lines.push(TimedLine {
                        time: scan_time,
                        line: format!("{},{}", record.anchor, record.range),
                        truth: None,
                    });
                } else {
                    lines.push(TimedLine {
                        time: scan_time,
                        line: record.to_line(),
                        truth: Some([tx, ty]),
                    });
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::MotionSpec;
    use sensor_models::AnchorRouting;

    fn simulator(params: AnchorParams, p_garble: f64) -> RangingSimulator {
        RangingSimulator::new(
            AnchorPair::new("83", "84", 5.0, AnchorRouting::Strict),
            params,
            p_garble,
            7,
        )
    }

    #[test]
    fn noiseless_lines_carry_true_ranges() {
        let params = AnchorParams {
            range_noise: 0.0,
            p_dropout: 0.0,
            refresh_rate: 10.0,
        };
        let mut sim = simulator(params, 0.0);
        let tags = vec![Tag::new("AA:BB", [1.8, 2.4], [0.0, 0.0], MotionSpec::Stationary)];

        let lines = sim.generate(&tags, 0.0);
        assert_eq!(lines.len(), 1, "only the left anchor is due at t=0");
        assert_eq!(lines[0].line, "83,4,AA:BB");

        let lines = sim.generate(&tags, 0.05);
        assert_eq!(lines[0].line, "84,3,AA:BB");
        assert_eq!(lines[0].truth, Some([1.8, 2.4]));
    }

    #[test]
    fn garbled_lines_lose_a_field() {
        let params = AnchorParams {
            p_dropout: 0.0,
            ..Default::default()
        };
        let mut sim = simulator(params, 1.0);
        let tags = vec![Tag::new("t", [2.0, 2.0], [0.0, 0.0], MotionSpec::Stationary)];
        let lines = sim.generate(&tags, 1.0);
        assert!(!lines.is_empty());
        assert!(lines
            .iter()
            .all(|l| l.line.split(',').count() == 2 && l.truth.is_none()));
    }

    #[test]
    fn same_seed_same_output() {
        let tags = vec![Tag::new("t", [2.0, 2.0], [0.0, 0.0], MotionSpec::Stationary)];
        let mut sim_a = simulator(AnchorParams::default(), 0.1);
        let mut sim_b = simulator(AnchorParams::default(), 0.1);
        for i in 0..50 {
            let t = i as f64 * 0.05;
            let a: Vec<String> = sim_a.generate(&tags, t).into_iter().map(|l| l.line).collect();
            let b: Vec<String> = sim_b.generate(&tags, t).into_iter().map(|l| l.line).collect();
            assert_eq!(a, b);
        }
    }
}
