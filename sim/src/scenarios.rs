//! Scenario definitions.
//!
//! Each scenario is a named configuration of tags and anchors.
//! All scenarios are deterministic given the same seed.

use crate::tag::{MotionSpec, Tag};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sensor_models::{AnchorPair, AnchorParams, AnchorRouting};
use serde::{Deserialize, Serialize};

/// Which pre-defined scenario to load.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    /// One tag walking a rectangle in front of the anchors
    Single,
    /// 12 tags bouncing around a room, lossy link
    Crowd,
    /// 3 tags standing still (filter convergence)
    Static,
}

/// A fully configured simulation scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub duration: f64, // seconds
    pub sim_dt: f64,   // simulation step (s)
    pub anchors: AnchorPair,
    pub anchor_params: AnchorParams,
    /// Probability of a truncated telemetry line
    pub p_garble: f64,
    pub tags: Vec<Tag>,
}

impl Scenario {
    /// Build the named scenario. Uses `seed` for repeatability.
    pub fn build(kind: ScenarioKind, seed: u64) -> Self {
        match kind {
            ScenarioKind::Single => Self::single(seed),
            ScenarioKind::Crowd => Self::crowd(seed),
            ScenarioKind::Static => Self::stationary(seed),
        }
    }

    fn anchors(baseline: f64) -> AnchorPair {
        AnchorPair::new("83", "84", baseline, AnchorRouting::Strict)
    }

    // -----------------------------------------------------------------------
    // Single walker
    // -----------------------------------------------------------------------
    fn single(seed: u64) -> Self {
        let tag = Tag::new(
            "AA:BB",
            [1.0, 1.0],
            [0.0, 0.0],
            MotionSpec::Waypoints {
                waypoints: vec![[4.0, 1.0], [4.0, 4.0], [1.0, 4.0], [1.0, 1.0]],
                speed: 0.8, // walking pace
            },
        );
        Self {
            name: "single".into(),
            seed,
            duration: 60.0,
            sim_dt: 0.01,
            anchors: Self::anchors(5.0),
            anchor_params: AnchorParams::default(),
            p_garble: 0.0,
            tags: vec![tag],
        }
    }

    // -----------------------------------------------------------------------
    // Crowd: many tags, noisier link
    // -----------------------------------------------------------------------
    fn crowd(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let room_min = [0.5, 0.5];
        let room_max = [7.5, 6.0];
        let tags = (0..12)
            .map(|i| {
                let x = rng.gen_range(room_min[0]..room_max[0]);
                let y = rng.gen_range(room_min[1]..room_max[1]);
                let heading = rng.gen_range(0.0..std::f64::consts::TAU);
                let speed = rng.gen_range(0.3..1.5);
                Tag::new(
                    format!("{:02X}:{:02X}", 0xA0 + i, rng.gen::<u8>()),
                    [x, y],
                    [speed * heading.cos(), speed * heading.sin()],
                    MotionSpec::Bounce {
                        min: room_min,
                        max: room_max,
                    },
                )
            })
            .collect();
        Self {
            name: "crowd".into(),
            seed,
            duration: 120.0,
            sim_dt: 0.01,
            anchors: Self::anchors(8.0),
            anchor_params: AnchorParams {
                range_noise: 0.25,
                p_dropout: 0.15,
                refresh_rate: 10.0,
            },
            p_garble: 0.02,
            tags,
        }
    }

    // -----------------------------------------------------------------------
    // Static tags
    // -----------------------------------------------------------------------
    fn stationary(seed: u64) -> Self {
        let tags = [[1.0, 2.0], [2.5, 3.5], [4.0, 1.5]]
            .iter()
            .enumerate()
            .map(|(i, &p)| Tag::new(format!("S{i}"), p, [0.0, 0.0], MotionSpec::Stationary))
            .collect();
        Self {
            name: "static".into(),
            seed,
            duration: 30.0,
            sim_dt: 0.01,
            anchors: Self::anchors(5.0),
            anchor_params: AnchorParams::default(),
            p_garble: 0.0,
            tags,
        }
    }
}
