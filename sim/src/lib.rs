//! Scenario simulator: tag trajectories, UWB ranging telemetry, replay.

pub mod ranging_sim;
pub mod replay;
pub mod scenarios;
pub mod tag;

pub use ranging_sim::{RangingSimulator, TimedLine};
pub use replay::{load_replay, save_replay, ReplayLog};
pub use scenarios::{Scenario, ScenarioKind};
pub use tag::{MotionSpec, Tag};
