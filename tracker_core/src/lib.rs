//! `tracker_core`: Multi-tag UWB localization pipeline.
//!
//! # Module layout
//! - [`types`]   : Fundamental types (track index, state vector/matrix aliases)
//! - [`registry`]: Tag identifier → dense track index
//! - [`track`]   : Per-tag state: buffered ranges, filter, smoother
//! - [`kf`]      : Constant-velocity Kalman estimator
//! - [`smoother`]: Rolling-window average
//! - [`output`]  : Emitted positions, sinks, display rounding, scene mapping
//! - [`pipeline`]: Telemetry ingest orchestrator and its configuration
//! - [`metrics`] : RMSE against ground truth

pub mod error;
pub mod kf;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod smoother;
pub mod track;
pub mod types;

pub use error::{Error, Result};
pub use kf::{KalmanConfig, KalmanEstimator};
pub use output::{PositionSink, PositionUpdate, SceneTransform};
pub use pipeline::{IngestOutcome, IngestStats, Pipeline, PipelineConfig};
pub use registry::TrackRegistry;
pub use smoother::RollingSmoother;
pub use track::TrackState;
pub use types::{Position2, StateCov, StateVec, TrackIndex};
