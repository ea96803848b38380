//! Pipeline orchestrator: one telemetry record in, at most one position out.
//!
//! # Processing steps per record
//! 1. Parse `<anchor>,<range>,<identifier>`; drop anything without 3 fields
//! 2. Route the anchor name to the left/right slot (see [`AnchorRouting`])
//! 3. Resolve the identifier to a dense track index, allocating on first sight
//! 4. Overwrite the track's buffered range for that anchor
//! 5. If both ranges are non-zero: trilaterate → Kalman → rolling average
//! 6. Round and deliver the result to the [`PositionSink`]
//!
//! The Kalman filter and the smoother see every sample even when their
//! output is disabled, so re-enabling them never starts from cold state.

use crate::{
    error::{Error, Result},
    kf::KalmanConfig,
    output::{range_label, round_up, PositionSink, PositionUpdate},
    registry::TrackRegistry,
    track::TrackState,
    types::{Position2, TrackIndex},
};
use rayon::prelude::*;
use sensor_models::{locate, AnchorPair, AnchorRouting, AnchorSide, TelemetryRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Anchors closer than this are treated as coincident.
pub const MIN_BASELINE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the localization pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Distance between the two anchors (meters)
    pub anchor_baseline: f64,
    /// Short name reported by the left anchor
    pub left_anchor: String,
    /// Short name reported by the right anchor
    pub right_anchor: String,
    /// What to do with anchor names matching neither of the above
    pub anchor_routing: AnchorRouting,
    /// Per-track KF parameters
    pub kalman: KalmanConfig,
    /// Rolling average window (samples)
    pub rolling_window: usize,
    /// Emit the Kalman-filtered position instead of the raw one
    pub use_kalman: bool,
    /// Emit the rolling average instead of the current position
    pub use_rolling: bool,
    /// Decimal places for emitted x/y (rounded toward +∞)
    pub position_decimals: u32,
    /// Decimal places for displayed ranges (rounded toward +∞)
    pub range_decimals: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            anchor_baseline: 3.0,
            left_anchor: "83".to_string(),
            right_anchor: "84".to_string(),
            anchor_routing: AnchorRouting::Strict,
            kalman: KalmanConfig::default(),
            rolling_window: 20,
            use_kalman: true,
            use_rolling: true,
            position_decimals: 2,
            range_decimals: 1,
        }
    }
}

impl PipelineConfig {
    /// Reject impossible geometry and clamp the tunables into range.
    pub fn validate(mut self) -> Result<Self> {
        if !self.anchor_baseline.is_finite() || self.anchor_baseline < MIN_BASELINE {
            return Err(Error::InvalidConfig(format!(
                "anchor_baseline must be a positive distance, got {}",
                self.anchor_baseline
            )));
        }
        if self.left_anchor.is_empty() || self.right_anchor.is_empty() {
            return Err(Error::InvalidConfig("anchor names must be non-empty".into()));
        }
        if self.left_anchor == self.right_anchor {
            return Err(Error::InvalidConfig(format!(
                "left and right anchors share the name {:?}",
                self.left_anchor
            )));
        }

        let k = &mut self.kalman;
        for (name, value) in [
            ("dt", &mut k.dt),
            ("process_noise", &mut k.process_noise),
            ("measurement_noise", &mut k.measurement_noise),
        ] {
            if value.is_nan() {
                return Err(Error::InvalidConfig(format!("{name} is NaN")));
            }
            *value = value.max(0.0);
        }
        self.rolling_window = self.rolling_window.max(1);
        Ok(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn anchors(&self) -> AnchorPair {
        AnchorPair::new(
            self.left_anchor.clone(),
            self.right_anchor.clone(),
            self.anchor_baseline,
            self.anchor_routing,
        )
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to a single record.
#[derive(Clone, Debug, PartialEq)]
pub enum IngestOutcome {
    /// Not exactly three fields
    Malformed,
    /// Anchor name rejected by strict routing
    UnknownAnchor,
    /// Range stored; the track is still missing the other anchor
    Buffered(TrackIndex),
    /// A position was computed and delivered
    Emitted(PositionUpdate),
}

/// Running counters over the pipeline lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub records: u64,
    pub malformed: u64,
    pub unknown_anchor: u64,
    pub emitted: u64,
    pub new_tracks: u64,
}

impl IngestStats {
    fn record(&mut self, outcome: &IngestOutcome) {
        self.records += 1;
        match outcome {
            IngestOutcome::Malformed => self.malformed += 1,
            IngestOutcome::UnknownAnchor => self.unknown_anchor += 1,
            IngestOutcome::Buffered(_) => {}
            IngestOutcome::Emitted(_) => self.emitted += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The localization pipeline. Owns the registry and every track.
pub struct Pipeline {
    config: PipelineConfig,
    anchors: AnchorPair,
    pub registry: TrackRegistry,
    /// tracks[i] belongs to TrackIndex(i)
    pub tracks: Vec<TrackState>,
    pub stats: IngestStats,
}

impl Pipeline {
    /// Create a pipeline. The config is validated (and clamped) here.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let config = config.validate()?;
        let anchors = config.anchors();
        Ok(Self {
            config,
            anchors,
            registry: TrackRegistry::new(),
            tracks: Vec::new(),
            stats: IngestStats::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn track(&self, index: TrackIndex) -> Option<&TrackState> {
        self.tracks.get(index.0)
    }

    pub fn track_by_identifier(&self, identifier: &str) -> Option<&TrackState> {
        self.registry.get(identifier).and_then(|idx| self.track(idx))
    }

    /// Process one raw telemetry line.
    pub fn ingest<S: PositionSink + ?Sized>(&mut self, raw: &str, sink: &mut S) -> IngestOutcome {
        let outcome = match self.route(raw) {
            Ok((index, side, range)) => {
                match advance_track(&mut self.tracks[index.0], side, range, &self.config) {
                    Some(update) => {
                        sink.on_position(&update);
                        IngestOutcome::Emitted(update)
                    }
                    None => IngestOutcome::Buffered(index),
                }
            }
            Err(dropped) => dropped,
        };
        self.stats.record(&outcome);
        outcome
    }

    /// Process many lines. Equivalent to calling [`Pipeline::ingest`] on each
    /// line in order, but independent tracks are advanced in parallel.
    pub fn ingest_batch<L, S>(&mut self, lines: &[L], sink: &mut S) -> Vec<IngestOutcome>
    where
        L: AsRef<str>,
        S: PositionSink + ?Sized,
    {
        let mut outcomes: Vec<Option<IngestOutcome>> = vec![None; lines.len()];
        let mut jobs: Vec<Vec<(usize, AnchorSide, f64)>> = Vec::new();

        // Identifier resolution stays sequential so indices follow first-seen order
        for (i, line) in lines.iter().enumerate() {
            match self.route(line.as_ref()) {
                Ok((index, side, range)) => {
                    if jobs.len() < self.tracks.len() {
                        jobs.resize_with(self.tracks.len(), Vec::new);
                    }
                    jobs[index.0].push((i, side, range));
                }
                Err(dropped) => outcomes[i] = Some(dropped),
            }
        }

        let config = &self.config;
        let per_track: Vec<Vec<(usize, IngestOutcome)>> = self
            .tracks
            .par_iter_mut()
            .zip(jobs.par_iter())
            .map(|(track, samples)| {
                samples
                    .iter()
                    .map(|&(i, side, range)| {
                        let outcome = match advance_track(track, side, range, config) {
                            Some(update) => IngestOutcome::Emitted(update),
                            None => IngestOutcome::Buffered(track.index),
                        };
                        (i, outcome)
                    })
                    .collect()
            })
            .collect();

        for (i, outcome) in per_track.into_iter().flatten() {
            outcomes[i] = Some(outcome);
        }

        outcomes
            .into_iter()
            .flatten()
            .inspect(|outcome| {
                if let IngestOutcome::Emitted(update) = outcome {
                    sink.on_position(update);
                }
                self.stats.record(outcome);
            })
            .collect()
    }

    /// Change the rolling window. Every track is trimmed right away.
    pub fn set_rolling_window(&mut self, window: usize) {
        self.config.rolling_window = window.max(1);
        for track in &mut self.tracks {
            track.smoother.set_window(self.config.rolling_window);
        }
    }

    pub fn set_kalman_enabled(&mut self, enabled: bool) {
        self.config.use_kalman = enabled;
    }

    pub fn set_rolling_enabled(&mut self, enabled: bool) {
        self.config.use_rolling = enabled;
    }

    /// Parse, route and resolve a line; allocates the track if it is new.
    fn route(
        &mut self,
        raw: &str,
    ) -> std::result::Result<(TrackIndex, AnchorSide, f64), IngestOutcome> {
        let Some(record) = TelemetryRecord::parse(raw) else {
            debug!(raw, "dropping malformed telemetry record");
            return Err(IngestOutcome::Malformed);
        };
        let Some(side) = self.anchors.route(&record.anchor) else {
            debug!(anchor = %record.anchor, "dropping record from unknown anchor");
            return Err(IngestOutcome::UnknownAnchor);
        };

        let (index, is_new) = self.registry.resolve(&record.identifier);
        if is_new {
            debug!(track = %index, identifier = %record.identifier, "new track");
            self.tracks.push(TrackState::new(
                index,
                record.identifier,
                &self.config.kalman,
                self.config.rolling_window,
            ));
            self.stats.new_tracks += 1;
        }
        Ok((index, side, record.range))
    }
}

/// Store one range sample and, if both ranges are valid, run the position chain.
fn advance_track(
    track: &mut TrackState,
    side: AnchorSide,
    range: f64,
    config: &PipelineConfig,
) -> Option<PositionUpdate> {
    track.set_range(side, range);
    if !track.ranges_ready() {
        return None;
    }

    let raw = locate(track.left_range, track.right_range, config.anchor_baseline);
    // Ranges large enough to overflow the geometry yield no position
    if !(raw.x.is_finite() && raw.y.is_finite()) {
        debug!(track = %track.index, "skipping non-finite trilateration");
        return None;
    }

    // The filter always runs so its state stays warm.
    let filtered = track.kf.update(&raw);
    let current = if config.use_kalman { filtered } else { raw };

    let (avg_x, avg_y) = track.smoother.push(current.x, current.y);
    let position = if config.use_rolling {
        Position2::new(avg_x, avg_y)
    } else {
        current
    };

    track.emitted += 1;

    let left_range = round_up(track.left_range, config.range_decimals);
    let right_range = round_up(track.right_range, config.range_decimals);
    Some(PositionUpdate {
        track: track.index,
        identifier: track.identifier.clone(),
        x: round_up(position.x, config.position_decimals),
        y: round_up(position.y, config.position_decimals),
        left_range,
        right_range,
        left_display: range_label(AnchorSide::Left, left_range),
        right_display: range_label(AnchorSide::Right, right_range),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
