//! Replay: record a scenario's telemetry to JSON and load it back.

use crate::{
    ranging_sim::{RangingSimulator, TimedLine},
    scenarios::Scenario,
};
use sensor_models::AnchorPair;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded simulation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub sim_dt: f64,
    pub duration: f64,
    pub anchors: AnchorPair,
    /// All telemetry lines in chronological order
    pub lines: Vec<TimedLine>,
    /// Ground-truth tag positions, sampled every `sim_dt`
    pub ground_truth: Vec<GroundTruthFrame>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroundTruthFrame {
    pub time: f64,
    pub tags: Vec<TagPosition>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagPosition {
    pub identifier: String,
    pub position: [f64; 2],
}

impl ReplayLog {
    /// Run `scenario` to completion and record everything it produced.
    pub fn record(mut scenario: Scenario) -> Self {
        let mut ranging = RangingSimulator::new(
            scenario.anchors.clone(),
            scenario.anchor_params.clone(),
            scenario.p_garble,
            scenario.seed,
        );

        let dt = scenario.sim_dt;
        let steps = (scenario.duration / dt).round() as usize;
        let mut lines = Vec::new();
        let mut ground_truth = Vec::with_capacity(steps);

        for step in 0..steps {
            let sim_time = step as f64 * dt;
            lines.extend(ranging.generate(&scenario.tags, sim_time));
            ground_truth.push(GroundTruthFrame {
                time: sim_time,
                tags: scenario
                    .tags
                    .iter()
                    .map(|t| TagPosition {
                        identifier: t.identifier.clone(),
                        position: t.pos_2d(),
                    })
                    .collect(),
            });

            for tag in &mut scenario.tags {
                tag.step(dt);
            }
        }

        Self {
            scenario_name: scenario.name,
            seed: scenario.seed,
            sim_dt: dt,
            duration: scenario.duration,
            anchors: scenario.anchors,
            lines,
            ground_truth,
        }
    }

    /// Telemetry text only, in order.
    pub fn raw_lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.line.as_str())
    }

    /// True position of `identifier` in the last recorded frame.
    pub fn final_truth(&self, identifier: &str) -> Option<[f64; 2]> {
        self.ground_truth
            .last()?
            .tags
            .iter()
            .find(|t| t.identifier == identifier)
            .map(|t| t.position)
    }
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioKind;

    #[test]
    fn record_is_chronological() {
        let log = ReplayLog::record(Scenario::build(ScenarioKind::Static, 5));
        assert!(!log.lines.is_empty());
        assert!(log.lines.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(log.ground_truth.len(), 3000);
    }

    #[test]
    fn final_truth_matches_static_tags() {
        let scenario = Scenario::build(ScenarioKind::Static, 5);
        let expected: Vec<(String, [f64; 2])> = scenario
            .tags
            .iter()
            .map(|t| (t.identifier.clone(), t.pos_2d()))
            .collect();
        let log = ReplayLog::record(scenario);
        for (identifier, position) in expected {
            assert_eq!(log.final_truth(&identifier), Some(position));
        }
        assert_eq!(log.final_truth("nobody"), None);
    }

    #[test]
    fn save_and_load() {
        let log = ReplayLog::record(Scenario::build(ScenarioKind::Single, 2));
        let path = std::env::temp_dir().join(format!("uwb-replay-{}.json", std::process::id()));
        save_replay(&log, &path).unwrap();
        let loaded = load_replay(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.lines.len(), log.lines.len());
        assert_eq!(loaded.anchors, log.anchors);
        assert_eq!(loaded.raw_lines().next(), log.raw_lines().next());
    }
}
