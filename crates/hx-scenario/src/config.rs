//! Scenario configuration, loadable from JSON.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the fields it changes:
//!
//! ```json
//! { "seed": 7, "tree": { "skip_ahead": true } }
//! ```

use std::path::Path;
use std::time::Duration;

use hx_core::{HxError, Location, Region, WorldSettings};
use hx_traffic::{BurstConfig, LaneLayout, SpawnerConfig};
use serde::{Deserialize, Serialize};

use crate::{ScenarioError, ScenarioResult};

pub const DEFAULT_TIMEOUT_SECONDS: f64 = 120.0;

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSection {
    pub tm_port:                u16,
    /// Global percentage speed difference handed to the traffic manager.
    /// Negative values make autopilot vehicles faster than the limit.
    pub speed_difference:       f32,
    pub spawn_probability:      f64,
    pub vehicle_filter:         String,
    pub burst_rounds:           u32,
    /// Simulated seconds between burst rounds.
    pub round_interval_seconds: f64,
    /// Real milliseconds between clock polls while a round waits.
    pub poll_interval_ms:       u64,
    /// Real seconds cleanup waits for the burst worker to exit.
    pub join_timeout_seconds:   f64,
}

impl Default for TrafficSection {
    fn default() -> Self {
        Self {
            tm_port:                hx_traffic::spawner::DEFAULT_TM_PORT,
            speed_difference:       -1000.0,
            spawn_probability:      hx_traffic::spawner::DEFAULT_SPAWN_PROBABILITY,
            vehicle_filter:         hx_traffic::spawner::DEFAULT_VEHICLE_FILTER.to_string(),
            burst_rounds:           hx_traffic::burst::DEFAULT_BURST_ROUNDS,
            round_interval_seconds: hx_traffic::burst::DEFAULT_ROUND_INTERVAL_SECS,
            poll_interval_ms:       1,
            join_timeout_seconds:   2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSection {
    /// Pose of slot 0.
    pub origin:  Location,
    /// Lateral distance between lanes, metres.
    pub spacing: f32,
    pub count:   usize,
}

impl Default for LaneSection {
    fn default() -> Self {
        Self {
            origin:  Location::new(
                hx_traffic::slots::DEFAULT_SLOT_X,
                hx_traffic::slots::DEFAULT_LANE_ORIGIN_Y,
                hx_traffic::slots::DEFAULT_SLOT_Z,
            ),
            spacing: hx_traffic::slots::DEFAULT_LANE_SPACING,
            count:   hx_traffic::slots::DEFAULT_LANE_COUNT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// Fixed step used to fast-forward idle stretches.
    pub accelerate_step:    f64,
    /// Fixed step applied briefly during setup.
    pub pulse_step:         f64,
    /// Real seconds the pulse step is held.
    pub pulse_hold_seconds: f64,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self { accelerate_step: 0.05, pulse_step: 0.1, pulse_hold_seconds: 0.4 }
    }
}

impl ClockSection {
    pub fn pulse_hold(&self) -> Duration {
        seconds(self.pulse_hold_seconds)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    pub region: Region,
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self { region: Region { min_x: 500.0, max_x: 520.0, min_y: 0.0, max_y: 30.0 } }
    }
}

/// Optional branches of the termination race and their timings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSection {
    /// Attach the per-tick traffic refresh sequence.
    pub traffic_refresh:      bool,
    /// Attach the accelerate / wait / restore sequence.
    pub skip_ahead:           bool,
    pub refresh_repeats:      u32,
    pub refresh_wait_seconds: f64,
    pub refresh_tail_seconds: f64,
    pub skip_wait_seconds:    f64,
}

impl Default for TreeSection {
    fn default() -> Self {
        Self {
            traffic_refresh:      false,
            skip_ahead:           false,
            refresh_repeats:      5,
            refresh_wait_seconds: 5.0,
            refresh_tail_seconds: 20.0,
            skip_wait_seconds:    10.0,
        }
    }
}

// ── ScenarioConfig ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub traffic:         TrafficSection,
    pub lanes:           LaneSection,
    pub clock:           ClockSection,
    pub trigger:         TriggerSection,
    pub tree:            TreeSection,
    /// Simulated seconds before the runner gives up on the trigger.
    pub timeout_seconds: f64,
    /// Root seed for every spawn decision.  `None` draws from OS entropy.
    pub seed:            Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            traffic:         TrafficSection::default(),
            lanes:           LaneSection::default(),
            clock:           ClockSection::default(),
            trigger:         TriggerSection::default(),
            tree:            TreeSection::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            seed:            None,
        }
    }
}

/// Negative values become zero; values too large for a `Duration` saturate.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

fn non_negative(what: &str, value: f64) -> ScenarioResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScenarioError::Config(format!("{what} must be finite and >= 0, got {value}")));
    }
    Ok(())
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> ScenarioResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ScenarioResult<()> {
        let p = self.traffic.spawn_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(HxError::InvalidProbability(p).into());
        }
        non_negative("traffic.round_interval_seconds", self.traffic.round_interval_seconds)?;
        non_negative("traffic.join_timeout_seconds", self.traffic.join_timeout_seconds)?;
        if self.lanes.count > usize::from(u8::MAX) {
            return Err(ScenarioError::Config(format!("lanes.count {} exceeds {}", self.lanes.count, u8::MAX)));
        }
        WorldSettings::fixed(self.clock.accelerate_step)?;
        WorldSettings::fixed(self.clock.pulse_step)?;
        non_negative("clock.pulse_hold_seconds", self.clock.pulse_hold_seconds)?;
        self.trigger.region.validate()?;
        non_negative("tree.refresh_wait_seconds", self.tree.refresh_wait_seconds)?;
        non_negative("tree.refresh_tail_seconds", self.tree.refresh_tail_seconds)?;
        non_negative("tree.skip_wait_seconds", self.tree.skip_wait_seconds)?;
        if !(self.timeout_seconds.is_finite() && self.timeout_seconds > 0.0) {
            return Err(ScenarioError::Config(format!(
                "timeout_seconds must be positive, got {}",
                self.timeout_seconds
            )));
        }
        Ok(())
    }

    pub fn spawner_config(&self) -> SpawnerConfig {
        SpawnerConfig {
            tm_port:           self.traffic.tm_port,
            spawn_probability: self.traffic.spawn_probability,
            vehicle_filter:    self.traffic.vehicle_filter.clone(),
        }
    }

    pub fn burst_config(&self) -> BurstConfig {
        BurstConfig {
            rounds:              self.traffic.burst_rounds,
            round_interval_secs: self.traffic.round_interval_seconds,
            poll_interval:       Duration::from_millis(self.traffic.poll_interval_ms),
        }
    }

    pub fn lane_layout(&self) -> LaneLayout {
        LaneLayout::uniform(self.lanes.origin, self.lanes.spacing, self.lanes.count)
    }

    pub fn join_timeout(&self) -> Duration {
        seconds(self.traffic.join_timeout_seconds)
    }
}
