//! Simulation and generator configuration structures.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ResourceCounts;

/// Upper bound on concurrent instances.
pub const MAX_INSTANCES: usize = 100;
/// Upper bound on the initial count of any single role.
pub const MAX_PLAYERS: u32 = 10_000;
/// Ceiling applied to the party duration range, in seconds.
pub const MAX_DURATION_SECS: u32 = 15;

/// Errors produced while validating simulation parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Instance count below one.
    #[error("instances must be >= 1 (got {0})")]
    InstanceCount(i64),
    /// Instance count above [`MAX_INSTANCES`].
    #[error("too many instances: {0} (max: {max})", max = MAX_INSTANCES)]
    TooManyInstances(i64),
    /// A role count below zero.
    #[error("{role} must be >= 0 (got {value})")]
    NegativePlayers {
        /// Role name.
        role: &'static str,
        /// Offending value.
        value: i64,
    },
    /// A role count above [`MAX_PLAYERS`].
    #[error("{role} count {value} exceeds maximum ({max})", max = MAX_PLAYERS)]
    TooManyPlayers {
        /// Role name.
        role: &'static str,
        /// Offending value.
        value: i64,
    },
    /// Duration range is not `1 <= min <= max`.
    #[error("invalid time range [{min}, {max}]; need 1 <= t1 <= t2")]
    InvalidDurationRange {
        /// Lower bound supplied.
        min: i64,
        /// Upper bound supplied.
        max: i64,
    },
    /// Bonus duration below zero.
    #[error("bonus_duration must be >= 0 (0 = infinite), got {0}")]
    NegativeBonusDuration(i64),
    /// Zero-length time unit.
    #[error("time unit must be greater than 0 ms")]
    InvalidTimeUnit,
    /// Generator tuning out of range.
    #[error("invalid generator config: {0}")]
    InvalidGenerator(String),
    /// Generator config could not be parsed.
    #[error("generator config parse error: {0}")]
    Parse(String),
}

/// What workers do once the simulation has been declared ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndPolicy {
    /// No party is reserved after the end flag is set.
    #[default]
    Halt,
    /// Parties keep forming from what is left in the pool; workers stop once
    /// it can no longer form a party.
    Drain,
}

/// Inclusive bounds on how many of one role a single wave may add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveRange {
    /// Smallest quantity per wave.
    pub min: u32,
    /// Largest quantity per wave.
    pub max: u32,
}

impl WaveRange {
    /// Creates a range `[min, max]`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that always yields exactly `n`.
    #[must_use]
    pub const fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }
}

/// Tuning for the bonus player generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// How long generation runs, in simulated seconds. Zero means unbounded.
    pub bonus_duration_secs: u64,
    /// Wall-clock interval between generation attempts.
    pub check_interval_ms: u64,
    /// Chance that a given tick produces a wave.
    pub generation_probability: f64,
    /// Tanks added per wave.
    pub tanks_per_wave: WaveRange,
    /// Healers added per wave.
    pub healers_per_wave: WaveRange,
    /// DPS added per wave.
    pub dps_per_wave: WaveRange,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bonus_duration_secs: 0,
            check_interval_ms: 500,
            generation_probability: 0.3,
            tanks_per_wave: WaveRange::new(0, 2),
            healers_per_wave: WaveRange::new(0, 2),
            dps_per_wave: WaveRange::new(0, 5),
        }
    }
}

impl GeneratorConfig {
    /// Validate generator tuning values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGenerator`] for an out-of-range
    /// probability, a zero interval, or an inverted wave range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.generation_probability) {
            return Err(ConfigError::InvalidGenerator(format!(
                "generation_probability must be within [0, 1] (got {})",
                self.generation_probability
            )));
        }
        if self.check_interval_ms == 0 {
            return Err(ConfigError::InvalidGenerator(
                "check_interval_ms must be greater than 0".into(),
            ));
        }
        for (role, range) in [
            ("tanks_per_wave", self.tanks_per_wave),
            ("healers_per_wave", self.healers_per_wave),
            ("dps_per_wave", self.dps_per_wave),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvalidGenerator(format!(
                    "{role} min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// Parse generator configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the
    /// [`validate`](Self::validate) errors otherwise.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Wall-clock interval between generation attempts.
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Wall-clock generation budget, or `None` when unbounded.
    #[must_use]
    pub fn time_budget(&self, time_unit: Duration) -> Option<Duration> {
        if self.bonus_duration_secs == 0 {
            return None;
        }
        let units = u32::try_from(self.bonus_duration_secs).unwrap_or(u32::MAX);
        Some(time_unit.saturating_mul(units))
    }
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of concurrent dungeon instances.
    pub instances: usize,
    /// Initial tanks in the pool.
    pub tanks: u32,
    /// Initial healers in the pool.
    pub healers: u32,
    /// Initial DPS in the pool.
    pub dps: u32,
    /// Shortest party run, in simulated seconds.
    pub min_duration_secs: u32,
    /// Longest party run, in simulated seconds.
    pub max_duration_secs: u32,
    /// Wall-clock length of one simulated second.
    pub time_unit_ms: u64,
    /// Behavior after the simulation is declared ended.
    pub end_policy: EndPolicy,
    /// Bonus generator, or `None` to run without replenishment.
    pub generator: Option<GeneratorConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            instances: 1,
            tanks: 0,
            healers: 0,
            dps: 0,
            min_duration_secs: 1,
            max_duration_secs: 1,
            time_unit_ms: 1_000,
            end_policy: EndPolicy::Halt,
            generator: Some(GeneratorConfig::default()),
        }
    }
}

/// A bound that was pulled into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationClamp {
    /// Which bound moved, `"t1"` or `"t2"`.
    pub bound: &'static str,
    /// Value before clamping.
    pub from: u32,
    /// Value after clamping.
    pub to: u32,
}

impl fmt::Display for DurationClamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Note: {} clamped from {} to {}", self.bound, self.from, self.to)?;
        if self.bound == "t2" {
            write!(f, " (max: {MAX_DURATION_SECS})")?;
        }
        Ok(())
    }
}

impl SimulationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances == 0 {
            return Err(ConfigError::InstanceCount(0));
        }
        if self.instances > MAX_INSTANCES {
            return Err(ConfigError::TooManyInstances(
                i64::try_from(self.instances).unwrap_or(i64::MAX),
            ));
        }
        for (role, value) in [("tanks", self.tanks), ("healers", self.healers), ("dps", self.dps)] {
            if value > MAX_PLAYERS {
                return Err(ConfigError::TooManyPlayers {
                    role,
                    value: i64::from(value),
                });
            }
        }
        if self.min_duration_secs < 1 || self.min_duration_secs > self.max_duration_secs {
            return Err(ConfigError::InvalidDurationRange {
                min: i64::from(self.min_duration_secs),
                max: i64::from(self.max_duration_secs),
            });
        }
        if self.time_unit_ms == 0 {
            return Err(ConfigError::InvalidTimeUnit);
        }
        if let Some(generator) = &self.generator {
            generator.validate()?;
        }
        Ok(())
    }

    /// Clamp the duration range to `[1, MAX_DURATION_SECS]` and report what
    /// moved.
    pub fn clamp_durations(&mut self) -> Vec<DurationClamp> {
        let mut clamps = Vec::new();
        let max = self.max_duration_secs.clamp(1, MAX_DURATION_SECS);
        let min = self.min_duration_secs.clamp(1, max);

        if min != self.min_duration_secs {
            clamps.push(DurationClamp {
                bound: "t1",
                from: self.min_duration_secs,
                to: min,
            });
        }
        if max != self.max_duration_secs {
            clamps.push(DurationClamp {
                bound: "t2",
                from: self.max_duration_secs,
                to: max,
            });
        }
        self.min_duration_secs = min;
        self.max_duration_secs = max;
        clamps
    }

    /// Wall-clock length of one simulated second.
    #[must_use]
    pub const fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// The pool the simulation starts with.
    #[must_use]
    pub const fn initial_pool(&self) -> ResourceCounts {
        ResourceCounts::new(self.tanks, self.healers, self.dps)
    }
}

/// Unvalidated parameters as they arrive from the command line.
///
/// Signed so that negative input is reported as a range error rather than a
/// parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParameters {
    /// Requested instance count.
    pub instances: i64,
    /// Requested initial tanks.
    pub tanks: i64,
    /// Requested initial healers.
    pub healers: i64,
    /// Requested initial DPS.
    pub dps: i64,
    /// Requested shortest run.
    pub t1: i64,
    /// Requested longest run.
    pub t2: i64,
    /// Requested generation budget; `None` or zero means unbounded.
    pub bonus_duration: Option<i64>,
}

impl RawParameters {
    /// Range-check the parameters and build a configuration around
    /// `generator`. The bonus duration, when present, overrides the one in
    /// `generator`.
    ///
    /// Durations are not clamped here; see
    /// [`SimulationConfig::clamp_durations`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking in argument order.
    pub fn into_config(
        self,
        generator: Option<GeneratorConfig>,
    ) -> Result<SimulationConfig, ConfigError> {
        if self.instances < 1 {
            return Err(ConfigError::InstanceCount(self.instances));
        }
        let instances = usize::try_from(self.instances)
            .ok()
            .filter(|n| *n <= MAX_INSTANCES)
            .ok_or(ConfigError::TooManyInstances(self.instances))?;

        let tanks = player_count("tanks", self.tanks)?;
        let healers = player_count("healers", self.healers)?;
        let dps = player_count("dps", self.dps)?;

        if self.t1 < 1 || self.t2 < 1 || self.t1 > self.t2 {
            return Err(ConfigError::InvalidDurationRange {
                min: self.t1,
                max: self.t2,
            });
        }
        let saturate = |v: i64| u32::try_from(v).unwrap_or(u32::MAX);

        let bonus = self.bonus_duration.unwrap_or(0);
        if bonus < 0 {
            return Err(ConfigError::NegativeBonusDuration(bonus));
        }
        let generator = generator.map(|mut g| {
            if self.bonus_duration.is_some() {
                g.bonus_duration_secs = bonus.unsigned_abs();
            }
            g
        });

        let config = SimulationConfig {
            instances,
            tanks,
            healers,
            dps,
            min_duration_secs: saturate(self.t1),
            max_duration_secs: saturate(self.t2),
            generator,
            ..SimulationConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn player_count(role: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativePlayers { role, value });
    }
    u32::try_from(value)
        .ok()
        .filter(|n| *n <= MAX_PLAYERS)
        .ok_or(ConfigError::TooManyPlayers { role, value })
}
