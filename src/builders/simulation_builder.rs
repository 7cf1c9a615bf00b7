//! Builder to construct a [`Simulation`] from configuration.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::core::{Simulation, SimulationError};
use crate::util::{Console, RandomSource, SeededRandom, StdoutConsole, ThreadRandom};

/// Assembles a [`Simulation`] from a configuration and optional collaborators.
///
/// Defaults: thread-local randomness, stdout output, a fresh v4 run id.
///
/// ```
/// use lfg_parking_lot::builders::SimulationBuilder;
/// use lfg_parking_lot::config::SimulationConfig;
/// use lfg_parking_lot::util::MemoryConsole;
/// use std::sync::Arc;
///
/// let config = SimulationConfig {
///     instances: 1,
///     tanks: 1,
///     healers: 1,
///     dps: 3,
///     time_unit_ms: 1,
///     generator: None,
///     ..SimulationConfig::default()
/// };
/// let report = SimulationBuilder::new(config)
///     .with_console(Arc::new(MemoryConsole::new()))
///     .build()?
///     .run()?;
/// assert_eq!(report.total_parties, 1);
/// # Ok::<(), lfg_parking_lot::core::SimulationError>(())
/// ```
pub struct SimulationBuilder {
    config: SimulationConfig,
    random: Option<Arc<dyn RandomSource>>,
    console: Option<Arc<dyn Console>>,
    run_id: Option<Uuid>,
}

impl SimulationBuilder {
    /// Start from `config`.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            random: None,
            console: None,
            run_id: None,
        }
    }

    /// Use `random` for durations and generator waves.
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Draw from a single generator seeded with `seed`.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random(Arc::new(SeededRandom::new(seed)))
    }

    /// Send event lines to `console`.
    #[must_use]
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Tag the run with `run_id`.
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Validate the configuration and assemble the simulation.
    ///
    /// The duration range is clamped to `[1, MAX_DURATION_SECS]` the same
    /// way [`SimulationConfig::clamp_durations`] does; the built simulation's
    /// [`config`](Simulation::config) shows the bounds actually used.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] if validation fails.
    pub fn build(self) -> Result<Simulation, SimulationError> {
        Simulation::new(
            self.run_id.unwrap_or_else(Uuid::new_v4),
            self.config,
            self.random.unwrap_or_else(|| Arc::new(ThreadRandom)),
            self.console
                .unwrap_or_else(|| Arc::new(StdoutConsole::new())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, MAX_DURATION_SECS};
    use crate::util::MemoryConsole;

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = SimulationConfig {
            instances: 0,
            ..SimulationConfig::default()
        };
        let result = SimulationBuilder::new(config).build();
        assert!(matches!(
            result,
            Err(SimulationError::InvalidConfig(ConfigError::InstanceCount(0)))
        ));
    }

    #[test]
    fn test_build_keeps_run_id() {
        let run_id = Uuid::new_v4();
        let simulation = SimulationBuilder::new(SimulationConfig::default())
            .with_run_id(run_id)
            .with_seed(7)
            .with_console(Arc::new(MemoryConsole::new()))
            .build()
            .unwrap();
        assert_eq!(simulation.run_id(), run_id);
        assert!(simulation.config().generator.is_some());
        assert!(!simulation.handle().state().is_ended());
    }

    #[test]
    fn test_build_clamps_long_durations() {
        let config = SimulationConfig {
            tanks: 1,
            healers: 1,
            dps: 3,
            min_duration_secs: 40,
            max_duration_secs: 100,
            time_unit_ms: 1,
            generator: None,
            ..SimulationConfig::default()
        };
        let simulation = SimulationBuilder::new(config)
            .with_console(Arc::new(MemoryConsole::new()))
            .build()
            .unwrap();
        assert_eq!(simulation.config().min_duration_secs, MAX_DURATION_SECS);
        assert_eq!(simulation.config().max_duration_secs, MAX_DURATION_SECS);

        let report = simulation.run().unwrap();
        assert_eq!(report.total_parties, 1);
        assert_eq!(report.total_duration_secs, u64::from(MAX_DURATION_SECS));
    }

    #[test]
    fn test_build_keeps_durations_in_range() {
        let config = SimulationConfig {
            min_duration_secs: 2,
            max_duration_secs: 9,
            ..SimulationConfig::default()
        };
        let simulation = SimulationBuilder::new(config)
            .with_console(Arc::new(MemoryConsole::new()))
            .build()
            .unwrap();
        assert_eq!(simulation.config().min_duration_secs, 2);
        assert_eq!(simulation.config().max_duration_secs, 9);
    }
}
