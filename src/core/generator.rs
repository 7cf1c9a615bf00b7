//! Bonus player generator.
//!
//! Sleeps until some instance finds the pool exhausted, then adds random
//! waves of players on a fixed tick until its time budget runs out (or
//! forever, if unbounded, until something else ends the simulation).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{GeneratorConfig, WaveRange};
use crate::core::pool::ResourceCounts;
use crate::core::state::SharedState;
use crate::util::{Console, RandomSource};

/// How a generator run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOutcome {
    /// Waves added to the pool.
    pub waves: u32,
    /// Whether bonus mode was ever reached.
    pub activated: bool,
    /// Whether the generator ended the simulation because its budget ran out.
    pub budget_expired: bool,
}

/// The single producer that adds players to the pool.
pub struct ResourceGenerator {
    state: Arc<SharedState>,
    config: GeneratorConfig,
    time_unit: Duration,
    random: Arc<dyn RandomSource>,
    console: Arc<dyn Console>,
}

impl ResourceGenerator {
    /// Creates a generator over `state`. The budget in `config` is measured
    /// in `time_unit`s.
    pub fn new(
        state: Arc<SharedState>,
        config: GeneratorConfig,
        time_unit: Duration,
        random: Arc<dyn RandomSource>,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            state,
            config,
            time_unit,
            random,
            console,
        }
    }

    /// Roll for one wave.
    ///
    /// Returns `None` if the tick's chance fails or every drawn quantity is
    /// zero.
    #[must_use]
    pub fn roll_wave(&self) -> Option<ResourceCounts> {
        if !self.random.chance(self.config.generation_probability) {
            return None;
        }
        let draw = |range: WaveRange| self.random.int_in(range.min, range.max);
        let wave = ResourceCounts::new(
            draw(self.config.tanks_per_wave),
            draw(self.config.healers_per_wave),
            draw(self.config.dps_per_wave),
        );
        (!wave.is_zero()).then_some(wave)
    }

    /// Run to completion on the calling thread.
    ///
    /// Blocks until bonus mode or the end of the simulation, then generates
    /// on every tick until the budget expires or something else ends the
    /// simulation.
    pub fn run(self) -> GeneratorOutcome {
        let mut outcome = GeneratorOutcome {
            waves: 0,
            activated: false,
            budget_expired: false,
        };

        if !self.state.wait_for_bonus_mode() {
            debug!("simulation ended before bonus mode; generator exiting");
            return outcome;
        }

        outcome.activated = true;
        let budget = self.config.time_budget(self.time_unit);
        let interval = self.config.check_interval();
        let started = Instant::now();
        info!(?budget, ?interval, "bonus generation started");

        loop {
            if budget.is_some_and(|budget| started.elapsed() >= budget) {
                outcome.budget_expired = self.state.end_simulation();
                break;
            }

            if let Some(wave) = self.roll_wave() {
                if self.state.replenish(wave) {
                    outcome.waves += 1;
                    info!(
                        tanks = wave.tanks,
                        healers = wave.healers,
                        dps = wave.dps,
                        "bonus wave added"
                    );
                    self.console.emit(&format!(
                        "[Player Generator] Added players - Tanks: {}, Healers: {}, DPS: {}",
                        wave.tanks, wave.healers, wave.dps
                    ));
                }
            }

            if self.state.wait_for_end(interval) {
                debug!("simulation ended externally; generator exiting");
                break;
            }
        }

        if outcome.budget_expired {
            info!(waves = outcome.waves, "bonus duration ended");
            self.console.emit_block(&[
                String::new(),
                "[SYSTEM] Bonus duration ended. Finishing remaining dungeons...".to_string(),
                String::new(),
            ]);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndPolicy;
    use crate::util::{MemoryConsole, ThreadRandom};
    use std::thread;

    fn generator(state: Arc<SharedState>, config: GeneratorConfig) -> ResourceGenerator {
        ResourceGenerator::new(
            state,
            config,
            Duration::from_millis(10),
            Arc::new(ThreadRandom),
            Arc::new(MemoryConsole::new()),
        )
    }

    fn always(wave: ResourceCounts) -> GeneratorConfig {
        GeneratorConfig {
            generation_probability: 1.0,
            check_interval_ms: 5,
            tanks_per_wave: WaveRange::exactly(wave.tanks),
            healers_per_wave: WaveRange::exactly(wave.healers),
            dps_per_wave: WaveRange::exactly(wave.dps),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_roll_wave_never_with_zero_probability() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        let mut config = always(ResourceCounts::new(1, 1, 1));
        config.generation_probability = 0.0;
        let generator = generator(state, config);
        for _ in 0..100 {
            assert_eq!(generator.roll_wave(), None);
        }
    }

    #[test]
    fn test_roll_wave_drops_empty_waves() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        let generator = generator(state, always(ResourceCounts::ZERO));
        assert_eq!(generator.roll_wave(), None);
    }

    #[test]
    fn test_roll_wave_respects_bounds() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        let generator = generator(state, GeneratorConfig {
            generation_probability: 1.0,
            ..GeneratorConfig::default()
        });
        for _ in 0..200 {
            if let Some(wave) = generator.roll_wave() {
                assert!(wave.tanks <= 2 && wave.healers <= 2 && wave.dps <= 5);
                assert!(!wave.is_zero());
            }
        }
    }

    #[test]
    fn test_generator_exits_if_ended_before_bonus_mode() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        state.end_simulation();
        let generator = generator(Arc::clone(&state), always(ResourceCounts::new(1, 1, 3)));

        let outcome = generator.run();
        assert!(!outcome.activated);
        assert_eq!(outcome.waves, 0);
        assert_eq!(state.generated(), ResourceCounts::ZERO);
    }

    #[test]
    fn test_budget_ends_simulation() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        let mut config = always(ResourceCounts::new(1, 0, 0));
        config.bonus_duration_secs = 3;
        let generator = generator(Arc::clone(&state), config);

        // Stand in for an instance that found the pool exhausted.
        let trigger = Arc::clone(&state);
        let waiter = thread::spawn(move || {
            trigger.begin_party(0, EndPolicy::Halt)
        });

        let outcome = generator.run();
        assert!(outcome.activated);
        assert!(outcome.budget_expired);
        assert!(outcome.waves >= 1);
        assert!(state.is_ended());
        assert_eq!(state.generated().tanks, outcome.waves);
        waiter.join().unwrap();
    }

    #[test]
    fn test_unbounded_generator_stops_on_external_end() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, true));
        let generator = generator(Arc::clone(&state), always(ResourceCounts::new(0, 1, 0)));

        let handle = thread::spawn(move || generator.run());
        let trigger = Arc::clone(&state);
        let waiter = thread::spawn(move || {
            trigger.begin_party(0, EndPolicy::Halt)
        });

        while !state.is_bonus_mode_active() {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(20));
        assert!(state.end_simulation());

        let outcome = handle.join().unwrap();
        assert!(outcome.activated);
        assert!(!outcome.budget_expired);
        waiter.join().unwrap();
    }
}
