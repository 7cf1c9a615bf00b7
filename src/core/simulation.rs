//! Simulation orchestration: one OS thread per instance plus the generator.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::core::error::SimulationError;
use crate::core::generator::ResourceGenerator;
use crate::core::instance::{InstanceWorker, WorkerContext};
use crate::core::report::SimulationReport;
use crate::core::state::SharedState;
use crate::util::{Console, RandomSource};

/// Handle for ending a running simulation from another thread.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    state: Arc<SharedState>,
}

impl SimulationHandle {
    /// Declare the simulation ended. Blocked instances and the generator
    /// wake and exit; running parties finish first.
    ///
    /// Returns `false` if the simulation had already ended.
    pub fn end(&self) -> bool {
        self.state.end_simulation()
    }

    /// Live view of the shared state.
    #[must_use]
    pub fn state(&self) -> &SharedState {
        &self.state
    }
}

/// A configured, not yet started simulation run.
///
/// Built with [`SimulationBuilder`](crate::builders::SimulationBuilder).
pub struct Simulation {
    run_id: Uuid,
    config: SimulationConfig,
    state: Arc<SharedState>,
    random: Arc<dyn RandomSource>,
    console: Arc<dyn Console>,
}

impl Simulation {
    pub(crate) fn new(
        run_id: Uuid,
        mut config: SimulationConfig,
        random: Arc<dyn RandomSource>,
        console: Arc<dyn Console>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        for clamp in config.clamp_durations() {
            warn!(
                bound = clamp.bound,
                from = clamp.from,
                to = clamp.to,
                "duration bound clamped"
            );
        }
        let state = Arc::new(SharedState::new(
            config.initial_pool(),
            config.instances,
            config.generator.is_some(),
        ));
        Ok(Self {
            run_id,
            config,
            state,
            random,
            console,
        })
    }

    /// Identifier attached to this run's logs and report.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// A handle that can end the run while [`run`](Self::run) is blocking.
    #[must_use]
    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Run to completion on dedicated threads and return the final report.
    ///
    /// Once every instance has exited the simulation is declared ended,
    /// which releases the generator if it is still waiting or generating.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::Spawn`] if a thread cannot be started. Threads
    ///   already running are ended and joined first.
    /// - [`SimulationError::ThreadPanicked`] if any thread panicked. All
    ///   other threads are still joined.
    pub fn run(self) -> Result<SimulationReport, SimulationError> {
        info!(
            run_id = %self.run_id,
            instances = self.config.instances,
            initial = %self.config.initial_pool(),
            generator = self.config.generator.is_some(),
            "starting simulation"
        );

        let ctx = Arc::new(WorkerContext {
            state: Arc::clone(&self.state),
            random: Arc::clone(&self.random),
            console: Arc::clone(&self.console),
            min_duration_secs: self.config.min_duration_secs,
            max_duration_secs: self.config.max_duration_secs,
            time_unit: self.config.time_unit(),
            end_policy: self.config.end_policy,
        });

        let mut instances = Vec::with_capacity(self.config.instances);
        for id in 0..self.config.instances {
            let worker = InstanceWorker::new(id, Arc::clone(&ctx));
            match spawn_named(format!("lfg-instance-{id}"), move || worker.run()) {
                Ok(handle) => instances.push(handle),
                Err(e) => {
                    let _joined = self.abort(instances);
                    return Err(e);
                }
            }
        }

        let generator = match &self.config.generator {
            Some(generator_config) => {
                let generator = ResourceGenerator::new(
                    Arc::clone(&self.state),
                    generator_config.clone(),
                    self.config.time_unit(),
                    Arc::clone(&self.random),
                    Arc::clone(&self.console),
                );
                match spawn_named("lfg-generator".to_string(), move || generator.run()) {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        let _joined = self.abort(instances);
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        let mut failure = join_all(instances);

        // Nothing else will be consumed; release the generator.
        self.state.end_simulation();

        if let Some(generator) = generator {
            match join_one(generator) {
                Ok(outcome) => info!(
                    waves = outcome.waves,
                    budget_expired = outcome.budget_expired,
                    "generator finished"
                ),
                Err(e) => failure = failure.or(Some(e)),
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let report = SimulationReport::collect(self.run_id, &self.config, &self.state);
        if !report.is_balanced() {
            warn!(
                initial = %report.initial,
                consumed = %report.consumed,
                remaining = %report.remaining,
                "player accounting does not balance"
            );
        }
        info!(
            run_id = %self.run_id,
            parties = report.total_parties,
            "simulation finished"
        );
        Ok(report)
    }

    /// End the run and join whatever was started before a spawn failure.
    ///
    /// The spawn error is what the caller reports, so a panic found while
    /// joining is logged and handed back for inspection only.
    fn abort(&self, instances: Vec<(String, JoinHandle<()>)>) -> Option<SimulationError> {
        self.state.end_simulation();
        let failure = join_all(instances);
        if let Some(e) = &failure {
            warn!(error = %e, "thread failed while aborting after a spawn error");
        }
        failure
    }
}

fn spawn_named<T, F>(name: String, f: F) -> Result<(String, JoinHandle<T>), SimulationError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match thread::Builder::new().name(name.clone()).spawn(f) {
        Ok(handle) => Ok((name, handle)),
        Err(source) => {
            error!(thread = %name, error = %source, "failed to spawn thread");
            Err(SimulationError::Spawn { name, source })
        }
    }
}

fn join_one<T>((name, handle): (String, JoinHandle<T>)) -> Result<T, SimulationError> {
    handle.join().map_err(|_| {
        error!(thread = %name, "thread panicked");
        SimulationError::ThreadPanicked { name }
    })
}

/// Join every handle, returning the first failure.
fn join_all(handles: Vec<(String, JoinHandle<()>)>) -> Option<SimulationError> {
    let mut failure = None;
    for handle in handles {
        if let Err(e) = join_one(handle) {
            failure = failure.or(Some(e));
        }
    }
    failure
}
