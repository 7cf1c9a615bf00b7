//! Dungeon instances: per-instance records and the worker loop.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EndPolicy;
use crate::core::state::{AdmissionOutcome, SharedState};
use crate::util::{Console, RandomSource};

/// Whether an instance is running a party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Idle, or finished for good.
    #[default]
    Empty,
    /// Running a party.
    Active,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Active => f.write_str("active"),
        }
    }
}

/// Running totals for one instance.
///
/// Written only by the owning worker, always under the shared state lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Current status.
    pub status: InstanceStatus,
    /// Parties completed.
    pub units_served: u32,
    /// Sum of completed run durations, in simulated seconds.
    pub total_duration_secs: u64,
}

/// Everything an instance worker needs besides its id.
pub(crate) struct WorkerContext {
    pub(crate) state: Arc<SharedState>,
    pub(crate) random: Arc<dyn RandomSource>,
    pub(crate) console: Arc<dyn Console>,
    pub(crate) min_duration_secs: u32,
    pub(crate) max_duration_secs: u32,
    pub(crate) time_unit: Duration,
    pub(crate) end_policy: EndPolicy,
}

/// One dungeon instance, run on its own thread.
pub(crate) struct InstanceWorker {
    id: usize,
    ctx: Arc<WorkerContext>,
}

impl InstanceWorker {
    pub(crate) const fn new(id: usize, ctx: Arc<WorkerContext>) -> Self {
        Self { id, ctx }
    }

    /// Form and run parties until no more can ever be formed.
    pub(crate) fn run(self) {
        let id = self.id;
        let ctx = &*self.ctx;
        debug!(instance = id, "instance started");

        loop {
            let admission = ctx.state.begin_party(id, ctx.end_policy);

            if admission.activated_bonus_mode {
                info!(instance = id, "initial players exhausted; bonus generation requested");
                ctx.console.emit_block(&[
                    String::new(),
                    "[SYSTEM] Initial players exhausted. Activating bonus player generation..."
                        .to_string(),
                    String::new(),
                ]);
            }

            let snapshot = match admission.outcome {
                AdmissionOutcome::Reserved(snapshot) => snapshot,
                AdmissionOutcome::Finished => break,
            };

            let duration = ctx
                .random
                .int_in(ctx.min_duration_secs, ctx.max_duration_secs);
            debug!(instance = id, duration_secs = duration, "party formed");
            ctx.console.emit_block(&[
                format!("[I{id}] Dungeon started ({duration}s)"),
                snapshot.to_string(),
            ]);

            thread::sleep(ctx.time_unit.saturating_mul(duration));

            let snapshot = ctx.state.complete_party(id, duration);
            debug!(instance = id, duration_secs = duration, "party completed");
            ctx.console.emit_block(&[
                format!("[I{id}] Dungeon completed ({duration}s)"),
                snapshot.to_string(),
            ]);
        }

        let record = ctx.state.instance(id);
        debug!(
            instance = id,
            served = record.units_served,
            total_secs = record.total_duration_secs,
            "instance finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResourceCounts;
    use crate::util::{MemoryConsole, ThreadRandom};

    fn context(
        state: Arc<SharedState>,
        console: Arc<MemoryConsole>,
        duration: u32,
    ) -> Arc<WorkerContext> {
        Arc::new(WorkerContext {
            state,
            random: Arc::new(ThreadRandom),
            console,
            min_duration_secs: duration,
            max_duration_secs: duration,
            time_unit: Duration::from_millis(5),
            end_policy: EndPolicy::Halt,
        })
    }

    #[test]
    fn test_status_display() {
        assert_eq!(InstanceStatus::Empty.to_string(), "empty");
        assert_eq!(InstanceStatus::Active.to_string(), "active");
    }

    #[test]
    fn test_worker_runs_until_pool_exhausted() {
        let state = Arc::new(SharedState::new(ResourceCounts::new(2, 2, 7), 1, false));
        let console = Arc::new(MemoryConsole::new());

        InstanceWorker::new(0, context(Arc::clone(&state), Arc::clone(&console), 3)).run();

        let record = state.instance(0);
        assert_eq!(record.units_served, 2);
        assert_eq!(record.total_duration_secs, 6);
        assert_eq!(record.status, InstanceStatus::Empty);
        assert_eq!(state.available(), ResourceCounts::new(0, 0, 1));

        assert_eq!(console.lines_starting_with("[I0] Dungeon started (3s)").len(), 2);
        assert_eq!(console.lines_starting_with("[I0] Dungeon completed (3s)").len(), 2);
        assert_eq!(console.lines_starting_with("[Status] I0:active").len(), 2);
        assert_eq!(console.lines_starting_with("[Status] I0:empty").len(), 2);
    }

    #[test]
    fn test_worker_with_empty_pool_never_activates() {
        let state = Arc::new(SharedState::new(ResourceCounts::ZERO, 1, false));
        let console = Arc::new(MemoryConsole::new());

        InstanceWorker::new(0, context(Arc::clone(&state), Arc::clone(&console), 1)).run();

        assert_eq!(state.instance(0), InstanceRecord::default());
        assert!(console.lines().is_empty());
    }
}
