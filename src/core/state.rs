//! Shared simulation state and the wait/wake protocol.
//!
//! Everything mutable that more than one thread touches lives in a single
//! [`Monitor`]: the player pool, every instance record, the two lifecycle
//! flags and the generation totals. One lock, one condition variable, and
//! every wake is a broadcast.
//!
//! The public methods are the only way in, and each one performs its whole
//! check-and-mutate inside one critical section.

use std::fmt;
use std::time::Duration;

use crate::config::EndPolicy;
use crate::core::instance::{InstanceRecord, InstanceStatus};
use crate::core::pool::{ResourceCounts, ResourcePool};
use crate::monitor::Monitor;
use crate::util::pad;

/// Width of one instance column in a status line.
const STATUS_COLUMN_WIDTH: usize = 12;

#[derive(Debug)]
struct SimState {
    pool: ResourcePool,
    instances: Vec<InstanceRecord>,
    /// Set once by the first worker that finds the pool exhausted.
    bonus_mode_active: bool,
    /// Set once; nothing is reserved or generated afterwards (under
    /// [`EndPolicy::Halt`]).
    simulation_ended: bool,
    generated: ResourceCounts,
}

/// Point-in-time status of every instance, captured under the state lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    statuses: Vec<InstanceStatus>,
}

impl StatusSnapshot {
    fn capture(instances: &[InstanceRecord]) -> Self {
        Self {
            statuses: instances.iter().map(|record| record.status).collect(),
        }
    }

    /// Status of each instance, by index.
    #[must_use]
    pub fn statuses(&self) -> &[InstanceStatus] {
        &self.statuses
    }

    /// Number of instances running a party.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|status| **status == InstanceStatus::Active)
            .count()
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Status] ")?;
        for (id, status) in self.statuses.iter().enumerate() {
            f.write_str(&pad(&format!("I{id}:{status}"), STATUS_COLUMN_WIDTH))?;
        }
        Ok(())
    }
}

/// What a worker got from [`SharedState::begin_party`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// A party was reserved; the snapshot shows this instance as active.
    Reserved(StatusSnapshot),
    /// No party is or will be available. The worker should exit.
    Finished,
}

/// Result of one admission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Reserved or finished.
    pub outcome: AdmissionOutcome,
    /// This call was the one that switched bonus mode on.
    pub activated_bonus_mode: bool,
}

/// Shared state for every instance worker and the generator.
#[derive(Debug)]
pub struct SharedState {
    monitor: Monitor<SimState>,
    /// Whether a generator will ever add players. Without one, exhaustion is
    /// final and workers never block.
    replenishing: bool,
}

impl SharedState {
    /// Creates state for `instances` idle instances over `initial` players.
    #[must_use]
    pub fn new(initial: ResourceCounts, instances: usize, replenishing: bool) -> Self {
        Self {
            monitor: Monitor::new(SimState {
                pool: ResourcePool::new(initial),
                instances: vec![InstanceRecord::default(); instances],
                bonus_mode_active: false,
                simulation_ended: false,
                generated: ResourceCounts::ZERO,
            }),
            replenishing,
        }
    }

    /// Whether a generator is expected to replenish the pool.
    #[must_use]
    pub const fn is_replenishing(&self) -> bool {
        self.replenishing
    }

    /// Whether the pool currently holds a full party.
    #[must_use]
    pub fn can_form_party(&self) -> bool {
        self.monitor.lock().pool.can_form_party()
    }

    /// Players currently in the pool.
    #[must_use]
    pub fn available(&self) -> ResourceCounts {
        self.monitor.lock().pool.available()
    }

    /// Players added by the generator so far.
    #[must_use]
    pub fn generated(&self) -> ResourceCounts {
        self.monitor.lock().generated
    }

    /// Whether bonus generation has been switched on.
    #[must_use]
    pub fn is_bonus_mode_active(&self) -> bool {
        self.monitor.lock().bonus_mode_active
    }

    /// Whether the simulation has been declared ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.monitor.lock().simulation_ended
    }

    /// Copy of one instance's record.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn instance(&self, id: usize) -> InstanceRecord {
        self.monitor.lock().instances[id]
    }

    /// Copy of every instance record.
    #[must_use]
    pub fn instances(&self) -> Vec<InstanceRecord> {
        self.monitor.lock().instances.clone()
    }

    /// Consistent status of every instance.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::capture(&self.monitor.lock().instances)
    }

    /// Reserve a party for instance `id`, blocking while none is available
    /// and more players may still arrive.
    ///
    /// With a replenishing generator, the first caller to find the pool
    /// exhausted switches bonus mode on and wakes everyone (the generator
    /// included). The caller then waits until a party can be formed or the
    /// simulation ends. The exhaustion check, the wait and the reservation
    /// happen in one critical section.
    ///
    /// Without a generator, an exhausted pool finishes the caller at once.
    ///
    /// Once the simulation has ended, [`EndPolicy::Halt`] refuses every
    /// reservation, while [`EndPolicy::Drain`] keeps admitting until the
    /// pool runs dry.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn begin_party(&self, id: usize, policy: EndPolicy) -> Admission {
        let mut state = self.monitor.lock();
        let mut activated_bonus_mode = false;

        if self.replenishing {
            if !state.pool.can_form_party() && !state.bonus_mode_active && !state.simulation_ended
            {
                state.bonus_mode_active = true;
                activated_bonus_mode = true;
                self.monitor.notify_all();
            }
            self.monitor.wait_until(&mut state, |s| {
                s.pool.can_form_party() || s.simulation_ended
            });
        }

        let reserved = match (state.simulation_ended, policy) {
            (true, EndPolicy::Halt) => false,
            _ => state.pool.reserve_party(),
        };

        if !reserved {
            state.instances[id].status = InstanceStatus::Empty;
            return Admission {
                outcome: AdmissionOutcome::Finished,
                activated_bonus_mode,
            };
        }

        state.instances[id].status = InstanceStatus::Active;
        Admission {
            outcome: AdmissionOutcome::Reserved(StatusSnapshot::capture(&state.instances)),
            activated_bonus_mode,
        }
    }

    /// Record a finished run of `duration_secs` for instance `id` and mark
    /// it empty. The pool is not touched.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn complete_party(&self, id: usize, duration_secs: u32) -> StatusSnapshot {
        let mut state = self.monitor.lock();
        let record = &mut state.instances[id];
        record.units_served += 1;
        record.total_duration_secs += u64::from(duration_secs);
        record.status = InstanceStatus::Empty;
        StatusSnapshot::capture(&state.instances)
    }

    /// Block until bonus mode is switched on or the simulation ends.
    ///
    /// Returns `true` if generation should start, `false` if the simulation
    /// ended first.
    pub fn wait_for_bonus_mode(&self) -> bool {
        let mut state = self.monitor.lock();
        self.monitor
            .wait_until(&mut state, |s| s.bonus_mode_active || s.simulation_ended);
        !state.simulation_ended
    }

    /// Add a generated wave to the pool and wake every waiter.
    ///
    /// Returns `false` without adding anything once the simulation has
    /// ended.
    pub fn replenish(&self, wave: ResourceCounts) -> bool {
        let mut state = self.monitor.lock();
        if state.simulation_ended {
            return false;
        }
        state.pool.replenish(wave);
        state.generated = state.generated.saturating_add(wave);
        drop(state);
        self.monitor.notify_all();
        true
    }

    /// Declare the simulation ended and wake every waiter.
    ///
    /// Returns `true` if this call made the transition, `false` if it had
    /// already happened.
    pub fn end_simulation(&self) -> bool {
        let mut state = self.monitor.lock();
        if state.simulation_ended {
            return false;
        }
        state.simulation_ended = true;
        drop(state);
        self.monitor.notify_all();
        true
    }

    /// Sleep for up to `timeout`, returning early if the simulation ends.
    ///
    /// Returns `true` if the simulation has ended.
    pub fn wait_for_end(&self, timeout: Duration) -> bool {
        let mut state = self.monitor.lock();
        self.monitor
            .wait_until_for(&mut state, |s| s.simulation_ended, timeout)
    }
}
