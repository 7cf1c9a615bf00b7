//! # LFG Parking Lot
//!
//! A dungeon-finder simulation built around one condition-variable monitor.
//!
//! A fixed number of dungeon *instances* run on their own OS threads and
//! compete for a shared pool of players. Whenever the pool holds one tank,
//! one healer and three DPS, an instance reserves them, runs the dungeon for
//! a random duration, and goes back for more. Players spent on a party do not
//! return to the pool.
//!
//! When the pool runs dry, the first instance to notice switches on *bonus
//! mode*. An optional generator thread then adds random waves of players
//! until its time budget runs out, at which point the simulation ends and
//! every blocked instance exits.
//!
//! ## Coordination
//!
//! - **One lock**: the pool, every instance record, and the lifecycle flags
//!   share a single [`Monitor`].
//! - **Atomic check-and-wait**: an instance checks the pool, waits, and
//!   reserves in one critical section, so no wakeup is lost between a failed
//!   check and the wait.
//! - **Broadcast wakes**: every state change wakes all waiters, and each
//!   re-checks its own predicate.
//! - **Monotonic shutdown**: the end flag is set once and never cleared.
//!
//! ## Example
//!
//! ```
//! use lfg_parking_lot::builders::SimulationBuilder;
//! use lfg_parking_lot::config::SimulationConfig;
//! use lfg_parking_lot::util::MemoryConsole;
//! use std::sync::Arc;
//!
//! let config = SimulationConfig {
//!     instances: 3,
//!     tanks: 3,
//!     healers: 3,
//!     dps: 9,
//!     time_unit_ms: 1,
//!     generator: None,
//!     ..SimulationConfig::default()
//! };
//!
//! let report = SimulationBuilder::new(config)
//!     .with_console(Arc::new(MemoryConsole::new()))
//!     .build()?
//!     .run()?;
//!
//! assert_eq!(report.total_parties, 3);
//! assert!(report.remaining.is_zero());
//! # Ok::<(), lfg_parking_lot::core::SimulationError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Builders to construct a simulation from configuration.
pub mod builders;
/// Configuration models and parameter validation.
pub mod config;
/// Pool accounting, workers, generator, and orchestration.
pub mod core;
/// Mutex and condition variable pairing.
pub mod monitor;
/// Collaborator seams: randomness, console, text, telemetry.
pub mod util;

pub use builders::SimulationBuilder;
pub use monitor::Monitor;
