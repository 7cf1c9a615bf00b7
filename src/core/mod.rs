//! Simulation core: player accounting, instance workers, the bonus
//! generator, and the orchestration that ties them together.

pub mod error;
pub mod generator;
pub mod instance;
pub mod pool;
pub mod report;
pub mod simulation;
pub mod state;

pub use error::{AppResult, SimulationError};
pub use generator::{GeneratorOutcome, ResourceGenerator};
pub use instance::{InstanceRecord, InstanceStatus};
pub use pool::{ResourceCounts, ResourcePool, PARTY_REQUIREMENT};
pub use report::{banner_lines, InstanceSummary, SimulationReport};
pub use simulation::{Simulation, SimulationHandle};
pub use state::{Admission, AdmissionOutcome, SharedState, StatusSnapshot};
