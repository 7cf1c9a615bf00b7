//! Configuration models for the simulation and its generator.

pub mod simulation;

pub use simulation::{
    ConfigError, DurationClamp, EndPolicy, GeneratorConfig, RawParameters, SimulationConfig,
    WaveRange, MAX_DURATION_SECS, MAX_INSTANCES, MAX_PLAYERS,
};
