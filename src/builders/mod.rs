//! Builders that assemble a runnable simulation from configuration.

pub mod simulation_builder;

pub use simulation_builder::SimulationBuilder;
