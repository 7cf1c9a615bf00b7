//! Collaborator seams used by the core: randomness, console output, text
//! layout, and telemetry setup.

pub mod console;
pub mod random;
pub mod telemetry;
pub mod text;

pub use console::{Console, MemoryConsole, StdoutConsole};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use telemetry::init_tracing;
pub use text::pad;
