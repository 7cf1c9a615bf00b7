//! `lfg-sim`: run a dungeon finder simulation from the command line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};

use lfg_parking_lot::config::{EndPolicy, GeneratorConfig, RawParameters};
use lfg_parking_lot::core::{banner_lines, AppResult, SimulationHandle, PARTY_REQUIREMENT};
use lfg_parking_lot::util::{init_tracing, Console, StdoutConsole};
use lfg_parking_lot::SimulationBuilder;

/// Simulate dungeon instances competing for a shared pool of players.
#[derive(Parser, Debug)]
#[command(name = "lfg-sim", version, about, allow_negative_numbers = true)]
struct Cli {
    /// Number of concurrent dungeon instances (1-100)
    instances: i64,
    /// Initial tanks in the pool
    tanks: i64,
    /// Initial healers in the pool
    healers: i64,
    /// Initial DPS in the pool
    dps: i64,
    /// Shortest dungeon run, in seconds
    t1: i64,
    /// Longest dungeon run, in seconds (clamped to 15)
    t2: i64,
    /// Seconds to generate bonus players (0 or omitted = until Ctrl-C)
    bonus_duration: Option<i64>,

    /// Run without a bonus generator; the initial pool is all there is
    #[arg(long)]
    no_generator: bool,

    /// After the bonus duration ends, keep forming parties from what is left
    #[arg(long)]
    drain: bool,

    /// Seed for reproducible draws
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// JSON file with generator tuning (interval, probability, wave sizes)
    #[arg(long, value_name = "PATH")]
    generator_config: Option<PathBuf>,

    /// Wall-clock milliseconds per simulated second
    #[arg(long, default_value_t = 1_000)]
    time_unit_ms: u64,
}

impl Cli {
    fn raw_parameters(&self) -> RawParameters {
        RawParameters {
            instances: self.instances,
            tanks: self.tanks,
            healers: self.healers,
            dps: self.dps,
            t1: self.t1,
            t2: self.t2,
            bonus_duration: self.bonus_duration,
        }
    }

    fn generator(&self) -> AppResult<Option<GeneratorConfig>> {
        if self.no_generator {
            return Ok(None);
        }
        let Some(path) = &self.generator_config else {
            return Ok(Some(GeneratorConfig::default()));
        };
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("reading generator config {}", path.display()))?;
        let generator = GeneratorConfig::from_json_str(&input)
            .with_context(|| format!("loading generator config {}", path.display()))?;
        Ok(Some(generator))
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "simulation failed");
            eprintln!("{}", failure_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// The single stderr line for a failed run, with the full context chain.
fn failure_line(error: &anyhow::Error) -> String {
    format!("Error: {error:#}")
}

fn run(cli: &Cli) -> AppResult<()> {
    let mut config = cli.raw_parameters().into_config(cli.generator()?)?;
    config.time_unit_ms = cli.time_unit_ms;
    if cli.drain {
        config.end_policy = EndPolicy::Drain;
    }

    let console: Arc<dyn Console> = Arc::new(StdoutConsole::new());
    for clamp in config.clamp_durations() {
        console.emit(&clamp.to_string());
    }
    if !config.initial_pool().covers(&PARTY_REQUIREMENT) {
        console.emit(
            "Warning: Not enough players to form even one party (need 1 Tank, 1 Healer, 3 DPS)",
        );
    }
    console.emit_block(&banner_lines(&config));

    let mut builder = SimulationBuilder::new(config).with_console(Arc::clone(&console));
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }
    let simulation = builder.build()?;
    info!(run_id = %simulation.run_id(), "simulation built");

    install_interrupt_handler(simulation.handle());

    let report = simulation.run()?;
    if cli.json {
        console.emit(&report.to_json_pretty().context("serializing report")?);
    } else {
        console.emit_block(&report.render_lines());
    }
    Ok(())
}

/// End the simulation on Ctrl-C so an unbounded generator can be stopped.
#[cfg(feature = "signals")]
fn install_interrupt_handler(handle: SimulationHandle) {
    let spawned = std::thread::Builder::new()
        .name("lfg-signals".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(error = %e, "failed to create signal runtime");
                    return;
                }
            };
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("interrupt received; ending simulation");
                        handle.end();
                    }
                    Err(e) => error!(error = %e, "failed to listen for interrupt"),
                }
            });
        });
    if let Err(e) = spawned {
        error!(error = %e, "failed to spawn signal listener");
    }
}

#[cfg(not(feature = "signals"))]
fn install_interrupt_handler(_handle: SimulationHandle) {
    tracing::warn!("built without `signals`; an unbounded generator runs until killed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfg_parking_lot::config::ConfigError;

    #[test]
    fn test_failure_line_carries_context_chain() {
        let error = anyhow::Error::new(ConfigError::Parse("expected value".into()))
            .context("loading generator config gen.json");
        assert_eq!(
            failure_line(&error),
            "Error: loading generator config gen.json: generator config parse error: expected value"
        );
    }

    #[test]
    fn test_cli_rejects_negative_instances_in_config() {
        let cli = Cli::parse_from(["lfg-sim", "-2", "1", "1", "3", "1", "2", "--no-generator"]);
        let error = run(&cli).unwrap_err();
        assert_eq!(
            failure_line(&error),
            "Error: instances must be >= 1 (got -2)"
        );
    }
}
