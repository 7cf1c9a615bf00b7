//! End-of-run reporting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::core::pool::{ResourceCounts, PARTY_REQUIREMENT};
use crate::core::state::SharedState;
use crate::util::pad;

/// Width of the label column in the start banner.
const BANNER_LABEL_WIDTH: usize = 15;

/// Final totals for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    /// Instance index.
    pub instance: usize,
    /// Parties completed.
    pub parties_served: u32,
    /// Total time spent running parties, in simulated seconds.
    pub total_duration_secs: u64,
}

/// Everything known about a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Identifier for correlating this run with its logs.
    pub run_id: Uuid,
    /// Per-instance totals, by index.
    pub instances: Vec<InstanceSummary>,
    /// Parties completed across every instance.
    pub total_parties: u32,
    /// Time spent across every instance, in simulated seconds.
    pub total_duration_secs: u64,
    /// Pool at start.
    pub initial: ResourceCounts,
    /// Players added by the generator; `None` when the run had no generator.
    pub generated: Option<ResourceCounts>,
    /// Players spent on completed parties.
    pub consumed: ResourceCounts,
    /// Players left in the pool.
    pub remaining: ResourceCounts,
    /// Whether bonus generation was ever switched on.
    pub bonus_mode_activated: bool,
}

impl SimulationReport {
    /// Builds a report from the state of a finished run.
    ///
    /// Must be called after every worker has exited; a party still running
    /// would be counted as neither consumed nor remaining.
    #[must_use]
    pub fn collect(run_id: Uuid, config: &SimulationConfig, state: &SharedState) -> Self {
        let instances: Vec<InstanceSummary> = state
            .instances()
            .iter()
            .enumerate()
            .map(|(instance, record)| InstanceSummary {
                instance,
                parties_served: record.units_served,
                total_duration_secs: record.total_duration_secs,
            })
            .collect();

        let total_parties = instances
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.parties_served));
        let total_duration_secs = instances.iter().map(|i| i.total_duration_secs).sum();

        Self {
            run_id,
            instances,
            total_parties,
            total_duration_secs,
            initial: config.initial_pool(),
            generated: state.is_replenishing().then(|| state.generated()),
            consumed: PARTY_REQUIREMENT.scaled(total_parties),
            remaining: state.available(),
            bonus_mode_activated: state.is_bonus_mode_active(),
        }
    }

    /// Checks `initial + generated == consumed + remaining`.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let supplied = self
            .initial
            .saturating_add(self.generated.unwrap_or(ResourceCounts::ZERO));
        supplied == self.consumed.saturating_add(self.remaining)
    }

    /// Pretty-printed JSON form.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary, one entry per line.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![String::new(), "=== Simulation Summary ===".to_string()];
        for summary in &self.instances {
            lines.push(format!(
                "Instance {}: Served {} parties, Total time {} seconds",
                summary.instance, summary.parties_served, summary.total_duration_secs
            ));
        }
        lines.push("--------------------------".to_string());
        lines.push(format!("Total parties served: {}", self.total_parties));
        lines.push(format!("Total time spent: {} seconds", self.total_duration_secs));

        if let Some(generated) = self.generated {
            lines.extend([
                String::new(),
                "Bonus players generated:".to_string(),
                format!("  Tanks: {}", generated.tanks),
                format!("  Healers: {}", generated.healers),
                format!("  DPS: {}", generated.dps),
                format!("  Total: {}", generated.total()),
            ]);
        }

        lines.extend([
            String::new(),
            "Remaining players:".to_string(),
            format!("  Tanks: {}", self.remaining.tanks),
            format!("  Healers: {}", self.remaining.healers),
            format!("  DPS: {}", self.remaining.dps),
            "==========================".to_string(),
        ]);
        lines
    }
}

/// Start-of-run banner describing `config`.
#[must_use]
pub fn banner_lines(config: &SimulationConfig) -> Vec<String> {
    let bonus = match &config.generator {
        None => "Disabled".to_string(),
        Some(g) if g.bonus_duration_secs == 0 => "Infinite".to_string(),
        Some(g) => format!("{} seconds", g.bonus_duration_secs),
    };
    vec![
        "=== Starting LFG Simulation ===".to_string(),
        format!("{}{}", pad("Instances:", BANNER_LABEL_WIDTH), config.instances),
        format!("{}{}", pad("Players:", BANNER_LABEL_WIDTH), config.initial_pool()),
        format!(
            "{}[{},{}] seconds",
            pad("Clear time:", BANNER_LABEL_WIDTH),
            config.min_duration_secs,
            config.max_duration_secs
        ),
        format!("{}{bonus}", pad("Bonus mode:", BANNER_LABEL_WIDTH)),
        "================================".to_string(),
        String::new(),
    ]
}
