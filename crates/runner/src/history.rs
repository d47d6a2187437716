//! Per-day tracking of the population and the joined output table.

use serde::Serialize;
use sharkfin_core::Day;
use sharkfin_ports::{Agent, ClassStats, Population};

/// Population aggregates after one tracked day, in dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationSnapshot {
    pub owned_shares: f64,
    pub total_assets: f64,
    pub mean_income_level: f64,
    /// Consumption of the agents whose macro day it was
    pub total_consumption_level: f64,
    /// Dispersion of the latest permanent income shocks; `None` when no
    /// agent draws them
    pub permanent_shock_std: Option<f64>,
}

impl PopulationSnapshot {
    pub fn capture<P: Population>(population: &P, day: Option<Day>) -> Self {
        let agents = population.agents();
        let dollars = population.dollars_per_hark_money_unit();

        let owned_shares = agents.iter().map(|agent| agent.shares()).sum();
        let total_assets = agents.iter().map(|agent| agent.state().a_lvl).sum::<f64>() * dollars;
        let p_lvls: Vec<f64> = agents.iter().map(|agent| agent.state().p_lvl).collect();
        let mean_income_level = sharkfin_stats::mean(&p_lvls).unwrap_or(0.0) * dollars;
        let total_consumption_level = agents
            .iter()
            .filter(|agent| Some(agent.macro_day()) == day)
            .map(|agent| agent.consumption_level())
            .sum::<f64>()
            * dollars;

        Self {
            owned_shares,
            total_assets,
            mean_income_level,
            total_consumption_level,
            permanent_shock_std: shock_dispersion(agents.iter().map(|agent| agent.permanent_shock())),
        }
    }
}

/// Population std of the shocks that were drawn
fn shock_dispersion(shocks: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let drawn: Vec<f64> = shocks.flatten().collect();
    sharkfin_stats::population_std(&drawn)
}

/// Tracking history of a run.
///
/// Append-only: one entry taken before the first trading day, then one per
/// tracked day. Each entry pairs the aggregate snapshot with the class
/// statistics of the same moment.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<PopulationSnapshot>,
    class_stats: Vec<Option<Vec<ClassStats>>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track<P: Population>(&mut self, population: &P, day: Option<Day>) {
        self.snapshots
            .push(PopulationSnapshot::capture(population, day));
        let class_stats = population
            .class_stats()
            .inspect_err(|e| tracing::debug!("No class statistics: {}", e))
            .ok();
        self.class_stats.push(class_stats);
    }

    /// All snapshots, the initial one first
    pub fn snapshots(&self) -> &[PopulationSnapshot] {
        &self.snapshots
    }

    /// Snapshots of tracked days
    pub fn days(&self) -> &[PopulationSnapshot] {
        self.snapshots.get(1..).unwrap_or(&[])
    }

    /// Class statistics of each tracked day, aligned with [`History::days`]
    pub fn class_stats_by_day(&self) -> &[Option<Vec<ClassStats>>] {
        self.class_stats.get(1..).unwrap_or(&[])
    }

    /// Class statistics of the latest entry
    pub fn class_stats(&self) -> Option<&[ClassStats]> {
        self.class_stats.last()?.as_deref()
    }
}

/// One row of the per-day output table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayRecord {
    pub t: usize,
    pub price: f64,
    pub dividend: f64,
    pub buy: u64,
    pub sell: u64,
    pub buy_macro: u64,
    pub sell_macro: u64,
    pub owned_shares: f64,
    pub total_assets: f64,
    pub mean_income: f64,
    pub total_consumption: f64,
    pub ror: f64,
    pub expected_ror: f64,
    pub expected_std: f64,
    pub permanent_shock_std: Option<f64>,
}
