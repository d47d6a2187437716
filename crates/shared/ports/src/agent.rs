use serde::Serialize;
use sharkfin_core::{AgentId, AgentState, Day, RiskyExpectations};

use crate::error::{PopulationError, PopulationResult};

/// Capability interface of an economic agent.
///
/// The orchestrator only reads and writes agents through this trait; how an
/// agent solves its consumption/portfolio problem is its own business.
pub trait Agent: Send {
    fn id(&self) -> &AgentId;

    /// Distributional class label used to group statistics
    fn label(&self) -> &str;

    fn state(&self) -> &AgentState;

    fn state_mut(&mut self) -> &mut AgentState;

    fn shares(&self) -> f64;

    fn set_shares(&mut self, shares: f64);

    fn macro_day(&self) -> Day;

    fn set_macro_day(&mut self, day: Day);

    /// Belief the agent currently holds (`RiskyAvg`, `RiskyStd`)
    fn risky_expectations(&self) -> RiskyExpectations;

    /// Consumption level of the latest macro update
    fn consumption_level(&self) -> f64;

    /// Permanent income shock drawn at the latest macro update. Agents
    /// without an income process report none.
    fn permanent_shock(&self) -> Option<f64> {
        None
    }

    /// Target share holding at `price` under the current belief
    fn share_demand(&self, price: f64) -> f64;

    /// Recompute the decision rule
    fn solve(&mut self) -> PopulationResult<()> {
        Ok(())
    }

    /// Rebalance under a fresh belief; returns the share delta
    fn attend(&mut self, price: f64, expectations: RiskyExpectations, day: Day) -> f64;

    /// Income, consumption and settlement on the agent's macro day; returns
    /// the share delta
    fn macro_update(&mut self, price: f64) -> f64;

    /// Mark holdings to market and credit dividends
    fn update_wealth_capital_gains(&mut self, price: f64, ror: f64, dividend: f64);
}

/// Per-class statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    pub label: String,
    pub count: usize,
    pub a_lvl_mean: f64,
    pub a_lvl_std: f64,
    pub m_nrm_ratio_ste_mean: Option<f64>,
    pub m_nrm_ratio_ste_std: Option<f64>,
}

/// Flat per-agent snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub label: String,
    pub a_lvl: f64,
    pub m_nrm: f64,
    pub p_lvl: f64,
    pub shares: f64,
    pub macro_day: Day,
}

/// Population collaborator holding the agents
pub trait Population {
    type Agent: Agent;

    fn agents(&self) -> &[Self::Agent];

    fn agents_mut(&mut self) -> &mut [Self::Agent];

    /// Currency per normalized money unit, for reporting
    fn dollars_per_hark_money_unit(&self) -> f64;

    /// Statistics grouped by class label
    fn class_stats(&self) -> PopulationResult<Vec<ClassStats>> {
        Err(PopulationError::Unsupported("class_stats"))
    }

    fn agent_data(&self) -> Vec<AgentRecord> {
        self.agents()
            .iter()
            .map(|agent| AgentRecord {
                id: agent.id().clone(),
                label: agent.label().to_string(),
                a_lvl: agent.state().a_lvl,
                m_nrm: agent.state().m_nrm,
                p_lvl: agent.state().p_lvl,
                shares: agent.shares(),
                macro_day: agent.macro_day(),
            })
            .collect()
    }
}
