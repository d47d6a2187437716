//! Reference population of closed-form portfolio choosers.
//!
//! Each agent holds the Merton fraction
//! `(risky_avg - risk_free) / (crra * risky_std^2)` of its assets in the
//! risky asset, clipped to `[0, 1]`, and consumes a fixed fraction of its
//! assets on its macro day. Real consumption/saving solvers live outside
//! this crate and plug in through the same [`Agent`] trait.

use serde::{Deserialize, Serialize};
use sharkfin_core::{AgentId, AgentState, Day, RiskyExpectations};
use sharkfin_ports::{Agent, ClassStats, Population, PopulationResult};

use crate::config::ConfigError;

/// One homogeneous class of agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MertonClassConfig {
    pub label: String,

    #[serde(default = "default_count")]
    pub count: usize,

    /// Coefficient of relative risk aversion
    #[serde(default = "default_crra")]
    pub crra: f64,

    /// Starting assets in money units
    #[serde(default = "default_initial_wealth")]
    pub initial_wealth: f64,

    /// Quarterly income as a multiple of permanent income
    #[serde(default = "default_income")]
    pub income: f64,

    /// Share of assets consumed per quarter
    #[serde(default = "default_consumption_rate")]
    pub consumption_rate: f64,
}

fn default_count() -> usize {
    10
}

fn default_crra() -> f64 {
    5.0
}

fn default_initial_wealth() -> f64 {
    10.0
}

fn default_income() -> f64 {
    1.0
}

fn default_consumption_rate() -> f64 {
    0.05
}

impl MertonClassConfig {
    pub fn new(label: impl Into<String>, count: usize, crra: f64) -> Self {
        Self {
            label: label.into(),
            count,
            crra,
            initial_wealth: default_initial_wealth(),
            income: default_income(),
            consumption_rate: default_consumption_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MertonPopulationConfig {
    #[serde(default = "default_classes")]
    pub classes: Vec<MertonClassConfig>,

    /// Quarterly gross return of the safe asset
    #[serde(default = "default_risk_free")]
    pub risk_free: f64,

    #[serde(default = "default_dollars_per_unit")]
    pub dollars_per_hark_money_unit: f64,
}

fn default_classes() -> Vec<MertonClassConfig> {
    vec![
        MertonClassConfig::new("crra_3", 10, 3.0),
        MertonClassConfig::new("crra_6", 10, 6.0),
    ]
}

fn default_risk_free() -> f64 {
    1.0
}

fn default_dollars_per_unit() -> f64 {
    1000.0
}

impl Default for MertonPopulationConfig {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            risk_free: default_risk_free(),
            dollars_per_hark_money_unit: default_dollars_per_unit(),
        }
    }
}

impl MertonPopulationConfig {
    pub fn size(&self) -> usize {
        self.classes.iter().map(|class| class.count).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size() == 0 {
            return Err(ConfigError::Invalid("population has no agents".to_string()));
        }
        if !(self.dollars_per_hark_money_unit > 0.0) {
            return Err(ConfigError::Invalid(
                "dollars_per_hark_money_unit must be positive".to_string(),
            ));
        }
        for class in &self.classes {
            if !(class.crra > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "class {}: crra must be positive",
                    class.label
                )));
            }
            if !(0.0..=1.0).contains(&class.consumption_rate) || class.initial_wealth < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "class {}: consumption_rate must be in [0, 1] and initial_wealth non-negative",
                    class.label
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MertonAgent {
    id: AgentId,
    label: String,
    state: AgentState,
    shares: f64,
    macro_day: Day,
    crra: f64,
    risk_free: f64,
    income: f64,
    consumption_rate: f64,
    dollars_per_unit: f64,
    expectations: RiskyExpectations,
    consumption_level: f64,
}

impl MertonAgent {
    /// Fraction of assets held in the risky asset under the current belief
    pub fn risky_share(&self) -> f64 {
        let excess = self.expectations.risky_avg - self.risk_free;
        let variance = self.expectations.risky_std.powi(2);
        let share = if variance > 0.0 {
            excess / (self.crra * variance)
        } else if excess > 0.0 {
            1.0
        } else {
            0.0
        };
        if share.is_finite() { share.clamp(0.0, 1.0) } else { 0.0 }
    }

    fn rebalance(&mut self, price: f64) -> f64 {
        let target = self.share_demand(price);
        let delta = target - self.shares;
        self.shares = target;
        delta
    }

    fn refresh_normalized(&mut self) {
        self.state.m_nrm = self.state.a_lvl / self.state.p_lvl;
    }
}

impl Agent for MertonAgent {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn state(&self) -> &AgentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    fn shares(&self) -> f64 {
        self.shares
    }

    fn set_shares(&mut self, shares: f64) {
        self.shares = shares;
    }

    fn macro_day(&self) -> Day {
        self.macro_day
    }

    fn set_macro_day(&mut self, day: Day) {
        self.macro_day = day;
    }

    fn risky_expectations(&self) -> RiskyExpectations {
        self.expectations
    }

    fn consumption_level(&self) -> f64 {
        self.consumption_level
    }

    fn share_demand(&self, price: f64) -> f64 {
        if !(price.is_finite() && price > 0.0) {
            return self.shares;
        }
        self.risky_share() * self.state.a_lvl.max(0.0) * self.dollars_per_unit / price
    }

    fn attend(&mut self, price: f64, expectations: RiskyExpectations, _day: Day) -> f64 {
        self.expectations = expectations;
        self.rebalance(price)
    }

    fn macro_update(&mut self, price: f64) -> f64 {
        self.state.a_lvl += self.income * self.state.p_lvl;
        let consumption = self.consumption_rate * self.state.a_lvl.max(0.0);
        self.state.a_lvl -= consumption;
        self.consumption_level = consumption;
        self.refresh_normalized();
        self.rebalance(price)
    }

    fn update_wealth_capital_gains(&mut self, price: f64, ror: f64, dividend: f64) {
        if !(price.is_finite() && ror.is_finite() && dividend.is_finite()) || ror <= -1.0 {
            return;
        }
        let old_price = price / (1.0 + ror);
        let gain = self.shares * (price - old_price + dividend);
        self.state.a_lvl += gain / (self.dollars_per_unit * self.state.p_lvl);
        self.refresh_normalized();

        if self.state.a_lvl < 0.0 {
            tracing::warn!("Agent {} has negative assets after capital gains", self.id);
        }
    }
}

/// Population of [`MertonAgent`]s built from class configs
#[derive(Debug, Clone)]
pub struct MertonPopulation {
    agents: Vec<MertonAgent>,
    dollars_per_hark_money_unit: f64,
}

impl MertonPopulation {
    /// Build every class with the same starting belief
    pub fn new(config: &MertonPopulationConfig, initial: RiskyExpectations) -> Self {
        let agents = config
            .classes
            .iter()
            .flat_map(|class| {
                (0..class.count).map(move |i| MertonAgent {
                    id: AgentId::new(format!("{}-{i}", class.label)),
                    label: class.label.clone(),
                    state: AgentState {
                        a_lvl: class.initial_wealth,
                        m_nrm: class.initial_wealth,
                        p_lvl: 1.0,
                    },
                    shares: 0.0,
                    macro_day: 0,
                    crra: class.crra,
                    risk_free: config.risk_free,
                    income: class.income,
                    consumption_rate: class.consumption_rate,
                    dollars_per_unit: config.dollars_per_hark_money_unit,
                    expectations: initial,
                    consumption_level: 0.0,
                })
            })
            .collect();

        Self {
            agents,
            dollars_per_hark_money_unit: config.dollars_per_hark_money_unit,
        }
    }
}

impl Population for MertonPopulation {
    type Agent = MertonAgent;

    fn agents(&self) -> &[MertonAgent] {
        &self.agents
    }

    fn agents_mut(&mut self) -> &mut [MertonAgent] {
        &mut self.agents
    }

    fn dollars_per_hark_money_unit(&self) -> f64 {
        self.dollars_per_hark_money_unit
    }

    fn class_stats(&self) -> PopulationResult<Vec<ClassStats>> {
        let mut labels: Vec<&str> = Vec::new();
        for agent in &self.agents {
            if !labels.contains(&agent.label.as_str()) {
                labels.push(&agent.label);
            }
        }

        Ok(labels
            .into_iter()
            .map(|label| {
                let a_lvls: Vec<f64> = self
                    .agents
                    .iter()
                    .filter(|agent| agent.label == label)
                    .map(|agent| agent.state.a_lvl)
                    .collect();
                ClassStats {
                    label: label.to_string(),
                    count: a_lvls.len(),
                    a_lvl_mean: sharkfin_stats::mean(&a_lvls).unwrap_or(f64::NAN),
                    a_lvl_std: sharkfin_stats::population_std(&a_lvls).unwrap_or(f64::NAN),
                    m_nrm_ratio_ste_mean: None,
                    m_nrm_ratio_ste_std: None,
                }
            })
            .collect())
    }
}
