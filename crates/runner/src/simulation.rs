//! Attention-driven repeated market simulation.
//!
//! A run walks `quarters x runs_per_quarter` macro-steps. Each macro-step
//! collects the orders of the agents that happen to pay attention, clears
//! them in one market run, then plays `days_per_run` days of macro updates,
//! wealth settlement and belief updates. Days after the first of a run are
//! padded with an extrapolated market step so that every day has exactly
//! one market step and one belief update.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sharkfin_broker::Broker;
use sharkfin_core::{BuySell, Day, Order, Timestamp};
use sharkfin_ports::{Agent, Expectations, Market, MarketResult, Population};

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::history::{DayRecord, History};
use crate::stats::{RunStatus, SimStats, SummaryInput};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationState {
    Uninitialized,
    BurnIn,
    Running,
    Completed,
    MarketFailed,
}

impl SimulationState {
    pub fn is_finished(self) -> bool {
        matches!(self, SimulationState::Completed | SimulationState::MarketFailed)
    }
}

pub struct AttentionSimulation<P: Population, M: Market> {
    config: SimulationConfig,
    attention_rate: f64,
    population: P,
    broker: Broker<M>,
    expectations: Box<dyn Expectations>,
    rng: StdRng,
    seed: u64,
    state: SimulationState,
    history: History,
    /// Return-series indices each agent has attended to
    attention_days: Vec<Vec<Day>>,
    burn_in: usize,
    failure: Option<String>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
}

/// Set every agent's holding to its demand at `price`
pub(crate) fn seed_holdings<P: Population>(population: &mut P, price: f64) {
    for agent in population.agents_mut() {
        let shares = agent.share_demand(price);
        agent.set_shares(shares);
    }
}

/// Zero-order days: trade, settle wealth and update beliefs, track nothing
pub(crate) fn run_burn_in<P: Population, M: Market>(
    broker: &mut Broker<M>,
    population: &mut P,
    expectations: &mut dyn Expectations,
    days: usize,
) -> MarketResult<()> {
    for _ in 0..days {
        broker.transact(&Order::new(), false);
        let outcome = broker.trade()?;
        for agent in population.agents_mut() {
            agent.update_wealth_capital_gains(outcome.price, outcome.ror, outcome.dividend);
        }
        expectations.calculate_risky_expectations(broker.market());
    }
    Ok(())
}

impl<P: Population, M: Market> AttentionSimulation<P, M> {
    /// Validate `config` and assign every agent a fixed macro day
    pub fn new(
        config: SimulationConfig,
        mut population: P,
        market: M,
        expectations: Box<dyn Expectations>,
    ) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        for agent in population.agents_mut() {
            agent.set_macro_day(rng.gen_range(0..config.days_per_quarter));
        }
        let agent_count = population.agents().len();

        tracing::debug!(
            "Simulation seeded with {} for {} agents, attention rate {}",
            seed,
            agent_count,
            config.attention_rate()
        );

        Ok(Self {
            attention_rate: config.attention_rate(),
            config,
            population,
            broker: Broker::new(market),
            expectations,
            rng,
            seed,
            state: SimulationState::Uninitialized,
            history: History::new(),
            attention_days: vec![Vec::new(); agent_count],
            burn_in: 0,
            failure: None,
            start_time: None,
            end_time: None,
        })
    }

    /// Seed holdings at the current price and run the burn-in days.
    ///
    /// A market failure during burn-in ends the run.
    pub fn start_simulation(&mut self) -> Result<()> {
        self.require(SimulationState::Uninitialized, "start")?;
        self.start_time = Some(Utc::now());

        let price = self.broker.market().history().last_price();
        seed_holdings(&mut self.population, price);

        let days = self.config.burn_in_days;
        if days > 0 {
            self.state = SimulationState::BurnIn;
            tracing::info!("Burning in for {} days", days);
            let burned = run_burn_in(
                &mut self.broker,
                &mut self.population,
                self.expectations.as_mut(),
                days,
            );
            if let Err(e) = burned {
                tracing::error!("Market failure during burn-in: {}", e);
                self.record_failure(e.reason());
                self.finish();
                return Ok(());
            }
        }
        self.burn_in = days;
        self.state = SimulationState::Running;
        Ok(())
    }

    /// Run all quarters, starting the simulation first if needed.
    ///
    /// A market failure is not an error: the run stops, the broker is
    /// closed and the failure shows up in [`RunStatus`].
    pub fn simulate(&mut self) -> Result<RunStatus> {
        if self.state == SimulationState::Uninitialized {
            self.start_simulation()?;
        }
        if self.state.is_finished() {
            return Ok(self.status());
        }
        self.require(SimulationState::Running, "simulate")?;

        self.history.track(&self.population, None);

        let quarters = self.config.quarters;
        'quarters: for quarter in 0..quarters {
            tracing::info!("Quarter {} of {}", quarter + 1, quarters);
            let mut day: Day = 0;

            for _ in 0..self.config.runs_per_quarter {
                self.attend();

                let outcome = match self.broker.trade() {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!("Market failure in quarter {}: {}", quarter + 1, e);
                        self.record_failure(e.reason());
                        break 'quarters;
                    }
                };

                for day_in_run in 0..self.config.days_per_run() {
                    self.macro_updates(day, outcome.price);

                    let (price, ror, dividend) = if day_in_run == 0 {
                        (outcome.price, outcome.ror, outcome.dividend)
                    } else {
                        self.broker.track(BuySell::ZERO, BuySell::ZERO);
                        let (price, dividend) = self.broker.market_mut().dummy_run();
                        let ror = self.broker.market().daily_rate_of_price_return();
                        (price, ror, dividend)
                    };

                    for agent in self.population.agents_mut() {
                        agent.update_wealth_capital_gains(price, ror, dividend);
                    }
                    self.history.track(&self.population, Some(day));
                    self.expectations
                        .calculate_risky_expectations(self.broker.market());

                    tracing::debug!("Day {} price {:.4} ror {:.6}", day, price, ror);
                    day += 1;
                }
            }
        }

        self.finish();
        Ok(self.status())
    }

    /// Bernoulli attention draw per agent; attending agents rebalance
    fn attend(&mut self) {
        let market = self.broker.market();
        let price = market.history().last_price();
        let latest = market.history().steps().checked_sub(1);

        let mut order = Order::new();
        for (agent, days) in self
            .population
            .agents_mut()
            .iter_mut()
            .zip(self.attention_days.iter_mut())
        {
            if self.rng.r#gen::<f64>() >= self.attention_rate {
                continue;
            }
            if let Some(latest) = latest {
                days.push(latest);
            }
            let expectations = self
                .expectations
                .hand_out_expectations(market, Some(days.as_slice()));
            order.push(agent.attend(price, expectations, latest.unwrap_or(0)));
        }

        tracing::debug!("{} agents attended", order.len());
        self.broker.transact(&order, false);
    }

    fn macro_updates(&mut self, day: Day, price: f64) {
        let order: Order = self
            .population
            .agents_mut()
            .iter_mut()
            .filter(|agent| agent.macro_day() == day)
            .map(|agent| agent.macro_update(price))
            .collect();
        if !order.is_empty() {
            self.broker.transact(&order, true);
        }
    }

    fn record_failure(&mut self, reason: String) {
        self.failure = Some(reason);
        self.state = SimulationState::MarketFailed;
    }

    fn finish(&mut self) {
        if let Err(e) = self.broker.close() {
            tracing::warn!("Closing the market failed: {}", e);
        }
        if self.state != SimulationState::MarketFailed {
            self.state = SimulationState::Completed;
        }
        self.end_time = Some(Utc::now());
        tracing::info!(
            "Simulation finished in state {:?} after {} market steps",
            self.state,
            self.broker.market().history().steps()
        );
    }

    fn require(&self, expected: SimulationState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SimulationError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::classify(self.failure.as_deref())
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn attention_rate(&self) -> f64 {
        self.attention_rate
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn population(&self) -> &P {
        &self.population
    }

    pub fn broker(&self) -> &Broker<M> {
        &self.broker
    }

    pub fn market(&self) -> &M {
        self.broker.market()
    }

    pub fn expectations(&self) -> &dyn Expectations {
        self.expectations.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn attention_days(&self) -> &[Vec<Day>] {
        &self.attention_days
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.end_time
    }

    /// Per-day table of the tracked days
    pub fn data(&self) -> Vec<DayRecord> {
        let market = self.broker.market();
        let skip = self.burn_in;
        let prices = market.prices().get(skip + 1..).unwrap_or(&[]);
        let dividends = market.dividends().get(skip + 1..).unwrap_or(&[]);
        let rors = market.ror_list();
        let buy_sell = self.broker.buy_sell_history().get(skip..).unwrap_or(&[]);
        let buy_sell_macro = self
            .broker
            .buy_sell_macro_history()
            .get(skip..)
            .unwrap_or(&[]);
        let expected_ror = self.expectations.expected_ror_list();
        let expected_std = self.expectations.expected_std_list();

        self.history
            .days()
            .iter()
            .enumerate()
            .map(|(t, snapshot)| {
                let step = skip + t;
                let bs = buy_sell.get(t).copied().unwrap_or(BuySell::ZERO);
                let bs_macro = buy_sell_macro.get(t).copied().unwrap_or(BuySell::ZERO);
                DayRecord {
                    t,
                    price: prices.get(t).copied().unwrap_or(f64::NAN),
                    dividend: dividends.get(t).copied().unwrap_or(f64::NAN),
                    buy: bs.buy,
                    sell: bs.sell,
                    buy_macro: bs_macro.buy,
                    sell_macro: bs_macro.sell,
                    owned_shares: snapshot.owned_shares,
                    total_assets: snapshot.total_assets,
                    mean_income: snapshot.mean_income_level,
                    total_consumption: snapshot.total_consumption_level,
                    ror: rors.get(step).copied().unwrap_or(f64::NAN),
                    expected_ror: expected_ror.get(step).copied().unwrap_or(f64::NAN),
                    expected_std: expected_std.get(step).copied().unwrap_or(f64::NAN),
                    permanent_shock_std: snapshot.permanent_shock_std,
                }
            })
            .collect()
    }

    /// Summary statistics over the run so far
    pub fn sim_stats(&self) -> SimStats {
        let market = self.broker.market();
        let rors = market.ror_list();
        let tracked_rors = rors.get(self.burn_in..).unwrap_or(&[]);
        let log_returns = market.log_return_list();
        let a_lvls: Vec<f64> = self
            .population
            .agent_data()
            .iter()
            .map(|record| record.a_lvl)
            .collect();
        let seconds = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_seconds(),
            _ => 0,
        };

        SimStats::compute(SummaryInput {
            q: self.config.quarters,
            r: self.config.runs_per_quarter,
            attention: Some(self.attention_rate),
            market_seeds: market.seeds(),
            rors: tracked_rors,
            log_returns: &log_returns,
            prices: market.prices(),
            dividends: market.dividends(),
            price_stats: market.asset_price_stats(),
            buy_sell: self.broker.buy_sell_history(),
            buy_sell_macro: self.broker.buy_sell_macro_history(),
            a_lvls: &a_lvls,
            class_stats: self.history.class_stats(),
            expectations: self.expectations.parameters(),
            dollars_per_hark_money_unit: self.population.dollars_per_hark_money_unit(),
            seconds,
            failure: self.failure.as_deref(),
        })
    }
}
