//! Price-impact calibration: a quiet burn-in followed by one preset trade.

use chrono::Utc;
use serde::Serialize;
use sharkfin_broker::Broker;
use sharkfin_core::{BuySell, Order, Timestamp};
use sharkfin_ports::{Agent, Expectations, Market, Population};

use crate::config::CalibrationConfig;
use crate::error::{Result, SimulationError};
use crate::simulation::{SimulationState, run_burn_in, seed_holdings};
use crate::stats::{RunStatus, SimStats, SummaryInput};

/// Market reaction to the calibration shock
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShockResponse {
    pub buy_sell: BuySell,
    pub price_before: f64,
    pub price_after: f64,
    pub ror: f64,
    /// Wall-clock time of the market run
    pub market_millis: i64,
}

/// One row of the calibration table; the seed row has no trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationRecord {
    pub t: usize,
    pub price: f64,
    pub dividend: f64,
    pub buy: Option<u64>,
    pub sell: Option<u64>,
    pub ror: Option<f64>,
    pub expected_ror: f64,
    pub expected_std: f64,
}

pub struct CalibrationSimulation<P: Population, M: Market> {
    config: CalibrationConfig,
    population: P,
    broker: Broker<M>,
    expectations: Box<dyn Expectations>,
    state: SimulationState,
    response: Option<ShockResponse>,
    failure: Option<String>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
}

impl<P: Population, M: Market> CalibrationSimulation<P, M> {
    pub fn new(
        config: CalibrationConfig,
        population: P,
        market: M,
        expectations: Box<dyn Expectations>,
    ) -> Self {
        Self {
            config,
            population,
            broker: Broker::new(market),
            expectations,
            state: SimulationState::Uninitialized,
            response: None,
            failure: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Burn in, then submit the shock as one trade
    pub fn simulate(&mut self) -> Result<RunStatus> {
        if self.state != SimulationState::Uninitialized {
            return Err(SimulationError::InvalidState {
                operation: "calibrate",
                state: self.state,
            });
        }
        self.start_time = Some(Utc::now());

        let price = self.broker.market().history().last_price();
        seed_holdings(&mut self.population, price);

        self.state = SimulationState::BurnIn;
        let burned = run_burn_in(
            &mut self.broker,
            &mut self.population,
            self.expectations.as_mut(),
            self.config.burn_in_days,
        );
        match burned {
            Ok(()) => {
                self.state = SimulationState::Running;
                self.shock();
            }
            Err(e) => self.fail(e.reason()),
        }

        if let Err(e) = self.broker.close() {
            tracing::warn!("Closing the market failed: {}", e);
        }
        if self.state == SimulationState::Running {
            self.state = SimulationState::Completed;
        }
        self.end_time = Some(Utc::now());
        Ok(RunStatus::classify(self.failure.as_deref()))
    }

    fn shock(&mut self) {
        let price_before = self.broker.market().history().last_price();
        let shock = Order::from(vec![self.config.buy as f64, -(self.config.sell as f64)]);
        self.broker.transact(&shock, false);

        let started = Utc::now();
        let outcome = match self.broker.trade() {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(e.reason());
                return;
            }
        };
        let market_millis = (Utc::now() - started).num_milliseconds();

        for agent in self.population.agents_mut() {
            agent.update_wealth_capital_gains(outcome.price, outcome.ror, outcome.dividend);
        }
        self.expectations
            .calculate_risky_expectations(self.broker.market());

        tracing::info!(
            "Shock buy={} sell={} moved price {:.4} -> {:.4}",
            outcome.buy_sell.buy,
            outcome.buy_sell.sell,
            price_before,
            outcome.price
        );
        self.response = Some(ShockResponse {
            buy_sell: outcome.buy_sell,
            price_before,
            price_after: outcome.price,
            ror: outcome.ror,
            market_millis,
        });
    }

    fn fail(&mut self, reason: String) {
        tracing::error!("Market failure during calibration: {}", reason);
        self.failure = Some(reason);
        self.state = SimulationState::MarketFailed;
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn response(&self) -> Option<&ShockResponse> {
        self.response.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn market(&self) -> &M {
        self.broker.market()
    }

    pub fn broker(&self) -> &Broker<M> {
        &self.broker
    }

    pub fn expectations(&self) -> &dyn Expectations {
        self.expectations.as_ref()
    }

    /// Rows from the last burn-in price onward
    pub fn data(&self) -> Vec<CalibrationRecord> {
        let market = self.broker.market();
        let skip = self.config.burn_in_days;
        let rors = market.ror_list();
        let buy_sell = self.broker.buy_sell_history();
        let expected_ror = self.expectations.expected_ror_list();
        let expected_std = self.expectations.expected_std_list();

        market
            .prices()
            .iter()
            .zip(market.dividends())
            .enumerate()
            .skip(skip)
            .map(|(step, (&price, &dividend))| {
                // Step 0 is the seed price, step k the k-th trade
                let trade = step.checked_sub(1);
                CalibrationRecord {
                    t: step - skip,
                    price,
                    dividend,
                    buy: trade.and_then(|k| buy_sell.get(k)).map(|bs| bs.buy),
                    sell: trade.and_then(|k| buy_sell.get(k)).map(|bs| bs.sell),
                    ror: trade.and_then(|k| rors.get(k)).copied(),
                    expected_ror: trade
                        .and_then(|k| expected_ror.get(k))
                        .copied()
                        .unwrap_or(f64::NAN),
                    expected_std: trade
                        .and_then(|k| expected_std.get(k))
                        .copied()
                        .unwrap_or(f64::NAN),
                }
            })
            .collect()
    }

    pub fn sim_stats(&self) -> SimStats {
        let market = self.broker.market();
        let rors = market.ror_list();
        let log_returns = market.log_return_list();
        let a_lvls: Vec<f64> = self
            .population
            .agents()
            .iter()
            .map(|agent| agent.state().a_lvl)
            .collect();
        let class_stats = self.population.class_stats().ok();
        let seconds = match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_seconds(),
            _ => 0,
        };

        SimStats::compute(SummaryInput {
            q: 0,
            r: 1,
            attention: None,
            market_seeds: market.seeds(),
            rors: &rors,
            log_returns: &log_returns,
            prices: market.prices(),
            dividends: market.dividends(),
            price_stats: market.asset_price_stats(),
            buy_sell: self.broker.buy_sell_history(),
            buy_sell_macro: self.broker.buy_sell_macro_history(),
            a_lvls: &a_lvls,
            class_stats: class_stats.as_deref(),
            expectations: self.expectations.parameters(),
            dollars_per_hark_money_unit: self.population.dollars_per_hark_money_unit(),
            seconds,
            failure: self.failure.as_deref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{MertonPopulation, MertonPopulationConfig};
    use sharkfin_expectations::UsualExpectations;
    use sharkfin_market::{StochasticMarket, StochasticMarketConfig};

    fn calibration(
        buy: u64,
        sell: u64,
        burn_in_days: usize,
    ) -> CalibrationSimulation<MertonPopulation, StochasticMarket> {
        let market = StochasticMarket::new(StochasticMarketConfig::default().with_seed(5)).unwrap();
        let expectations = UsualExpectations::new(60);
        let initial = expectations.risky_expectations(&market, None);
        let population = MertonPopulation::new(&MertonPopulationConfig::default(), initial);
        CalibrationSimulation::new(
            CalibrationConfig {
                buy,
                sell,
                burn_in_days,
            },
            population,
            market,
            Box::new(expectations),
        )
    }

    #[test]
    fn test_shock_after_burn_in() {
        let mut sim = calibration(500, 0, 10);
        assert_eq!(sim.simulate().unwrap(), RunStatus::Completed);
        assert_eq!(sim.state(), SimulationState::Completed);

        let response = sim.response().unwrap();
        assert_eq!(response.buy_sell, BuySell::new(500, 0));
        assert_eq!(sim.market().history().steps(), 11);
        assert!(sim.market().is_closed());

        let data = sim.data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].buy, Some(0));
        assert_eq!(data[1].buy, Some(500));
        assert_eq!(data[1].price, response.price_after);
        assert_eq!(sim.expectations().expected_ror_list().len(), 11);
    }

    #[test]
    fn test_without_burn_in_first_row_is_seed() {
        let mut sim = calibration(0, 50, 0);
        sim.simulate().unwrap();

        let data = sim.data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].buy, None);
        assert!(data[0].ror.is_none());
        assert_eq!(data[1].sell, Some(50));
        assert_eq!(sim.sim_stats().status_code, 0);
    }

    #[test]
    fn test_runs_once() {
        let mut sim = calibration(1, 1, 0);
        sim.simulate().unwrap();
        assert!(sim.simulate().is_err());
    }
}
