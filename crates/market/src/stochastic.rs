//! In-process stochastic market.
//!
//! The dividend follows [`DividendProcess`]; the price sits at the
//! fundamental ratio times a log-normal impact term whose mean shifts with
//! the log buy/sell imbalance and whose spread grows with log volume.
//!
//! The draw is Normal in log-price rather than in price, so heavy one-sided
//! volume can never push the close to zero or below. With no volume the
//! impact term is exactly one and the close is `dividend * pd_ratio`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};
use sharkfin_core::{BuySell, MarketHistory, MarketParameters};
use sharkfin_ports::{Market, MarketError, MarketResult, RunArgs};

use crate::config::{MarketConfigError, StochasticMarketConfig};
use crate::dividend::DividendProcess;

pub struct StochasticMarket {
    config: StochasticMarketConfig,
    history: MarketHistory,
    dividends: DividendProcess,
    rng: StdRng,
    seed: u64,
    closed: bool,
}

impl StochasticMarket {
    pub fn new(config: StochasticMarketConfig) -> Result<Self, MarketConfigError> {
        config.validate()?;
        let dividends = DividendProcess::new(&config.parameters)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let history = MarketHistory::new(
            config.initial_price,
            config.parameters.dividend_for(config.initial_price),
        );

        tracing::debug!("Stochastic market seeded with {}", seed);

        Ok(Self {
            config,
            history,
            dividends,
            rng: StdRng::seed_from_u64(seed),
            seed,
            closed: false,
        })
    }

    /// Mean and standard deviation of the log-price impact at `buy_sell`
    pub fn impact_moments(&self, buy_sell: BuySell) -> (f64, f64) {
        let buy = buy_sell.buy as f64;
        let sell = buy_sell.sell as f64;
        let mean = self.config.price_impact * ((1.0 + buy).ln() - (1.0 + sell).ln());
        let std = self.config.volume_volatility * (1.0 + buy + sell).ln();
        (mean, std)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Market for StochasticMarket {
    fn run_market(&mut self, buy_sell: BuySell, _run_args: &RunArgs) -> MarketResult<(f64, f64)> {
        if self.closed {
            return Err(MarketError::Closed);
        }

        let dividend = self
            .dividends
            .next(self.history.last_dividend(), &mut self.rng);
        let (mean, std) = self.impact_moments(buy_sell);
        let z: f64 = StandardNormal.sample(&mut self.rng);
        let price = dividend * self.config.parameters.price_to_dividend_ratio * (mean + std * z).exp();

        self.history.push(price, dividend);
        tracing::debug!(
            "Cleared buy={} sell={} at price {:.4} dividend {:.6}",
            buy_sell.buy,
            buy_sell.sell,
            price,
            dividend
        );

        Ok((price, dividend))
    }

    fn dummy_run(&mut self) -> (f64, f64) {
        self.history
            .push_extrapolated(self.config.parameters.price_to_dividend_ratio)
    }

    fn close_market(&mut self) -> MarketResult<()> {
        self.closed = true;
        Ok(())
    }

    fn history(&self) -> &MarketHistory {
        &self.history
    }

    fn parameters(&self) -> MarketParameters {
        self.config.parameters
    }

    fn seeds(&self) -> Vec<u64> {
        vec![self.seed]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market(seed: u64) -> StochasticMarket {
        StochasticMarket::new(StochasticMarketConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_zero_volume_days() {
        let mut market = market(1);
        for _ in 0..5 {
            market.run_market(BuySell::ZERO, &RunArgs::new()).unwrap();
        }
        assert_eq!(market.prices().len(), 6);
        assert_eq!(market.dividends().len(), 6);
        assert!(market.prices().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_buy_pressure_raises_price() {
        let mut quiet = market(7);
        let mut bought = market(7);

        let (p0, d0) = quiet.run_market(BuySell::ZERO, &RunArgs::new()).unwrap();
        let (p1, d1) = bought.run_market(BuySell::new(100, 0), &RunArgs::new()).unwrap();

        assert_eq!(d0, d1);
        assert!(p1 > p0);
    }

    #[test]
    fn test_sell_pressure_lowers_price() {
        let mut quiet = market(3);
        let mut sold = market(3);

        let (p0, _) = quiet.run_market(BuySell::ZERO, &RunArgs::new()).unwrap();
        let (p1, _) = sold.run_market(BuySell::new(0, 500), &RunArgs::new()).unwrap();

        assert!(p1 < p0);
    }

    #[test]
    fn test_zero_volume_prices_at_fundamental() {
        let mut market = market(11);
        let (price, dividend) = market.run_market(BuySell::ZERO, &RunArgs::new()).unwrap();
        assert_relative_eq!(price, dividend * 1200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lopsided_volume_keeps_prices_positive() {
        let mut market = market(21);
        for day in 0..200 {
            let bs = if day % 2 == 0 {
                BuySell::new(0, 50_000)
            } else {
                BuySell::new(50_000, 0)
            };
            let (price, _) = market.run_market(bs, &RunArgs::new()).unwrap();
            assert!(price.is_finite() && price > 0.0, "day {day} closed at {price}");
        }
    }

    #[test]
    fn test_same_seed_reproduces_path() {
        let mut a = market(5);
        let mut b = market(5);
        for volume in [0, 10, 250, 3] {
            let bs = BuySell::new(volume, volume / 2);
            assert_eq!(
                a.run_market(bs, &RunArgs::new()).unwrap(),
                b.run_market(bs, &RunArgs::new()).unwrap()
            );
        }
        assert_eq!(a.seeds(), vec![5]);
    }

    #[test]
    fn test_dummy_run_extends_trend() {
        let mut market = market(2);
        market.run_market(BuySell::new(40, 0), &RunArgs::new()).unwrap();
        market.dummy_run();

        let p = market.prices();
        assert_relative_eq!(p[2] / p[1], p[1] / p[0], epsilon = 1e-12);
        assert_eq!(market.prices().len(), market.dividends().len());
    }

    #[test]
    fn test_asset_price_stats_idempotent() {
        let mut market = market(8);
        for _ in 0..10 {
            market.run_market(BuySell::new(5, 9), &RunArgs::new()).unwrap();
        }
        assert_eq!(market.asset_price_stats(), market.asset_price_stats());
    }

    #[test]
    fn test_closed_market_refuses_orders() {
        let mut market = market(4);
        market.close_market().unwrap();
        assert_eq!(
            market.run_market(BuySell::ZERO, &RunArgs::new()),
            Err(MarketError::Closed)
        );
    }
}
