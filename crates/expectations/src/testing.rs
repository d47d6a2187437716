//! Market with a hand-written history for policy tests.

use sharkfin_core::{BuySell, MarketHistory, MarketParameters};
use sharkfin_ports::{Market, MarketResult, RunArgs};

pub struct ScriptedMarket {
    history: MarketHistory,
    parameters: MarketParameters,
}

impl ScriptedMarket {
    pub fn new() -> Self {
        let parameters = MarketParameters::default();
        Self {
            history: MarketHistory::new(100.0, parameters.dividend_for(100.0)),
            parameters,
        }
    }

    pub fn step(&mut self, price: f64, dividend: f64) {
        self.history.push(price, dividend);
    }

    /// Append `days` steps with realized return `ror` and no dividend
    pub fn constant_returns(&mut self, ror: f64, days: usize) {
        for _ in 0..days {
            let price = self.history.last_price() * (1.0 + ror);
            self.history.push(price, 0.0);
        }
    }
}

impl Market for ScriptedMarket {
    fn run_market(&mut self, _buy_sell: BuySell, _run_args: &RunArgs) -> MarketResult<(f64, f64)> {
        let price = self.history.last_price();
        let dividend = self.history.last_dividend();
        self.history.push(price, dividend);
        Ok((price, dividend))
    }

    fn dummy_run(&mut self) -> (f64, f64) {
        self.history
            .push_extrapolated(self.parameters.price_to_dividend_ratio)
    }

    fn close_market(&mut self) -> MarketResult<()> {
        Ok(())
    }

    fn history(&self) -> &MarketHistory {
        &self.history
    }

    fn parameters(&self) -> MarketParameters {
        self.parameters
    }
}
