use sharkfin_core::{BuySell, MarketHistory, MarketParameters, PriceStats};

use crate::error::MarketResult;

/// Extra key/value arguments merged into every market request
pub type RunArgs = serde_json::Map<String, serde_json::Value>;

/// Port for a market that clears one day of aggregate order flow.
///
/// Implementations own an append-only [`MarketHistory`]; every step appends
/// exactly one price and one dividend.
pub trait Market: Send {
    /// Clear one day at `buy_sell` volume, returning `(price, dividend)`
    fn run_market(&mut self, buy_sell: BuySell, run_args: &RunArgs) -> MarketResult<(f64, f64)>;

    /// Advance one non-trading day without contacting the clearing venue
    fn dummy_run(&mut self) -> (f64, f64);

    /// Release transport resources and signal end of session
    fn close_market(&mut self) -> MarketResult<()>;

    /// Recorded price and dividend series
    fn history(&self) -> &MarketHistory;

    /// Structural dividend-process parameters
    fn parameters(&self) -> MarketParameters;

    /// Random seeds used by this market, for reproduction
    fn seeds(&self) -> Vec<u64> {
        Vec::new()
    }

    fn prices(&self) -> &[f64] {
        self.history().prices()
    }

    fn dividends(&self) -> &[f64] {
        self.history().dividends()
    }

    fn ror_list(&self) -> Vec<f64> {
        self.history().ror_list()
    }

    fn log_return_list(&self) -> Vec<f64> {
        self.history().log_return_list()
    }

    fn daily_rate_of_price_return(&self) -> f64 {
        self.history().daily_rate_of_price_return()
    }

    fn asset_price_stats(&self) -> PriceStats {
        self.history().price_stats()
    }
}

impl<M: Market + ?Sized> Market for Box<M> {
    fn run_market(&mut self, buy_sell: BuySell, run_args: &RunArgs) -> MarketResult<(f64, f64)> {
        (**self).run_market(buy_sell, run_args)
    }

    fn dummy_run(&mut self) -> (f64, f64) {
        (**self).dummy_run()
    }

    fn close_market(&mut self) -> MarketResult<()> {
        (**self).close_market()
    }

    fn history(&self) -> &MarketHistory {
        (**self).history()
    }

    fn parameters(&self) -> MarketParameters {
        (**self).parameters()
    }

    fn seeds(&self) -> Vec<u64> {
        (**self).seeds()
    }
}
