use sharkfin_core::{BuySell, Order};
use sharkfin_ports::{Market, MarketResult, RunArgs};

/// Result of one cleared trading day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeOutcome {
    /// Whole-share volume submitted
    pub buy_sell: BuySell,
    /// Price-only return of the day
    pub ror: f64,
    pub price: f64,
    pub dividend: f64,
}

/// Aggregates orders between trades and submits them to its market.
///
/// Running totals reset on every [`Broker::trade`]; the histories receive
/// one record per day, including zero padding days.
pub struct Broker<M: Market> {
    market: M,
    buy_limit: f64,
    sell_limit: f64,
    buy_orders_macro: f64,
    sell_orders_macro: f64,
    buy_sell_history: Vec<BuySell>,
    buy_sell_macro_history: Vec<BuySell>,
    run_args: RunArgs,
}

impl<M: Market> Broker<M> {
    pub fn new(market: M) -> Self {
        Self::with_run_args(market, RunArgs::new())
    }

    /// Broker passing `run_args` to every market run
    pub fn with_run_args(market: M, run_args: RunArgs) -> Self {
        Self {
            market,
            buy_limit: 0.0,
            sell_limit: 0.0,
            buy_orders_macro: 0.0,
            sell_orders_macro: 0.0,
            buy_sell_history: Vec::new(),
            buy_sell_macro_history: Vec::new(),
            run_args,
        }
    }

    /// Accumulate share deltas.
    ///
    /// Positive deltas add to the buy total, negative ones add their
    /// magnitude to the sell total. With `macro_update` set they also count
    /// toward the macro sub-totals.
    pub fn transact(&mut self, order: &Order, macro_update: bool) {
        let buy = order.buy_volume();
        let sell = order.sell_volume();

        self.buy_limit += buy;
        self.sell_limit += sell;

        if macro_update {
            self.buy_orders_macro += buy;
            self.sell_orders_macro += sell;
        }
    }

    /// Append one day to both histories
    pub fn track(&mut self, buy_sell: BuySell, buy_sell_macro: BuySell) {
        self.buy_sell_history.push(buy_sell);
        self.buy_sell_macro_history.push(buy_sell_macro);
    }

    /// Submit accumulated volume to the market and reset the totals.
    ///
    /// Volumes are truncated to whole shares; fractional remainders are
    /// dropped, not carried forward.
    pub fn trade(&mut self) -> MarketResult<TradeOutcome> {
        let buy_sell = BuySell::truncate(self.buy_limit, self.sell_limit);
        let buy_sell_macro = BuySell::truncate(self.buy_orders_macro, self.sell_orders_macro);
        self.track(buy_sell, buy_sell_macro);
        self.reset();

        tracing::debug!("Trading buy={} sell={}", buy_sell.buy, buy_sell.sell);
        let (price, dividend) = self.market.run_market(buy_sell, &self.run_args)?;

        Ok(TradeOutcome {
            buy_sell,
            ror: self.market.daily_rate_of_price_return(),
            price,
            dividend,
        })
    }

    /// Propagate end of session to the market
    pub fn close(&mut self) -> MarketResult<()> {
        self.market.close_market()
    }

    fn reset(&mut self) {
        self.buy_limit = 0.0;
        self.sell_limit = 0.0;
        self.buy_orders_macro = 0.0;
        self.sell_orders_macro = 0.0;
    }

    pub fn buy_limit(&self) -> f64 {
        self.buy_limit
    }

    pub fn sell_limit(&self) -> f64 {
        self.sell_limit
    }

    pub fn buy_orders_macro(&self) -> f64 {
        self.buy_orders_macro
    }

    pub fn sell_orders_macro(&self) -> f64 {
        self.sell_orders_macro
    }

    pub fn buy_sell_history(&self) -> &[BuySell] {
        &self.buy_sell_history
    }

    pub fn buy_sell_macro_history(&self) -> &[BuySell] {
        &self.buy_sell_macro_history
    }

    pub fn market(&self) -> &M {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut M {
        &mut self.market
    }

    pub fn into_market(self) -> M {
        self.market
    }
}
