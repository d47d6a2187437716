use serde::Serialize;
use sharkfin_stats as stats;

/// Append-only price and dividend series.
///
/// Both series always have the same length: the only way to grow the
/// history is [`MarketHistory::push`], which appends to both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketHistory {
    prices: Vec<f64>,
    dividends: Vec<f64>,
}

impl MarketHistory {
    /// Start a history from a seed price and dividend
    pub fn new(initial_price: f64, initial_dividend: f64) -> Self {
        Self {
            prices: vec![initial_price],
            dividends: vec![initial_dividend],
        }
    }

    /// Record one market step
    pub fn push(&mut self, price: f64, dividend: f64) {
        self.prices.push(price);
        self.dividends.push(dividend);
    }

    /// Record a non-trading step.
    ///
    /// The price continues at the last growth factor and the dividend sits
    /// at the fundamental ratio.
    pub fn push_extrapolated(&mut self, price_to_dividend_ratio: f64) -> (f64, f64) {
        let price = match self.prices.as_slice() {
            [.., prev, last] => last / prev * last,
            _ => self.last_price(),
        };
        let dividend = price / price_to_dividend_ratio;
        self.push(price, dividend);
        (price, dividend)
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn dividends(&self) -> &[f64] {
        &self.dividends
    }

    /// Number of recorded points, seed included
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Number of market steps taken since the seed
    pub fn steps(&self) -> usize {
        self.prices.len().saturating_sub(1)
    }

    pub fn last_price(&self) -> f64 {
        self.prices.last().copied().unwrap_or(f64::NAN)
    }

    pub fn last_dividend(&self) -> f64 {
        self.dividends.last().copied().unwrap_or(f64::NAN)
    }

    /// Daily rates of return, `(p[t] + d[t]) / p[t-1] - 1`
    pub fn ror_list(&self) -> Vec<f64> {
        self.prices
            .windows(2)
            .zip(self.dividends.iter().skip(1))
            .map(|(p, d)| (p[1] + d) / p[0] - 1.0)
            .collect()
    }

    /// Daily log returns, `ln((p[t] + d[t]) / p[t-1])`
    pub fn log_return_list(&self) -> Vec<f64> {
        self.prices
            .windows(2)
            .zip(self.dividends.iter().skip(1))
            .map(|(p, d)| ((p[1] + d) / p[0]).ln())
            .collect()
    }

    /// Price-only return of the last step; zero before the first step
    pub fn daily_rate_of_price_return(&self) -> f64 {
        match self.prices.as_slice() {
            [.., prev, last] => (last - prev) / prev,
            _ => 0.0,
        }
    }

    /// Summary of the recorded prices.
    ///
    /// Non-finite entries (the failure sentinel) are skipped; indices refer to
    /// positions in the full series.
    pub fn price_stats(&self) -> PriceStats {
        let finite: Vec<(usize, f64)> = self
            .prices
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .collect();
        let values: Vec<f64> = finite.iter().map(|(_, p)| *p).collect();

        let (idx_min, min_price) = stats::argmin(&values)
            .map(|i| finite[i])
            .unwrap_or((0, f64::NAN));
        let (idx_max, max_price) = stats::argmax(&values)
            .map(|i| finite[i])
            .unwrap_or((0, f64::NAN));

        PriceStats {
            min_price,
            max_price,
            idx_min,
            idx_max,
            mean_price: stats::mean(&values).unwrap_or(f64::NAN),
            std_price: stats::population_std(&values).unwrap_or(f64::NAN),
        }
    }
}

/// Min/max/mean/std over the recorded price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub min_price: f64,
    pub max_price: f64,
    pub idx_min: usize,
    pub idx_max: usize,
    pub mean_price: f64,
    pub std_price: f64,
}
