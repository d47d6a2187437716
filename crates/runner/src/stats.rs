//! Summary statistics of a finished run.
//!
//! Each statistic is computed on its own; one that the data cannot support
//! is left out (`None`) and logged, the rest of the summary still stands.

use serde::Serialize;
use sharkfin_core::{BuySell, PriceStats};
use sharkfin_ports::ClassStats;
use sharkfin_stats as stats;
use std::collections::BTreeMap;

/// Categorical outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    PriceRange,
    InventoryLimit,
    Timeout,
    Unclassified,
}

impl RunStatus {
    pub fn code(self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::PriceRange => 1,
            RunStatus::InventoryLimit => 2,
            RunStatus::Timeout => 3,
            RunStatus::Unclassified => 99,
        }
    }

    /// Classify a failure message; no message means the run completed
    pub fn classify(failure: Option<&str>) -> Self {
        let Some(message) = failure else {
            return RunStatus::Completed;
        };
        let message = message.to_lowercase();
        if message.contains("price range") {
            RunStatus::PriceRange
        } else if message.contains("inventory") {
            RunStatus::InventoryLimit
        } else if message.contains("no market response") || message.contains("timeout") {
            RunStatus::Timeout
        } else {
            RunStatus::Unclassified
        }
    }
}

/// Moments of one order-volume series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VolumeStats {
    pub max: Option<u64>,
    pub idx_max: Option<usize>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl VolumeStats {
    pub fn from_volumes(name: &str, volumes: &[u64]) -> Self {
        let values: Vec<f64> = volumes.iter().map(|&v| v as f64).collect();
        Self {
            max: volumes.iter().copied().max(),
            idx_max: stats::argmax(&values),
            mean: stats::mean(&values),
            std: stats::population_std(&values),
            skew: logged(name, "skew", stats::skew(&values)),
            kurtosis: logged(name, "kurtosis", stats::kurtosis(&values)),
        }
    }
}

fn logged(series: &str, statistic: &str, value: Option<f64>) -> Option<f64> {
    if value.is_none() {
        tracing::warn!("Cannot compute {} of {}; omitted from summary", statistic, series);
    }
    value
}

/// Flat summary of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimStats {
    pub q: usize,
    pub r: usize,
    pub attention: Option<f64>,
    pub market_seeds: Vec<u64>,

    pub ror_mean: Option<f64>,
    pub ror_volatility: Option<f64>,

    pub buy: VolumeStats,
    pub sell: VolumeStats,
    pub max_buy_macro: Option<u64>,
    pub max_sell_macro: Option<u64>,

    pub price: PriceStats,
    pub price_dividend_correlation: Option<f64>,
    /// Durbin-Watson statistic of log returns minus 2
    pub log_return_autocorrelation: Option<f64>,
    /// Durbin-Watson statistic of squared log returns minus 2
    pub log_return_squared_autocorrelation: Option<f64>,

    pub total_population_a_lvl_mean: Option<f64>,
    pub total_population_a_lvl_std: Option<f64>,
    pub class_stats: Option<Vec<ClassStats>>,

    pub expectations: BTreeMap<&'static str, f64>,
    pub dollars_per_hark_money_unit: f64,
    pub seconds: i64,

    pub status: RunStatus,
    pub status_code: i32,
    pub failure: Option<String>,
}

/// Everything a summary is computed from
pub struct SummaryInput<'a> {
    pub q: usize,
    pub r: usize,
    pub attention: Option<f64>,
    pub market_seeds: Vec<u64>,
    /// Realized returns of the tracked days
    pub rors: &'a [f64],
    pub log_returns: &'a [f64],
    pub prices: &'a [f64],
    pub dividends: &'a [f64],
    pub price_stats: PriceStats,
    pub buy_sell: &'a [BuySell],
    pub buy_sell_macro: &'a [BuySell],
    pub a_lvls: &'a [f64],
    pub class_stats: Option<&'a [ClassStats]>,
    pub expectations: Vec<(&'static str, f64)>,
    pub dollars_per_hark_money_unit: f64,
    pub seconds: i64,
    pub failure: Option<&'a str>,
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

impl SimStats {
    pub fn compute(input: SummaryInput<'_>) -> Self {
        let rors = finite(input.rors);
        let log_returns = finite(input.log_returns);
        let squared: Vec<f64> = log_returns.iter().map(|r| r * r).collect();

        let buys: Vec<u64> = input.buy_sell.iter().map(|bs| bs.buy).collect();
        let sells: Vec<u64> = input.buy_sell.iter().map(|bs| bs.sell).collect();

        let (prices, dividends): (Vec<f64>, Vec<f64>) = input
            .prices
            .iter()
            .zip(input.dividends)
            .filter(|(p, d)| p.is_finite() && d.is_finite())
            .map(|(p, d)| (*p, *d))
            .unzip();

        let status = RunStatus::classify(input.failure);

        Self {
            q: input.q,
            r: input.r,
            attention: input.attention,
            market_seeds: input.market_seeds,
            ror_mean: stats::mean(&rors),
            ror_volatility: stats::sample_std(&rors),
            buy: VolumeStats::from_volumes("buy volume", &buys),
            sell: VolumeStats::from_volumes("sell volume", &sells),
            max_buy_macro: input.buy_sell_macro.iter().map(|bs| bs.buy).max(),
            max_sell_macro: input.buy_sell_macro.iter().map(|bs| bs.sell).max(),
            price: input.price_stats,
            price_dividend_correlation: logged(
                "prices and dividends",
                "correlation",
                stats::correlation(&prices, &dividends),
            ),
            log_return_autocorrelation: logged(
                "log returns",
                "Durbin-Watson",
                stats::durbin_watson(&log_returns),
            )
            .map(|dw| dw - 2.0),
            log_return_squared_autocorrelation: logged(
                "squared log returns",
                "Durbin-Watson",
                stats::durbin_watson(&squared),
            )
            .map(|dw| dw - 2.0),
            total_population_a_lvl_mean: stats::mean(input.a_lvls),
            total_population_a_lvl_std: stats::population_std(input.a_lvls),
            class_stats: input.class_stats.map(<[ClassStats]>::to_vec),
            expectations: input.expectations.into_iter().collect(),
            dollars_per_hark_money_unit: input.dollars_per_hark_money_unit,
            seconds: input.seconds,
            status,
            status_code: status.code(),
            failure: input.failure.map(str::to_string),
        }
    }
}
