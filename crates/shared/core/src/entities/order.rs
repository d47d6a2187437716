use serde::{Deserialize, Serialize};

/// Per-agent share deltas for one day.
///
/// Positive entries are buys, negative entries are sells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    deltas: Vec<f64>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one agent's share delta
    pub fn push(&mut self, delta: f64) {
        self.deltas.push(delta);
    }

    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Total of the positive deltas
    pub fn buy_volume(&self) -> f64 {
        self.deltas.iter().filter(|d| **d > 0.0).sum()
    }

    /// Total magnitude of the negative deltas
    pub fn sell_volume(&self) -> f64 {
        self.deltas.iter().filter(|d| **d < 0.0).map(|d| -d).sum()
    }
}

impl From<Vec<f64>> for Order {
    fn from(deltas: Vec<f64>) -> Self {
        Self { deltas }
    }
}

impl FromIterator<f64> for Order {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            deltas: iter.into_iter().collect(),
        }
    }
}

/// Whole-share buy and sell volume submitted to the market for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuySell {
    pub buy: u64,
    pub sell: u64,
}

impl BuySell {
    pub const ZERO: BuySell = BuySell { buy: 0, sell: 0 };

    pub fn new(buy: u64, sell: u64) -> Self {
        Self { buy, sell }
    }

    /// Truncate accumulated fractional volumes to whole shares.
    ///
    /// Fractional remainders are dropped, never carried over.
    pub fn truncate(buy: f64, sell: f64) -> Self {
        Self {
            buy: whole_shares(buy),
            sell: whole_shares(sell),
        }
    }

    /// Net signed volume (buy minus sell)
    pub fn net(&self) -> i64 {
        self.buy as i64 - self.sell as i64
    }

    /// Total traded volume
    pub fn total(&self) -> u64 {
        self.buy + self.sell
    }
}

fn whole_shares(volume: f64) -> u64 {
    if volume.is_finite() && volume > 0.0 {
        volume.trunc() as u64
    } else {
        0
    }
}
