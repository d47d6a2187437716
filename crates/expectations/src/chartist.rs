use serde::{Deserialize, Serialize};
use sharkfin_core::{DailyBelief, Day, RiskyExpectations};
use sharkfin_ports::{Expectations, Market};

/// Memory parameters of the chartist policy.
///
/// After `delta_t1` days a return's weight relative to the latest return has
/// decayed to `p1`; after `delta_t2` days of history the structural prior
/// keeps weight `p2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartistParams {
    #[serde(default = "default_p")]
    pub p1: f64,
    #[serde(default = "default_delta_t1")]
    pub delta_t1: f64,
    #[serde(default = "default_p")]
    pub p2: f64,
    #[serde(default = "default_delta_t2")]
    pub delta_t2: f64,
}

fn default_p() -> f64 {
    0.1
}

fn default_delta_t1() -> f64 {
    30.0
}

fn default_delta_t2() -> f64 {
    60.0
}

impl Default for ChartistParams {
    fn default() -> Self {
        Self {
            p1: default_p(),
            delta_t1: default_delta_t1(),
            p2: default_p(),
            delta_t2: default_delta_t2(),
        }
    }
}

impl ChartistParams {
    /// Backward-in-time decay rate
    pub fn a(&self) -> f64 {
        -self.p1.ln() / self.delta_t1
    }

    /// Decay rate of the prior's weight
    pub fn b(&self) -> f64 {
        self.p2.ln() / self.delta_t2
    }
}

/// Exponentially weighted belief over `rors` plus one prior data point.
///
/// Day `t` (most recent last) has weight `(1 - S) exp(a (t+1)) / D` with
/// `D = sum exp(a (l+1))` and `S = exp(b n)`; the prior has weight `S`.
/// Exponents are shifted by `n` so long histories do not overflow.
pub fn memory_weighted_belief(rors: &[f64], prior: DailyBelief, a: f64, b: f64) -> DailyBelief {
    let n = rors.len();
    if n == 0 {
        return prior;
    }

    let prior_weight = (b * n as f64).exp();
    let history_weight = 1.0 - prior_weight;
    let raw: Vec<f64> = (0..n)
        .map(|t| (a * (t as f64 + 1.0 - n as f64)).exp())
        .collect();
    let norm: f64 = raw.iter().sum();

    let ror = prior_weight * prior.ror
        + history_weight * raw.iter().zip(rors).map(|(w, r)| w * r).sum::<f64>() / norm;
    let variance = prior_weight * prior.std * prior.std
        + history_weight
            * raw
                .iter()
                .zip(rors)
                .map(|(w, r)| w * (r - ror).powi(2))
                .sum::<f64>()
            / norm;

    DailyBelief {
        ror,
        std: variance.max(0.0).sqrt(),
    }
}

/// Belief weighted over the full realized-return history.
///
/// Recomputed from the entire history on every update.
#[derive(Debug, Clone)]
pub struct ChartistExpectations {
    params: ChartistParams,
    a: f64,
    b: f64,
    days_per_quarter: usize,
    expected_ror_list: Vec<f64>,
    expected_std_list: Vec<f64>,
}

impl ChartistExpectations {
    pub fn new(params: ChartistParams, days_per_quarter: usize) -> Self {
        Self {
            a: params.a(),
            b: params.b(),
            params,
            days_per_quarter,
            expected_ror_list: Vec::new(),
            expected_std_list: Vec::new(),
        }
    }

    pub fn params(&self) -> &ChartistParams {
        &self.params
    }

    pub fn daily_belief(&self, market: &dyn Market) -> DailyBelief {
        let prior = market.parameters().structural_belief();
        memory_weighted_belief(&market.ror_list(), prior, self.a, self.b)
    }
}

impl Expectations for ChartistExpectations {
    fn calculate_risky_expectations(&mut self, market: &dyn Market) {
        let belief = self.daily_belief(market);
        self.expected_ror_list.push(belief.ror);
        self.expected_std_list.push(belief.std);
    }

    fn risky_expectations(
        &self,
        market: &dyn Market,
        _attention_days: Option<&[Day]>,
    ) -> RiskyExpectations {
        let belief = match (self.expected_ror_list.last(), self.expected_std_list.last()) {
            (Some(&ror), Some(&std)) => DailyBelief::new(ror, std),
            _ => self.daily_belief(market),
        };
        belief.to_quarterly(self.days_per_quarter)
    }

    fn expected_ror_list(&self) -> &[f64] {
        &self.expected_ror_list
    }

    fn expected_std_list(&self) -> &[f64] {
        &self.expected_std_list
    }

    fn days_per_quarter(&self) -> usize {
        self.days_per_quarter
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("p1", self.params.p1),
            ("p2", self.params.p2),
            ("delta_t1", self.params.delta_t1),
            ("delta_t2", self.params.delta_t2),
        ]
    }
}
