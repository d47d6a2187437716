use sharkfin_core::finance::lognormal_moments_to_normal;
use sharkfin_core::{DailyBelief, Day, RiskyExpectations};
use sharkfin_ports::{Expectations, Market};
use sharkfin_stats::{ks_one_sample, normal_cdf};

use crate::chartist::{ChartistExpectations, ChartistParams};
use crate::usual::UsualExpectations;

/// Per-agent choice between the usual and the chartist ("strange") belief.
///
/// The returns an agent attended to are tested against the log-normal
/// distribution implied by the usual belief. Agents whose observations
/// reject it at level `zeta` hold the strange belief.
///
/// The entry recorded for a market step is the mean daily belief handed out
/// on that step's information, or the usual belief when nobody attended.
#[derive(Debug, Clone)]
pub struct InferentialExpectations {
    usual: UsualExpectations,
    strange: ChartistExpectations,
    zeta: f64,
    expected_ror_list: Vec<f64>,
    expected_std_list: Vec<f64>,
    /// Beliefs handed out since the latest step
    handed_out: usize,
}

impl InferentialExpectations {
    pub fn new(params: ChartistParams, zeta: f64, days_per_quarter: usize) -> Self {
        Self {
            usual: UsualExpectations::new(days_per_quarter),
            strange: ChartistExpectations::new(params, days_per_quarter),
            zeta,
            expected_ror_list: Vec::new(),
            expected_std_list: Vec::new(),
            handed_out: 0,
        }
    }

    pub fn zeta(&self) -> f64 {
        self.zeta
    }

    /// KS p-value of the attended gross returns under the usual belief.
    ///
    /// `None` when no attention day falls inside the return history.
    pub fn p_value(&self, market: &dyn Market, attention_days: &[Day]) -> Option<f64> {
        let rors = market.ror_list();
        let observed: Vec<f64> = attention_days
            .iter()
            .filter_map(|&day| rors.get(day))
            .map(|r| 1.0 + r)
            .filter(|gross| gross.is_finite())
            .collect();

        let belief = self.usual.daily_belief(market);
        let (mu, sigma) = lognormal_moments_to_normal(1.0 + belief.ror, belief.std);
        let lognormal_cdf = |x: f64| {
            if x <= 0.0 {
                0.0
            } else {
                normal_cdf(x.ln(), mu, sigma)
            }
        };

        ks_one_sample(&observed, lognormal_cdf).map(|test| test.p_value)
    }

    fn is_strange(&self, market: &dyn Market, attention_days: Option<&[Day]>) -> bool {
        let Some(days) = attention_days.filter(|days| !days.is_empty()) else {
            return false;
        };
        if self.zeta <= 0.0 {
            return false;
        }
        if self.zeta >= 1.0 {
            return true;
        }
        match self.p_value(market, days) {
            Some(p) => {
                tracing::trace!("Inferential p-value {p:.4} against zeta {}", self.zeta);
                p < self.zeta
            }
            None => false,
        }
    }

    fn strange_belief(&self, market: &dyn Market) -> DailyBelief {
        match (
            self.strange.expected_ror_list().last(),
            self.strange.expected_std_list().last(),
        ) {
            (Some(&ror), Some(&std)) => DailyBelief::new(ror, std),
            _ => self.strange.daily_belief(market),
        }
    }

    fn belief(&self, market: &dyn Market, attention_days: Option<&[Day]>) -> DailyBelief {
        if self.is_strange(market, attention_days) {
            self.strange_belief(market)
        } else {
            self.usual.daily_belief(market)
        }
    }

    /// Fold `belief` into the running mean of the latest entry
    fn record(&mut self, belief: DailyBelief) {
        let (Some(ror), Some(std)) = (
            self.expected_ror_list.last_mut(),
            self.expected_std_list.last_mut(),
        ) else {
            return;
        };
        self.handed_out += 1;
        let weight = 1.0 / self.handed_out as f64;
        *ror += (belief.ror - *ror) * weight;
        *std += (belief.std - *std) * weight;
    }
}

impl Expectations for InferentialExpectations {
    fn calculate_risky_expectations(&mut self, market: &dyn Market) {
        self.usual.calculate_risky_expectations(market);
        self.strange.calculate_risky_expectations(market);

        let usual = self.usual.daily_belief(market);
        self.expected_ror_list.push(usual.ror);
        self.expected_std_list.push(usual.std);
        self.handed_out = 0;
    }

    fn risky_expectations(
        &self,
        market: &dyn Market,
        attention_days: Option<&[Day]>,
    ) -> RiskyExpectations {
        self.belief(market, attention_days)
            .to_quarterly(self.usual.days_per_quarter())
    }

    fn hand_out_expectations(
        &mut self,
        market: &dyn Market,
        attention_days: Option<&[Day]>,
    ) -> RiskyExpectations {
        let belief = self.belief(market, attention_days);
        self.record(belief);
        belief.to_quarterly(self.usual.days_per_quarter())
    }

    fn expected_ror_list(&self) -> &[f64] {
        &self.expected_ror_list
    }

    fn expected_std_list(&self) -> &[f64] {
        &self.expected_std_list
    }

    fn days_per_quarter(&self) -> usize {
        self.usual.days_per_quarter()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        let mut parameters = self.strange.parameters();
        parameters.push(("zeta", self.zeta));
        parameters
    }
}
