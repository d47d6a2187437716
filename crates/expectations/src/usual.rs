use sharkfin_core::{DailyBelief, Day, RiskyExpectations};
use sharkfin_ports::{Expectations, Market};

/// Belief fixed by the market's dividend growth and price-to-dividend ratio.
///
/// Recalculation is idempotent and ignores realized returns.
#[derive(Debug, Clone)]
pub struct UsualExpectations {
    days_per_quarter: usize,
    expected_ror_list: Vec<f64>,
    expected_std_list: Vec<f64>,
}

impl UsualExpectations {
    pub fn new(days_per_quarter: usize) -> Self {
        Self {
            days_per_quarter,
            expected_ror_list: Vec::new(),
            expected_std_list: Vec::new(),
        }
    }

    pub fn daily_belief(&self, market: &dyn Market) -> DailyBelief {
        market.parameters().structural_belief()
    }
}

impl Expectations for UsualExpectations {
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
        self.daily_belief(market).to_quarterly(self.days_per_quarter)
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
}
