use sharkfin_core::{Day, RiskyExpectations};

use crate::market::Market;

/// Port for a belief-update policy over the risky asset's return.
///
/// `calculate_risky_expectations` is called exactly once per market step and
/// appends one entry to each belief list.
pub trait Expectations: Send {
    /// Update beliefs from the market's latest history
    fn calculate_risky_expectations(&mut self, market: &dyn Market);

    /// Latest belief scaled to a quarter.
    ///
    /// `attention_days` lists the indices into the market's return series an
    /// agent has observed; policies that do not condition on it ignore it.
    fn risky_expectations(
        &self,
        market: &dyn Market,
        attention_days: Option<&[Day]>,
    ) -> RiskyExpectations;

    /// Belief given to one attending agent.
    ///
    /// Same value as [`Expectations::risky_expectations`]; policies whose
    /// lists report what agents actually received record it here.
    fn hand_out_expectations(
        &mut self,
        market: &dyn Market,
        attention_days: Option<&[Day]>,
    ) -> RiskyExpectations {
        self.risky_expectations(market, attention_days)
    }

    fn expected_ror_list(&self) -> &[f64];

    fn expected_std_list(&self) -> &[f64];

    fn days_per_quarter(&self) -> usize;

    /// Named tuning parameters, reported in run summaries
    fn parameters(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }
}
