//! Attention Simulation Integration Test
//!
//! Drives full runs of the attention loop against the stochastic market
//! with the reference population and every belief policy.

use sharkfin_core::Day;
use sharkfin_expectations::{ChartistParams, ExpectationsConfig};
use sharkfin_market::{StochasticMarket, StochasticMarketConfig};
use sharkfin_ports::{Agent, Expectations, Market, Population};
use sharkfin_runner::{
    AttentionSimulation, MertonPopulation, MertonPopulationConfig, RunStatus, SimulationConfig,
    SimulationError, SimulationState,
};

type Sim = AttentionSimulation<MertonPopulation, StochasticMarket>;

fn config(attention_rate: f64, burn_in_days: usize) -> SimulationConfig {
    SimulationConfig {
        quarters: 2,
        runs_per_quarter: 10,
        days_per_quarter: 30,
        attention_rate: Some(attention_rate),
        burn_in_days,
        seed: Some(21),
    }
}

fn simulation(config: SimulationConfig, policy: &ExpectationsConfig) -> Sim {
    let market = StochasticMarket::new(StochasticMarketConfig::default().with_seed(8)).unwrap();
    let expectations = policy.build(config.days_per_quarter).unwrap();
    let initial = expectations.risky_expectations(&market, None);
    let population = MertonPopulation::new(&MertonPopulationConfig::default(), initial);
    AttentionSimulation::new(config, population, market, expectations).unwrap()
}

fn policies() -> Vec<ExpectationsConfig> {
    vec![
        ExpectationsConfig::Usual,
        ExpectationsConfig::Chartist(ChartistParams::default()),
        ExpectationsConfig::Inferential {
            params: ChartistParams::default(),
            zeta: 0.5,
        },
    ]
}

/// Test that every day has one market step, one belief update and one row
#[test]
fn test_days_steps_and_beliefs_line_up() {
    let _ = tracing_subscriber::fmt::try_init();

    for policy in policies() {
        let mut sim = simulation(config(0.2, 5), &policy);
        let status = sim.simulate().unwrap();
        assert_eq!(status, RunStatus::Completed, "{}", policy.name());

        let market = sim.market();
        let steps = market.history().steps();
        // 5 burn-in days + 2 quarters of 30 days
        assert_eq!(steps, 65);
        assert_eq!(market.prices().len(), market.dividends().len());
        assert_eq!(sim.expectations().expected_ror_list().len(), steps);
        assert_eq!(sim.broker().buy_sell_history().len(), steps);
        assert_eq!(sim.broker().buy_sell_macro_history().len(), steps);

        let data = sim.data();
        assert_eq!(data.len(), 60);
        assert!(data.iter().all(|row| row.price.is_finite()));
        assert_eq!(data[0].price, market.prices()[6]);
        let last_belief = sim.expectations().expected_ror_list().last().copied();
        assert_eq!(Some(data[59].expected_ror), last_belief);
    }
}

/// Test that padding days carry no volume
#[test]
fn test_padding_days_are_empty() {
    let mut sim = simulation(config(1.0, 0), &ExpectationsConfig::Usual);
    sim.simulate().unwrap();

    // 3 days per run: only the first day of each run trades
    for (t, row) in sim.data().iter().enumerate() {
        if t % 3 != 0 {
            assert_eq!((row.buy, row.sell, row.buy_macro, row.sell_macro), (0, 0, 0, 0));
        }
    }
}

/// Test that without attention only macro updates reach the market
#[test]
fn test_zero_attention_trades_macro_orders_only() {
    let mut sim = simulation(config(0.0, 0), &ExpectationsConfig::Usual);
    sim.simulate().unwrap();

    assert!(sim.attention_days().iter().all(Vec::is_empty));
    for row in sim.data() {
        assert_eq!(row.buy, row.buy_macro);
        assert_eq!(row.sell, row.sell_macro);
    }
}

/// Test that attention days index the return series
#[test]
fn test_full_attention_records_days() {
    let mut sim = simulation(config(1.0, 4), &ExpectationsConfig::Usual);
    sim.simulate().unwrap();

    let steps = sim.market().history().steps();
    for days in sim.attention_days() {
        // One attention per macro-step
        assert_eq!(days.len(), 20);
        assert_eq!(days[0], 3);
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert!(days.iter().all(|&day: &Day| day < steps));
    }
}

/// Test that macro days are fixed within the quarter
#[test]
fn test_macro_days_within_quarter() {
    let sim = simulation(config(0.5, 0), &ExpectationsConfig::Usual);
    let days: Vec<Day> = sim
        .population()
        .agents()
        .iter()
        .map(|agent| agent.macro_day())
        .collect();

    assert!(days.iter().all(|&day| day < 30));
    assert!(days.windows(2).any(|w| w[0] != w[1]));
}

/// Test that runs with the same seeds reproduce each other
#[test]
fn test_seeded_runs_are_deterministic() {
    let policy = ExpectationsConfig::Chartist(ChartistParams::default());
    let mut first = simulation(config(0.3, 2), &policy);
    let mut second = simulation(config(0.3, 2), &policy);
    first.simulate().unwrap();
    second.simulate().unwrap();

    assert_eq!(first.market().prices(), second.market().prices());
    assert_eq!(
        first.broker().buy_sell_history(),
        second.broker().buy_sell_history()
    );
    assert_eq!(first.seed(), 21);
}

/// Test the lifecycle of the state machine
#[test]
fn test_lifecycle() {
    let mut sim = simulation(config(0.5, 3), &ExpectationsConfig::Usual);
    assert_eq!(sim.state(), SimulationState::Uninitialized);

    sim.start_simulation().unwrap();
    assert_eq!(sim.state(), SimulationState::Running);
    assert_eq!(sim.burn_in(), 3);
    assert!(sim.history().snapshots().is_empty());
    assert!(matches!(
        sim.start_simulation(),
        Err(SimulationError::InvalidState { .. })
    ));

    sim.simulate().unwrap();
    assert_eq!(sim.state(), SimulationState::Completed);
    assert!(sim.market().is_closed());
    assert!(sim.start_time().unwrap() <= sim.end_time().unwrap());

    // A finished run reports its status again without simulating
    assert_eq!(sim.simulate().unwrap(), RunStatus::Completed);
    assert_eq!(sim.market().history().steps(), 63);
}

/// Test the summary of a completed run
#[test]
fn test_sim_stats() {
    let mut sim = simulation(
        config(0.5, 0),
        &ExpectationsConfig::Inferential {
            params: ChartistParams::default(),
            zeta: 0.3,
        },
    );
    sim.simulate().unwrap();
    let stats = sim.sim_stats();

    assert_eq!(stats.q, 2);
    assert_eq!(stats.r, 10);
    assert_eq!(stats.attention, Some(0.5));
    assert_eq!(stats.market_seeds, vec![8]);
    assert_eq!(stats.status_code, 0);
    assert!(stats.failure.is_none());
    assert!(stats.ror_volatility.unwrap() > 0.0);
    assert!(stats.log_return_autocorrelation.is_some());
    assert_eq!(stats.expectations.get("zeta"), Some(&0.3));
    assert_eq!(stats.class_stats.as_ref().map(Vec::len), Some(2));
    assert_eq!(stats.dollars_per_hark_money_unit, 1000.0);
    assert!(stats.total_population_a_lvl_mean.unwrap() > 0.0);
    assert!(stats.price.max_price >= stats.price.min_price);

    // Class statistics are kept for every tracked day, not just the last
    let by_day = sim.history().class_stats_by_day();
    assert_eq!(by_day.len(), sim.data().len());
    assert!(by_day.iter().all(|stats| stats.as_ref().map(Vec::len) == Some(2)));
    assert_eq!(by_day.last().unwrap().as_deref(), stats.class_stats.as_deref());
}

/// Test that an invalid configuration is rejected up front
#[test]
fn test_rejects_invalid_config() {
    let market = StochasticMarket::new(StochasticMarketConfig::default()).unwrap();
    let expectations = ExpectationsConfig::Usual.build(60).unwrap();
    let population = MertonPopulation::new(
        &MertonPopulationConfig::default(),
        expectations.risky_expectations(&market, None),
    );
    let config = SimulationConfig {
        runs_per_quarter: 7,
        ..Default::default()
    };

    assert!(matches!(
        AttentionSimulation::new(config, population, market, expectations),
        Err(SimulationError::Config(_))
    ));
}
