//! Remote Market Failure Integration Test
//!
//! Runs the attention loop against a `RemoteMarket` served from another
//! thread and checks that terminal market replies end the run with the
//! right status instead of an error.

use sharkfin_expectations::ExpectationsConfig;
use sharkfin_market::{MarketRequest, MarketServer, RemoteMarket, RemoteMarketConfig, ServerReply};
use sharkfin_ports::{Expectations, Market};
use sharkfin_runner::{
    AttentionSimulation, MertonPopulation, MertonPopulationConfig, RunStatus, SimulationConfig,
    SimulationState,
};
use sharkfin_transport::{BoxPublisher, BoxSubscriber, TransportConfig, TransportFactory};
use std::thread;
use std::time::Duration;

type Sim = AttentionSimulation<MertonPopulation, RemoteMarket<BoxPublisher, BoxSubscriber>>;

fn remote_config(timeout_ms: u64) -> RemoteMarketConfig {
    RemoteMarketConfig {
        transport: TransportConfig::channel(64),
        timeout_ms,
        seed: Some(3),
        ..Default::default()
    }
}

fn simulation<Q>(timeout_ms: u64, quote: Q) -> (Sim, thread::JoinHandle<usize>)
where
    Q: FnMut(&MarketRequest) -> ServerReply + Send + 'static,
{
    let config = remote_config(timeout_ms);
    let (client, server) = TransportFactory::create_session(&config.transport).unwrap();
    let handle = thread::spawn(move || {
        MarketServer::new(server.publisher, server.subscriber, quote)
            .run(Duration::from_millis(1))
            .unwrap()
    });
    let market = RemoteMarket::new(config, client.publisher, client.subscriber).unwrap();
    (attention_over(market), handle)
}

fn attention_over(market: RemoteMarket<BoxPublisher, BoxSubscriber>) -> Sim {
    let expectations = ExpectationsConfig::Usual.build(20).unwrap();
    let initial = expectations.risky_expectations(&market, None);
    let population = MertonPopulation::new(&MertonPopulationConfig::default(), initial);
    let sim_config = SimulationConfig {
        quarters: 1,
        runs_per_quarter: 10,
        days_per_quarter: 20,
        attention_rate: Some(0.5),
        burn_in_days: 0,
        seed: Some(5),
    };
    AttentionSimulation::new(sim_config, population, market, expectations).unwrap()
}

/// Quote that answers `healthy` requests, then replies with `failure`
fn failing_after(
    healthy: usize,
    failure: ServerReply,
) -> impl FnMut(&MarketRequest) -> ServerReply + Send + 'static {
    let mut served = 0;
    move |request| {
        served += 1;
        if served <= healthy {
            ServerReply::Bare(request.dividend * 1200.0)
        } else {
            failure.clone()
        }
    }
}

/// Test that a price-range stop ends the run with the price range status
#[test]
fn test_price_range_stop() {
    let _ = tracing_subscriber::fmt::try_init();
    let stop = ServerReply::stopped("Hit market maker price range");
    let (mut sim, handle) = simulation(2_000, failing_after(3, stop));

    let status = sim.simulate().unwrap();
    assert_eq!(status, RunStatus::PriceRange);
    assert_eq!(sim.state(), SimulationState::MarketFailed);

    // Three healthy runs of two days, then the failure sentinel
    let market = sim.market();
    assert_eq!(market.history().steps(), 7);
    assert!(market.prices().last().unwrap().is_nan());
    assert_eq!(market.prices().len(), market.dividends().len());
    assert!(market.is_closed());
    assert_eq!(sim.expectations().expected_ror_list().len(), 6);
    assert_eq!(sim.data().len(), 6);

    let stats = sim.sim_stats();
    assert_eq!(stats.status_code, 1);
    assert_eq!(stats.failure.as_deref(), Some("Stopped: Hit market maker price range"));
    assert!(stats.price.max_price.is_finite());

    assert_eq!(handle.join().unwrap(), 4);
}

/// Test that an inventory stop is classified
#[test]
fn test_inventory_stop() {
    let stop = ServerReply::stopped("Market maker inventory limit");
    let (mut sim, handle) = simulation(2_000, failing_after(1, stop));

    assert_eq!(sim.simulate().unwrap(), RunStatus::InventoryLimit);
    assert_eq!(sim.sim_stats().status_code, 2);
    handle.join().unwrap();
}

/// Test that a silent market times out
#[test]
fn test_silent_market_times_out() {
    let (mut sim, handle) = simulation(50, failing_after(2, ServerReply::Silent));

    assert_eq!(sim.simulate().unwrap(), RunStatus::Timeout);
    assert_eq!(sim.sim_stats().status_code, 3);
    assert!(sim.market().prices().last().unwrap().is_nan());
    handle.join().unwrap();
}

/// Test that a malformed reply falls into the catch-all status
#[test]
fn test_malformed_reply_is_unclassified() {
    let garbage = ServerReply::Raw("not a price".to_string());
    let (mut sim, handle) = simulation(2_000, failing_after(0, garbage));

    assert_eq!(sim.simulate().unwrap(), RunStatus::Unclassified);
    assert_eq!(sim.sim_stats().status_code, 99);
    assert!(sim.data().is_empty());
    handle.join().unwrap();
}

/// Test that a market whose server is gone ends the run instead of erroring
#[test]
fn test_dead_transport_ends_run() {
    let config = remote_config(2_000);
    let (client, server) = TransportFactory::create_session(&config.transport).unwrap();
    drop(server);
    let market = RemoteMarket::new(config, client.publisher, client.subscriber).unwrap();
    let mut sim = attention_over(market);

    assert_eq!(sim.simulate().unwrap(), RunStatus::Unclassified);
    assert_eq!(sim.state(), SimulationState::MarketFailed);

    let stats = sim.sim_stats();
    assert_eq!(stats.status_code, 99);
    assert!(stats.failure.as_deref().unwrap().contains("channel closed"));
    assert!(sim.data().is_empty());

    let market = sim.market();
    assert_eq!(market.prices().len(), 2);
    assert!(market.prices().last().unwrap().is_nan());
    assert!(market.is_closed());
}
