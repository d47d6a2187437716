//! Bootstrap - wiring one run from a [`RunConfig`]
//!
//! Builds the market backend, the belief policy and the reference
//! population, then runs either the attention loop or a calibration shock.
//! A remote market is served in-process by a [`MarketServer`] on its own
//! thread, talking to the client over channel transport.

use serde::Serialize;
use sharkfin_market::{
    MarketServer, RemoteMarket, RemoteMarketConfig, StochasticMarket, StochasticMarketConfig,
    fundamental_quote,
};
use sharkfin_ports::Market;
use sharkfin_transport::TransportFactory;
use std::thread;

use crate::calibration::{CalibrationRecord, CalibrationSimulation, ShockResponse};
use crate::config::{MarketConfig, RunConfig};
use crate::error::Result;
use crate::history::DayRecord;
use crate::population::MertonPopulation;
use crate::simulation::AttentionSimulation;
use crate::stats::SimStats;

/// Everything a finished run reports
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunReport {
    Attention {
        stats: SimStats,
        data: Vec<DayRecord>,
    },
    Calibration {
        stats: SimStats,
        response: Option<ShockResponse>,
        data: Vec<CalibrationRecord>,
    },
}

impl RunReport {
    pub fn stats(&self) -> &SimStats {
        match self {
            RunReport::Attention { stats, .. } | RunReport::Calibration { stats, .. } => stats,
        }
    }
}

/// Run the configured simulation to the end
pub fn run(config: &RunConfig) -> Result<RunReport> {
    config.validate()?;
    match &config.market {
        MarketConfig::Stochastic(market) => run_stochastic(config, market),
        MarketConfig::Remote(market) => run_remote(config, market),
    }
}

fn run_stochastic(config: &RunConfig, market: &StochasticMarketConfig) -> Result<RunReport> {
    tracing::info!("Running against a stochastic market");
    let market = StochasticMarket::new(market.clone())?;
    run_with_market(config, market)
}

fn run_remote(config: &RunConfig, market: &RemoteMarketConfig) -> Result<RunReport> {
    tracing::info!(
        "Running against an in-process market server on {}",
        market.transport.request_queue
    );
    let (client, server) = TransportFactory::create_session(&market.transport)?;

    let quote = fundamental_quote(
        market.parameters.price_to_dividend_ratio,
        StochasticMarketConfig::default().price_impact,
    );
    let poll_interval = market.poll_interval();
    let handle = thread::spawn(move || {
        MarketServer::new(server.publisher, server.subscriber, quote).run(poll_interval)
    });

    let remote = RemoteMarket::new(market.clone(), client.publisher, client.subscriber)?;
    let report = run_with_market(config, remote);

    match handle.join() {
        Ok(Ok(served)) => tracing::info!("Market server answered {} requests", served),
        Ok(Err(e)) => tracing::warn!("Market server stopped with error: {}", e),
        Err(_) => tracing::error!("Market server thread panicked"),
    }
    report
}

fn run_with_market<M: Market>(config: &RunConfig, market: M) -> Result<RunReport> {
    let days_per_quarter = config.simulation.days_per_quarter;
    let expectations = config.expectations.build(days_per_quarter)?;
    let initial = expectations.risky_expectations(&market, None);
    let population = MertonPopulation::new(&config.population, initial);

    if let Some(calibration) = config.calibration {
        let mut sim = CalibrationSimulation::new(calibration, population, market, expectations);
        let status = sim.simulate()?;
        tracing::info!("Calibration finished with status {:?}", status);
        return Ok(RunReport::Calibration {
            stats: sim.sim_stats(),
            response: sim.response().copied(),
            data: sim.data(),
        });
    }

    let mut sim = AttentionSimulation::new(
        config.simulation.clone(),
        population,
        market,
        expectations,
    )?;
    let status = sim.simulate()?;
    tracing::info!("Simulation finished with status {:?}", status);
    Ok(RunReport::Attention {
        stats: sim.sim_stats(),
        data: sim.data(),
    })
}
