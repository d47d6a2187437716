//! Market reached over a message-passing request/response session.
//!
//! `run_market` publishes one request and then polls the reply queue with
//! exponential backoff until a response carrying the request's correlation
//! id arrives. Responses for any other id are discarded. The wait is bounded
//! by the configured timeout; with `max_retries > 0` the request is
//! republished under a fresh correlation id before giving up.
//!
//! Any failure (stopped market, timeout, malformed response, transport
//! error) records a NaN price, closes the session and surfaces as a
//! [`MarketError`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use sharkfin_core::{BuySell, MarketHistory, MarketParameters};
use sharkfin_ports::{Market, MarketError, MarketResult, RunArgs};
use sharkfin_transport::{MessageType, Publisher, Subscriber, WireMessage};
use std::thread;
use std::time::Instant;
use uuid::Uuid;

use crate::config::{MarketConfigError, RemoteMarketConfig};
use crate::dividend::DividendProcess;
use crate::protocol::{MarketReply, MarketRequest, parse_reply};

const RESERVED_KEYS: [&str; 4] = ["bl", "sl", "dividend", "end_simulation"];

/// Request awaiting its response
#[derive(Debug, Clone)]
struct Pending {
    correlation_id: String,
    request: MarketRequest,
}

pub struct RemoteMarket<P: Publisher, S: Subscriber> {
    config: RemoteMarketConfig,
    publisher: P,
    subscriber: S,
    history: MarketHistory,
    dividends: DividendProcess,
    rng: StdRng,
    seed: u64,
    sequence: u64,
    pending: Option<Pending>,
    closed: bool,
}

impl<P: Publisher, S: Subscriber> RemoteMarket<P, S> {
    /// Build a market over `publisher` (request queue) and `subscriber`
    /// (reply queue)
    pub fn new(
        config: RemoteMarketConfig,
        publisher: P,
        subscriber: S,
    ) -> Result<Self, MarketConfigError> {
        config.validate()?;
        let dividends = DividendProcess::new(&config.parameters)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let history = MarketHistory::new(
            config.initial_price,
            config.parameters.dividend_for(config.initial_price),
        );

        Ok(Self {
            config,
            publisher,
            subscriber,
            history,
            dividends,
            rng: StdRng::seed_from_u64(seed),
            seed,
            sequence: 0,
            pending: None,
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Correlation id of the request in flight, if any
    pub fn in_flight(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.correlation_id.as_str())
    }

    /// Publish a request for one day of clearing without waiting.
    ///
    /// Only one request may be in flight; a second submission before
    /// [`RemoteMarket::await_response`] completes is refused.
    pub fn submit(&mut self, buy_sell: BuySell, run_args: &RunArgs) -> MarketResult<String> {
        if self.closed {
            return Err(MarketError::Closed);
        }
        if let Some(pending) = &self.pending {
            return Err(MarketError::RequestInFlight(pending.correlation_id.clone()));
        }

        let dividend = self
            .dividends
            .next(self.history.last_dividend(), &mut self.rng);
        let request = MarketRequest::trade(buy_sell, dividend, self.merged_args(run_args));
        let correlation_id = match self.publish_request(&request) {
            Ok(id) => id,
            Err(err) => return Err(self.fail(dividend, err)),
        };

        self.pending = Some(Pending {
            correlation_id: correlation_id.clone(),
            request,
        });
        Ok(correlation_id)
    }

    /// Wait for the response to the request in flight and record the day
    pub fn await_response(&mut self) -> MarketResult<(f64, f64)> {
        let Some(pending) = self.pending.take() else {
            return Err(MarketError::Transport("no request in flight".to_string()));
        };
        let dividend = pending.request.dividend;

        let reply = match self.wait_for_reply(pending) {
            Ok(reply) => reply,
            Err(err) => return Err(self.fail(dividend, err)),
        };

        if let Some(reason) = reply.stopped_reason() {
            let err = MarketError::Stopped(reason.to_string());
            return Err(self.fail(dividend, err));
        }
        if !reply.closing_price.is_finite() {
            let err = MarketError::MalformedResponse(format!(
                "closing price {}",
                reply.closing_price
            ));
            return Err(self.fail(dividend, err));
        }

        self.history.push(reply.closing_price, dividend);
        Ok((reply.closing_price, dividend))
    }

    fn merged_args(&self, run_args: &RunArgs) -> RunArgs {
        let mut merged = self.config.run_args.clone();
        for (key, value) in run_args {
            merged.insert(key.clone(), value.clone());
        }
        merged.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        merged
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn publish_request(&mut self, request: &MarketRequest) -> MarketResult<String> {
        let correlation_id = Uuid::new_v4().to_string();
        let sequence = self.next_sequence();
        let message = WireMessage::json(
            MessageType::MarketRequest,
            sequence,
            &self.config.source,
            &correlation_id,
            request,
        )
        .map_err(|e| MarketError::Transport(e.to_string()))?
        .reply_to(self.config.transport.reply_queue.clone());

        let bytes = message
            .encode()
            .map_err(|e| MarketError::Transport(e.to_string()))?;
        self.publisher
            .publish_to(&self.config.transport.request_queue, &bytes)
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        tracing::debug!(
            "Published request {} (bl={}, sl={})",
            correlation_id,
            request.bl,
            request.sl
        );
        Ok(correlation_id)
    }

    fn wait_for_reply(&mut self, mut pending: Pending) -> MarketResult<MarketReply> {
        let mut attempt = 0;
        loop {
            if let Some(reply) = self.poll_until_deadline(&pending.correlation_id)? {
                return Ok(reply);
            }
            if attempt >= self.config.max_retries {
                return Err(MarketError::Timeout(self.config.timeout()));
            }
            attempt += 1;
            tracing::warn!(
                "No response to {} within {:?}, retry {}/{}",
                pending.correlation_id,
                self.config.timeout(),
                attempt,
                self.config.max_retries
            );
            // A fresh id orphans any late reply to the abandoned attempt
            pending.correlation_id = self.publish_request(&pending.request)?;
        }
    }

    fn poll_until_deadline(&mut self, correlation_id: &str) -> MarketResult<Option<MarketReply>> {
        let deadline = Instant::now() + self.config.timeout();
        let mut backoff = self.config.poll_interval();

        loop {
            if let Some(body) = self.poll_once(correlation_id)? {
                return parse_reply(&body).map(Some);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(backoff.min(deadline - now));
            backoff = (backoff * 2).min(self.config.max_backoff());
        }
    }

    /// Drain the reply queue, keeping the first body matching `correlation_id`
    fn poll_once(&mut self, correlation_id: &str) -> MarketResult<Option<Vec<u8>>> {
        let mut matched: Option<Vec<u8>> = None;
        self.subscriber
            .poll(&mut |data| match WireMessage::decode(data) {
                Ok(message) if message.correlation_id == correlation_id => {
                    if matched.is_none() {
                        matched = Some(message.payload);
                    }
                }
                Ok(message) => {
                    tracing::warn!(
                        "Discarding response for {} while awaiting {}",
                        message.correlation_id,
                        correlation_id
                    );
                }
                Err(e) => tracing::warn!("Discarding undecodable response: {}", e),
            })
            .map_err(|e| MarketError::Transport(e.to_string()))?;
        Ok(matched)
    }

    /// Record the failure sentinel, close the session and hand back `err`
    fn fail(&mut self, dividend: f64, err: MarketError) -> MarketError {
        tracing::error!("Market failure: {}", err);
        self.history.push(f64::NAN, dividend);
        if let Err(close_err) = self.close_market() {
            tracing::warn!("Failed to close market session: {}", close_err);
        }
        err
    }
}

impl<P: Publisher, S: Subscriber> Market for RemoteMarket<P, S> {
    fn run_market(&mut self, buy_sell: BuySell, run_args: &RunArgs) -> MarketResult<(f64, f64)> {
        self.submit(buy_sell, run_args)?;
        self.await_response()
    }

    fn dummy_run(&mut self) -> (f64, f64) {
        self.history
            .push_extrapolated(self.config.parameters.price_to_dividend_ratio)
    }

    /// Publish the end-of-session request; no response is expected
    fn close_market(&mut self) -> MarketResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending = None;

        let request = MarketRequest::end_session(self.history.last_dividend());
        let sequence = self.next_sequence();
        let message = WireMessage::json(
            MessageType::EndSession,
            sequence,
            &self.config.source,
            &Uuid::new_v4().to_string(),
            &request,
        )
        .map_err(|e| MarketError::Transport(e.to_string()))?;
        let bytes = message
            .encode()
            .map_err(|e| MarketError::Transport(e.to_string()))?;

        self.publisher
            .publish_to(&self.config.transport.request_queue, &bytes)
            .map_err(|e| MarketError::Transport(e.to_string()))?;
        tracing::info!("Closed market session on {}", self.config.transport.request_queue);
        Ok(())
    }

    fn history(&self) -> &MarketHistory {
        &self.history
    }

    fn parameters(&self) -> MarketParameters {
        self.config.parameters
    }

    fn seeds(&self) -> Vec<u64> {
        vec![self.seed]
    }
}
