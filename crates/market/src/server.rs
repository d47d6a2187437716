//! Remote side of the market protocol.
//!
//! Answers each request on the request queue with a quote produced by a
//! pluggable function, publishing the reply with the request's correlation
//! id. Stops on an end-of-session request or when the request queue closes.

use sharkfin_transport::{MessageType, Publisher, Subscriber, TransportError, WireMessage};
use std::thread;
use std::time::Duration;

use crate::protocol::{MarketReply, MarketRequest};

/// What the server answers for one request
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    /// Legacy bare closing price
    Bare(f64),
    /// JSON reply with optional market state
    Json(MarketReply),
    /// Arbitrary body, for exercising malformed replies
    Raw(String),
    /// No reply at all
    Silent,
}

impl ServerReply {
    pub fn stopped(reason: &str) -> Self {
        ServerReply::Json(MarketReply {
            closing_price: f64::NAN,
            market_state: Some(format!("Stopped: {reason}")),
        })
    }

    fn body(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self {
            ServerReply::Bare(price) => Ok(Some(price.to_string().into_bytes())),
            ServerReply::Json(reply) => Ok(Some(serde_json::to_vec(reply)?)),
            ServerReply::Raw(body) => Ok(Some(body.clone().into_bytes())),
            ServerReply::Silent => Ok(None),
        }
    }
}

pub struct MarketServer<P, S, Q>
where
    P: Publisher,
    S: Subscriber,
    Q: FnMut(&MarketRequest) -> ServerReply,
{
    publisher: P,
    subscriber: S,
    quote: Q,
    source: String,
    default_reply_queue: String,
    sequence: u64,
    served: usize,
    finished: bool,
}

impl<P, S, Q> MarketServer<P, S, Q>
where
    P: Publisher,
    S: Subscriber,
    Q: FnMut(&MarketRequest) -> ServerReply,
{
    /// Serve requests from `subscriber`, replying on `publisher`
    pub fn new(publisher: P, subscriber: S, quote: Q) -> Self {
        Self {
            publisher,
            subscriber,
            quote,
            source: "market-server".to_string(),
            default_reply_queue: "market-replies".to_string(),
            sequence: 0,
            served: 0,
            finished: false,
        }
    }

    /// Requests answered so far
    pub fn served(&self) -> usize {
        self.served
    }

    /// Whether an end-of-session request has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Answer everything currently queued; returns how many requests were
    /// handled
    pub fn serve_pending(&mut self) -> Result<usize, TransportError> {
        let mut inbox = Vec::new();
        match self.subscriber.poll(&mut |data| inbox.push(data.to_vec())) {
            Ok(_) => {}
            Err(TransportError::ChannelClosed) => {
                self.finished = true;
                return Ok(0);
            }
            Err(e) => return Err(e),
        }

        let mut handled = 0;
        for data in inbox {
            let message = match WireMessage::decode(&data) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Server dropping undecodable request: {}", e);
                    continue;
                }
            };
            let request: MarketRequest = match message.decode_json() {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Server dropping request {}: {}", message.correlation_id, e);
                    continue;
                }
            };

            handled += 1;
            if request.end_simulation || message.message_type() == Ok(MessageType::EndSession) {
                tracing::info!("Market session ended after {} requests", self.served);
                self.finished = true;
                break;
            }

            let reply = (self.quote)(&request);
            self.served += 1;
            if let Some(body) = reply.body()? {
                self.sequence += 1;
                let response = WireMessage::response_to(&message, self.sequence, &self.source, body);
                let queue = message
                    .reply_to
                    .as_deref()
                    .unwrap_or(&self.default_reply_queue);
                self.publisher.publish_to(queue, &response.encode()?)?;
            }
        }
        Ok(handled)
    }

    /// Serve until the session ends, sleeping `poll_interval` between empty
    /// polls. Returns the number of requests answered.
    pub fn run(mut self, poll_interval: Duration) -> Result<usize, TransportError> {
        while !self.finished {
            if self.serve_pending()? == 0 && !self.finished {
                thread::sleep(poll_interval);
            }
        }
        Ok(self.served)
    }
}

/// Quote function pricing at the fundamental ratio with a linear imbalance
/// impact, `dividend * pd * (1 + impact * (bl - sl) / (1 + bl + sl))`
pub fn fundamental_quote(
    price_to_dividend_ratio: f64,
    price_impact: f64,
) -> impl FnMut(&MarketRequest) -> ServerReply + Send + 'static {
    move |request| {
        let buy = request.bl as f64;
        let sell = request.sl as f64;
        let imbalance = (buy - sell) / (1.0 + buy + sell);
        let price = request.dividend * price_to_dividend_ratio * (1.0 + price_impact * imbalance);
        ServerReply::Json(MarketReply::price(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharkfin_core::BuySell;
    use sharkfin_ports::RunArgs;
    use sharkfin_transport::channel_pair;

    fn request_bytes(request: &MarketRequest, id: &str) -> Vec<u8> {
        let msg_type = if request.end_simulation {
            MessageType::EndSession
        } else {
            MessageType::MarketRequest
        };
        WireMessage::json(msg_type, 1, "test", id, request)
            .unwrap()
            .reply_to("replies")
            .encode()
            .unwrap()
    }

    #[test]
    fn test_serves_and_correlates() {
        let (request_pub, request_sub) = channel_pair(16);
        let (reply_pub, reply_sub) = channel_pair(16);
        let mut server = MarketServer::new(reply_pub, request_sub, fundamental_quote(1000.0, 0.0));

        let request = MarketRequest::trade(BuySell::new(5, 5), 0.1, RunArgs::new());
        request_pub.publish(&request_bytes(&request, "req-1")).unwrap();

        assert_eq!(server.serve_pending().unwrap(), 1);

        let mut replies = Vec::new();
        reply_sub
            .poll(&mut |d| replies.push(WireMessage::decode(d).unwrap()))
            .unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].correlation_id, "req-1");
        let reply = crate::protocol::parse_reply(&replies[0].payload).unwrap();
        assert!((reply.closing_price - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_session_finishes() {
        let (request_pub, request_sub) = channel_pair(16);
        let (reply_pub, reply_sub) = channel_pair(16);
        let mut server = MarketServer::new(reply_pub, request_sub, |_| ServerReply::Bare(1.0));

        request_pub
            .publish(&request_bytes(&MarketRequest::end_session(0.1), "end"))
            .unwrap();
        server.serve_pending().unwrap();

        assert!(server.is_finished());
        assert_eq!(server.served(), 0);
        assert!(!reply_sub.has_messages());
    }

    #[test]
    fn test_silent_reply_publishes_nothing() {
        let (request_pub, request_sub) = channel_pair(16);
        let (reply_pub, reply_sub) = channel_pair(16);
        let mut server = MarketServer::new(reply_pub, request_sub, |_| ServerReply::Silent);

        let request = MarketRequest::trade(BuySell::ZERO, 0.1, RunArgs::new());
        request_pub.publish(&request_bytes(&request, "quiet")).unwrap();
        server.serve_pending().unwrap();

        assert_eq!(server.served(), 1);
        assert!(!reply_sub.has_messages());
    }

    #[test]
    fn test_closed_request_queue_finishes_run() {
        let (request_pub, request_sub) = channel_pair(16);
        let (reply_pub, _reply_sub) = channel_pair(16);
        drop(request_pub);

        let server = MarketServer::new(reply_pub, request_sub, |_| ServerReply::Bare(1.0));
        assert_eq!(server.run(Duration::from_millis(1)).unwrap(), 0);
    }

    #[test]
    fn test_fundamental_quote_direction() {
        let mut quote = fundamental_quote(1200.0, 0.05);
        let price_of = |reply: ServerReply| match reply {
            ServerReply::Json(r) => r.closing_price,
            other => panic!("unexpected {other:?}"),
        };
        let up = price_of(quote(&MarketRequest::trade(BuySell::new(100, 0), 0.1, RunArgs::new())));
        let flat = price_of(quote(&MarketRequest::trade(BuySell::ZERO, 0.1, RunArgs::new())));
        let down = price_of(quote(&MarketRequest::trade(BuySell::new(0, 100), 0.1, RunArgs::new())));
        assert!(up > flat && flat > down);
    }
}
