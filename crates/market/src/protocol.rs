//! Remote market wire protocol.
//!
//! Requests are JSON objects `{"bl", "sl", "dividend", "end_simulation", ..}`
//! with any extra run arguments flattened in. Responses are either a bare
//! number (closing price only) or a JSON object with `ClosingPrice` and an
//! optional `MarketState`.

use serde::{Deserialize, Deserializer, Serialize};
use sharkfin_core::BuySell;
use sharkfin_ports::{MarketError, MarketResult, RunArgs};

/// Prefix of a terminal market state
pub const STOPPED_PREFIX: &str = "Stopped";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRequest {
    /// Buy volume in whole shares
    pub bl: u64,
    /// Sell volume in whole shares
    pub sl: u64,
    pub dividend: f64,
    pub end_simulation: bool,
    #[serde(flatten)]
    pub extra: RunArgs,
}

impl MarketRequest {
    pub fn trade(buy_sell: BuySell, dividend: f64, extra: RunArgs) -> Self {
        Self {
            bl: buy_sell.buy,
            sl: buy_sell.sell,
            dividend,
            end_simulation: false,
            extra,
        }
    }

    pub fn end_session(dividend: f64) -> Self {
        Self {
            bl: 0,
            sl: 0,
            dividend,
            end_simulation: true,
            extra: RunArgs::new(),
        }
    }

    pub fn buy_sell(&self) -> BuySell {
        BuySell::new(self.bl, self.sl)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReply {
    /// JSON `null` (how NaN serializes) reads back as NaN
    #[serde(rename = "ClosingPrice", deserialize_with = "price_or_nan")]
    pub closing_price: f64,
    #[serde(rename = "MarketState", default, skip_serializing_if = "Option::is_none")]
    pub market_state: Option<String>,
}

impl MarketReply {
    pub fn price(closing_price: f64) -> Self {
        Self {
            closing_price,
            market_state: None,
        }
    }

    /// Terminal failure reason, if the market reports one
    pub fn stopped_reason(&self) -> Option<&str> {
        self.market_state
            .as_deref()
            .filter(|state| state.starts_with(STOPPED_PREFIX))
    }
}

fn price_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Parse a response body in either the bare-number or JSON form
pub fn parse_reply(body: &[u8]) -> MarketResult<MarketReply> {
    let text = std::str::from_utf8(body)
        .map_err(|e| MarketError::MalformedResponse(e.to_string()))?
        .trim();

    if let Some(price) = parse_bare_price(text) {
        return Ok(MarketReply::price(price));
    }

    let reply: MarketReply = serde_json::from_str(text)
        .map_err(|e| MarketError::MalformedResponse(format!("{e}: {text}")))?;
    Ok(reply)
}

fn parse_bare_price(text: &str) -> Option<f64> {
    let unquoted = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    unquoted.trim().parse::<f64>().ok()
}
