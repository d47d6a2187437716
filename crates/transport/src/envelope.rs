//! Market session envelope.
//!
//! A [`WireMessage`] wraps one JSON body (an order-flow request or a
//! price reply) with the routing data needed to pair replies to requests.
//! The envelope itself is bincode-encoded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TransportError;

/// Kind of message carried by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    /// One day of broker order flow to be cleared
    MarketRequest = 1,
    /// Clearing price for a request
    MarketResponse = 2,
    /// The simulation is done; the market sends nothing back
    EndSession = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = TransportError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            1 => Self::MarketRequest,
            2 => Self::MarketResponse,
            3 => Self::EndSession,
            unknown => return Err(TransportError::UnknownMessageType(unknown)),
        })
    }
}

impl From<MessageType> for u8 {
    fn from(kind: MessageType) -> Self {
        kind as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// [`MessageType`] tag, kept raw so unknown kinds still decode
    pub msg_type: u8,
    /// Per-sender counter
    pub sequence: u64,
    /// Wall clock at creation, nanoseconds since the epoch
    pub timestamp_ns: u64,
    /// Sender name, e.g. "sharkfin" or "market-server"
    pub source: String,
    /// Shared by a request and its reply
    pub correlation_id: String,
    /// Queue the reply should go to
    pub reply_to: Option<String>,
    pub payload: Vec<u8>,
}

impl WireMessage {
    /// Envelope with `body` serialized as JSON.
    pub fn json<T: Serialize>(
        msg_type: MessageType,
        sequence: u64,
        source: &str,
        correlation_id: &str,
        body: &T,
    ) -> Result<Self, TransportError> {
        let payload = serde_json::to_vec(body)?;
        Ok(Self::with_raw_payload(msg_type, sequence, source, correlation_id, payload))
    }

    /// Envelope around bytes that are already encoded.
    pub fn with_raw_payload(
        msg_type: MessageType,
        sequence: u64,
        source: &str,
        correlation_id: &str,
        payload: Vec<u8>,
    ) -> Self {
        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos() as u64);
        Self {
            msg_type: msg_type.into(),
            sequence,
            timestamp_ns,
            source: source.to_owned(),
            correlation_id: correlation_id.to_owned(),
            reply_to: None,
            payload,
        }
    }

    pub fn reply_to(mut self, queue: impl Into<String>) -> Self {
        self.reply_to = Some(queue.into());
        self
    }

    /// Market reply to `request`, tagged with the request's correlation id.
    pub fn response_to(request: &WireMessage, sequence: u64, source: &str, payload: Vec<u8>) -> Self {
        Self::with_raw_payload(
            MessageType::MarketResponse,
            sequence,
            source,
            &request.correlation_id,
            payload,
        )
    }

    pub fn message_type(&self) -> Result<MessageType, TransportError> {
        self.msg_type.try_into()
    }

    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.payload).map_err(Into::into)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        bincode::serialize(self).map_err(Into::into)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, TransportError> {
        bincode::deserialize(bytes).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn order_flow_survives_the_wire() {
        let order_flow = json!({"bl": 10, "sl": 3, "dividend": 0.08, "end_simulation": false});
        let request =
            WireMessage::json(MessageType::MarketRequest, 7, "sharkfin", "abc-123", &order_flow)
                .unwrap()
                .reply_to("market-replies");

        let bytes = request.encode().unwrap();
        let received = WireMessage::decode(&bytes).unwrap();

        assert_eq!(received, request);
        assert_eq!(received.message_type().unwrap(), MessageType::MarketRequest);
        let body: Value = received.decode_json().unwrap();
        assert_eq!(body["sl"], 3);
    }

    #[test]
    fn reply_is_paired_by_correlation_id() {
        let request =
            WireMessage::with_raw_payload(MessageType::MarketRequest, 1, "sharkfin", "id-1", vec![])
                .reply_to("out");
        let reply = WireMessage::response_to(&request, 4, "market", b"101.5".to_vec());

        assert_eq!(reply.correlation_id, request.correlation_id);
        assert_eq!(reply.message_type().unwrap(), MessageType::MarketResponse);
        assert_eq!(reply.sequence, 4);
        assert_eq!(reply.reply_to, None);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut message =
            WireMessage::with_raw_payload(MessageType::EndSession, 0, "sharkfin", "x", vec![]);
        assert_eq!(message.msg_type, 3);

        message.msg_type = 9;
        assert_eq!(
            message.message_type(),
            Err(TransportError::UnknownMessageType(9))
        );
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        assert!(matches!(
            WireMessage::decode(&[1, 2, 3]),
            Err(TransportError::Serialization(_))
        ));
    }

    #[test]
    fn non_json_payload_fails_to_decode() {
        let message =
            WireMessage::with_raw_payload(MessageType::MarketResponse, 0, "m", "id", b"{".to_vec());
        assert!(message.decode_json::<Value>().is_err());
    }
}
