//! # Envelope Codec
//!
//! Length-prefixed transaction payloads.
//!
//! ```text
//! ┌──────────────────┬───────────────────────────────────────────────┐
//! │ uvarint length N │ N bytes: bincode { messages, fee, memo }      │
//! └──────────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! Each message is `{ route, msg_type, body }`. Bodies of
//! `start_subscription` messages are themselves bincode and are decoded into
//! [`StartSubscription`]; every other body stays opaque.

use bincode::Options;
use serde::{Deserialize, Serialize};

use super::varint::{decode_uvarint, encode_uvarint};
use crate::config::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::domain::{
    DecodeError, Fee, Message, StartSubscription, TransactionEnvelope, MSG_TYPE_START_SUBSCRIPTION,
};
use crate::ports::MessageDecoder;

#[derive(Serialize, Deserialize)]
struct WireMessage {
    route: String,
    msg_type: String,
    body: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    messages: Vec<WireMessage>,
    fee: Fee,
    memo: String,
}

fn codec_options() -> impl Options {
    bincode::DefaultOptions::new().reject_trailing_bytes()
}

fn decode_body<'a, T: Deserialize<'a>>(bytes: &'a [u8], limit: usize) -> Result<T, DecodeError> {
    codec_options()
        .with_limit(limit as u64)
        .deserialize(bytes)
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))
}

/// Decoder for length-prefixed envelopes.
#[derive(Clone, Debug)]
pub struct LengthPrefixedDecoder {
    max_payload_bytes: usize,
}

impl LengthPrefixedDecoder {
    /// Decoder accepting payloads up to `max_payload_bytes`.
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    /// Largest accepted payload.
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    fn decode_message(&self, wire: WireMessage) -> Result<Message, DecodeError> {
        if wire.msg_type == MSG_TYPE_START_SUBSCRIPTION {
            let msg: StartSubscription = codec_options()
                .with_limit(self.max_payload_bytes as u64)
                .deserialize(&wire.body)
                .map_err(|e| {
                    DecodeError::InvalidEncoding(format!("{} body: {}", MSG_TYPE_START_SUBSCRIPTION, e))
                })?;
            return Ok(Message::StartSubscription(msg));
        }

        Ok(Message::Unrecognized {
            route: wire.route,
            msg_type: wire.msg_type,
            body: wire.body,
        })
    }
}

impl Default for LengthPrefixedDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl MessageDecoder for LengthPrefixedDecoder {
    fn decode(&self, payload: &[u8]) -> Result<TransactionEnvelope, DecodeError> {
        let (declared, prefix_len) = decode_uvarint(payload)?;

        if declared > self.max_payload_bytes as u64 {
            return Err(DecodeError::TooLarge {
                declared,
                limit: self.max_payload_bytes,
            });
        }

        let body = &payload[prefix_len..];
        let available = body.len();
        if (available as u64) < declared {
            return Err(DecodeError::Truncated {
                declared,
                available,
            });
        }
        if available as u64 > declared {
            return Err(DecodeError::TrailingBytes(available - declared as usize));
        }

        let wire: WireEnvelope = decode_body(body, self.max_payload_bytes)?;

        let messages = wire
            .messages
            .into_iter()
            .map(|m| self.decode_message(m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionEnvelope {
            messages,
            fee: wire.fee,
            memo: wire.memo,
        })
    }
}

/// Prefix `body` with its varint length.
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    encode_uvarint(body.len() as u64, &mut out);
    out.extend_from_slice(body);
    out
}

/// Encode an envelope into a length-prefixed payload.
pub fn encode_envelope(envelope: &TransactionEnvelope) -> Result<Vec<u8>, bincode::Error> {
    let messages = envelope
        .messages
        .iter()
        .map(|message| -> Result<WireMessage, bincode::Error> {
            Ok(match message {
                Message::StartSubscription(msg) => WireMessage {
                    route: message.route().to_string(),
                    msg_type: message.msg_type().to_string(),
                    body: codec_options().serialize(msg)?,
                },
                Message::Unrecognized {
                    route,
                    msg_type,
                    body,
                } => WireMessage {
                    route: route.clone(),
                    msg_type: msg_type.clone(),
                    body: body.clone(),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let body = codec_options().serialize(&WireEnvelope {
        messages,
        fee: envelope.fee.clone(),
        memo: envelope.memo.clone(),
    })?;

    Ok(frame(&body))
}
