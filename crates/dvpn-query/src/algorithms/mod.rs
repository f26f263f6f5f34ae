//! # Algorithms Module
//!
//! Payload decoding and event-log extraction used by the resolution pipeline.

pub mod envelope_codec;
pub mod event_extraction;
pub mod varint;

pub use envelope_codec::{encode_envelope, frame, LengthPrefixedDecoder};
pub use event_extraction::{
    extract_subscription_id, flatten_events, SUBSCRIPTION_EVENT_INDEX,
    SUBSCRIPTION_ID_ATTRIBUTE_INDEX,
};
pub use varint::{decode_uvarint, encode_uvarint, MAX_VARINT_LEN};
