//! # Transaction Messages
//!
//! Decoded form of a transaction payload: an envelope holding typed messages.

use serde::{Deserialize, Serialize};

use super::value_objects::{Coin, NodeId};

/// Route of the VPN module.
pub const MSG_ROUTE_VPN: &str = "vpn";

/// Message type that opens a subscription.
pub const MSG_TYPE_START_SUBSCRIPTION: &str = "start_subscription";

/// Body of a start-subscription message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSubscription {
    /// Client account paying the deposit.
    pub from: String,
    /// Node being subscribed to.
    pub node_id: NodeId,
    /// Deposit locked for the subscription.
    pub deposit: Coin,
}

/// One message inside a transaction envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Opens a subscription to a node.
    StartSubscription(StartSubscription),
    /// Any other message. The body is kept opaque.
    Unrecognized {
        /// Module route
        route: String,
        /// Declared message type
        msg_type: String,
        /// Encoded body
        body: Vec<u8>,
    },
}

impl Message {
    /// Declared message type.
    pub fn msg_type(&self) -> &str {
        match self {
            Self::StartSubscription(_) => MSG_TYPE_START_SUBSCRIPTION,
            Self::Unrecognized { msg_type, .. } => msg_type,
        }
    }

    /// Module route.
    pub fn route(&self) -> &str {
        match self {
            Self::StartSubscription(_) => MSG_ROUTE_VPN,
            Self::Unrecognized { route, .. } => route,
        }
    }
}

/// Transaction fee.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Fee amount.
    pub amount: Vec<Coin>,
    /// Gas limit.
    pub gas: u64,
}

/// Decoded transaction payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionEnvelope {
    /// Messages in declaration order.
    pub messages: Vec<Message>,
    /// Fee paid.
    pub fee: Fee,
    /// Free-form memo.
    pub memo: String,
}

impl TransactionEnvelope {
    /// Envelope with the given messages, no fee and an empty memo.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            fee: Fee::default(),
            memo: String::new(),
        }
    }

    /// Envelope holding a single message.
    pub fn single(message: Message) -> Self {
        Self::new(vec![message])
    }
}
