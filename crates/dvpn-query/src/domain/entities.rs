//! # Domain Entities
//!
//! Ledger records of the VPN marketplace, in the shape the state queries
//! return them.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::value_objects::{Bandwidth, Coin, NodeId, Status, SubscriptionId};

/// A VPN node registered on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identifier.
    pub id: NodeId,
    /// Owner account address.
    pub owner: String,
    /// Deposit locked by the owner.
    pub deposit: Coin,
    /// Node type, e.g. `OpenVPN`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Software version.
    pub version: String,
    /// Display name.
    #[serde(default)]
    pub moniker: String,
    /// Prices per gigabyte, one per accepted denomination.
    pub prices_per_gb: Vec<Coin>,
    /// Advertised link speed.
    pub internet_speed: Bandwidth,
    /// Encryption method.
    pub encryption: String,
    /// Lifecycle status.
    pub status: Status,
    /// Height of the last status change.
    #[serde(default)]
    pub status_modified_at: i64,
}

/// A VPN subscription: a client's deposit against one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub id: SubscriptionId,
    /// Client account that owns the subscription.
    pub client: String,
    /// Node the subscription is for.
    pub node_id: NodeId,
    /// Agreed price per gigabyte.
    pub price_per_gb: Coin,
    /// Deposit paid at start.
    pub total_deposit: Coin,
    /// Deposit not yet consumed.
    pub remaining_deposit: Coin,
    /// Bandwidth still covered by the remaining deposit.
    pub remaining_bandwidth: Bandwidth,
    /// Lifecycle status.
    pub status: Status,
    /// Height of the last status change.
    #[serde(default)]
    pub status_modified_at: i64,
}

impl Subscription {
    /// Is the subscription currently usable?
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// A metered VPN session under a subscription.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: String,
    /// Owning subscription.
    pub subscription_id: SubscriptionId,
    /// Bandwidth consumed.
    pub bandwidth: Bandwidth,
    /// Lifecycle status.
    pub status: Status,
    /// Height of the last status change.
    #[serde(default)]
    pub status_modified_at: i64,
}

/// Account state.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Bech32 address.
    pub address: String,
    /// Balances.
    #[serde(default)]
    pub coins: Vec<Coin>,
    /// Public key, absent until the account signs its first transaction.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Account number.
    #[serde_as(as = "DisplayFromStr")]
    pub account_number: u64,
    /// Next sequence number.
    #[serde_as(as = "DisplayFromStr")]
    pub sequence: u64,
}
