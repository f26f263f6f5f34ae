//! # Inbound Ports
//!
//! What the query layer offers its callers.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountQueryError, Node, NodeId, ResolutionError, ResolverId, Session, Subscription,
    SubscriptionId, TransactionHash, TransportError,
};

/// dVPN query API - inbound port.
///
/// Simple lookups return `Ok(None)` when the ledger has no such record.
#[async_trait]
pub trait VpnQueryApi: Send + Sync {
    /// Resolve the subscription created by a start-subscription transaction.
    ///
    /// Fetches the transaction result, checks it executed, decodes and
    /// validates the payload, reads the subscription ID from the event log and
    /// fetches the subscription. Any failed step aborts the whole resolution.
    async fn resolve_subscription_by_hash(
        &self,
        hash: &TransactionHash,
    ) -> Result<Subscription, ResolutionError>;

    /// Subscription by ID.
    async fn query_subscription(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, TransportError>;

    /// Node by ID.
    async fn query_node(&self, id: &NodeId) -> Result<Option<Node>, TransportError>;

    /// Nodes registered with a resolver.
    async fn query_nodes_of_resolver(
        &self,
        id: &ResolverId,
    ) -> Result<Option<Vec<NodeId>>, TransportError>;

    /// Number of sessions of a subscription.
    async fn query_sessions_count(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<u64>, TransportError>;

    /// Session of a subscription by index.
    async fn query_session(
        &self,
        id: &SubscriptionId,
        index: u64,
    ) -> Result<Option<Session>, TransportError>;

    /// Account by bech32 address.
    async fn query_account(&self, address: &str) -> Result<Option<Account>, AccountQueryError>;
}
