//! # Outbound Ports
//!
//! Collaborators the query layer depends on: the transaction index, the
//! world-state query client, the payload decoder and the account resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::config::QueryContext;
use crate::domain::{
    Account, AccountAddress, DecodeError, Node, NodeId, ResolverId, ResourceKind, Session,
    Subscription, SubscriptionId, TransactionEnvelope, TransactionHash, TransactionResult,
    TransportError,
};

/// World-state query addressed by identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerQuery {
    /// Node by ID.
    Node(NodeId),
    /// IDs of the nodes registered with a resolver.
    NodesOfResolver(ResolverId),
    /// Subscription by ID.
    Subscription(SubscriptionId),
    /// Number of sessions of a subscription.
    SessionsCountOfSubscription(SubscriptionId),
    /// Session of a subscription by index.
    SessionOfSubscription {
        /// Owning subscription
        subscription_id: SubscriptionId,
        /// Zero-based session index
        index: u64,
    },
}

impl LedgerQuery {
    /// Kind of resource queried.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Node(_) => ResourceKind::Node,
            Self::NodesOfResolver(_) => ResourceKind::ResolverNodes,
            Self::Subscription(_) => ResourceKind::Subscription,
            Self::SessionsCountOfSubscription(_) => ResourceKind::SessionCount,
            Self::SessionOfSubscription { .. } => ResourceKind::Session,
        }
    }

    /// Identifier as it appears in logs and not-found errors.
    pub fn id(&self) -> String {
        match self {
            Self::Node(id) => id.to_string(),
            Self::NodesOfResolver(id) => id.to_string(),
            Self::Subscription(id) | Self::SessionsCountOfSubscription(id) => id.to_string(),
            Self::SessionOfSubscription {
                subscription_id,
                index,
            } => format!("{}/{}", subscription_id, index),
        }
    }
}

/// Record returned for a [`LedgerQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerRecord {
    /// A node.
    Node(Node),
    /// Node IDs of a resolver.
    NodeIds(Vec<NodeId>),
    /// A subscription.
    Subscription(Subscription),
    /// A session count.
    SessionCount(u64),
    /// A session.
    Session(Session),
}

impl LedgerRecord {
    /// Kind of resource held.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Node(_) => ResourceKind::Node,
            Self::NodeIds(_) => ResourceKind::ResolverNodes,
            Self::Subscription(_) => ResourceKind::Subscription,
            Self::SessionCount(_) => ResourceKind::SessionCount,
            Self::Session(_) => ResourceKind::Session,
        }
    }
}

/// Transaction index - outbound port.
#[async_trait]
pub trait TransactionResultFetcher: Send + Sync {
    /// Fetch the execution result of a transaction.
    ///
    /// `Ok(None)` when the index has no such transaction.
    async fn fetch_result(
        &self,
        ctx: &QueryContext,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionResult>, TransportError>;
}

/// World-state queries - outbound port.
#[async_trait]
pub trait LedgerQueryClient: Send + Sync {
    /// Query one record by identifier.
    ///
    /// `Ok(None)` when the ledger has no matching record.
    async fn query_by_id(
        &self,
        ctx: &QueryContext,
        query: &LedgerQuery,
    ) -> Result<Option<LedgerRecord>, TransportError>;
}

/// Transaction payload decoder - outbound port.
pub trait MessageDecoder: Send + Sync {
    /// Decode a raw transaction payload.
    fn decode(&self, payload: &[u8]) -> Result<TransactionEnvelope, DecodeError>;
}

/// Account state lookup - outbound port.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    /// Account at `address`, `Ok(None)` if the ledger has never seen it.
    async fn by_address(
        &self,
        ctx: &QueryContext,
        address: &AccountAddress,
    ) -> Result<Option<Account>, TransportError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory ledger with per-operation call counters.
#[derive(Default)]
pub struct MockLedger {
    transactions: HashMap<String, TransactionResult>,
    nodes: HashMap<NodeId, Node>,
    resolver_nodes: HashMap<ResolverId, Vec<NodeId>>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    sessions: HashMap<SubscriptionId, Vec<Session>>,
    accounts: HashMap<String, Account>,
    /// Error returned by every call when set.
    pub fail_with: Option<TransportError>,
    fetch_calls: AtomicUsize,
    query_calls: AtomicUsize,
    account_calls: AtomicUsize,
}

impl MockLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose every call fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    /// Add a transaction result, keyed by its hash.
    pub fn with_transaction(mut self, result: TransactionResult) -> Self {
        self.transactions
            .insert(result.hash.as_str().to_string(), result);
        self
    }

    /// Add a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    /// Register node IDs under a resolver.
    pub fn with_resolver_nodes(mut self, resolver: ResolverId, nodes: Vec<NodeId>) -> Self {
        self.resolver_nodes.insert(resolver, nodes);
        self
    }

    /// Add a subscription.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions
            .insert(subscription.id.clone(), subscription);
        self
    }

    /// Append a session to its subscription.
    pub fn with_session(mut self, session: Session) -> Self {
        self.sessions
            .entry(session.subscription_id.clone())
            .or_default()
            .push(session);
        self
    }

    /// Add an account.
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.insert(account.address.clone(), account);
        self
    }

    /// Number of transaction index lookups.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of world-state queries.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of account lookups.
    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), TransportError> {
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TransactionResultFetcher for MockLedger {
    async fn fetch_result(
        &self,
        _ctx: &QueryContext,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionResult>, TransportError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.transactions.get(hash.as_str()).cloned())
    }
}

#[async_trait]
impl LedgerQueryClient for MockLedger {
    async fn query_by_id(
        &self,
        _ctx: &QueryContext,
        query: &LedgerQuery,
    ) -> Result<Option<LedgerRecord>, TransportError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let record = match query {
            LedgerQuery::Node(id) => self.nodes.get(id).cloned().map(LedgerRecord::Node),
            LedgerQuery::NodesOfResolver(id) => self
                .resolver_nodes
                .get(id)
                .cloned()
                .map(LedgerRecord::NodeIds),
            LedgerQuery::Subscription(id) => self
                .subscriptions
                .get(id)
                .cloned()
                .map(LedgerRecord::Subscription),
            LedgerQuery::SessionsCountOfSubscription(id) => {
                self.subscriptions.get(id).map(|_| {
                    let count = self.sessions.get(id).map_or(0, Vec::len);
                    LedgerRecord::SessionCount(count as u64)
                })
            }
            LedgerQuery::SessionOfSubscription {
                subscription_id,
                index,
            } => self
                .sessions
                .get(subscription_id)
                .and_then(|sessions| {
                    usize::try_from(*index)
                        .ok()
                        .and_then(|i| sessions.get(i))
                })
                .cloned()
                .map(LedgerRecord::Session),
        };

        Ok(record)
    }
}

#[async_trait]
impl AccountResolver for MockLedger {
    async fn by_address(
        &self,
        _ctx: &QueryContext,
        address: &AccountAddress,
    ) -> Result<Option<Account>, TransportError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.accounts.get(address.as_str()).cloned())
    }
}

/// Decoder wrapper counting how often it is invoked.
pub struct CountingDecoder<D> {
    inner: D,
    calls: AtomicUsize,
}

impl<D: MessageDecoder> CountingDecoder<D> {
    /// Wrap a decoder.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of decode calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<D: MessageDecoder> MessageDecoder for CountingDecoder<D> {
    fn decode(&self, payload: &[u8]) -> Result<TransactionEnvelope, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.decode(payload)
    }
}
