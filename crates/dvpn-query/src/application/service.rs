//! # VPN Query Service
//!
//! Application service orchestrating the subscription resolution pipeline and
//! the single-step ledger lookups.
//!
//! ```text
//! hash ──→ [tx index] ──→ executed? ──→ [decoder] ──→ one start_subscription?
//!                                                              │
//!            subscription ←── [state query] ←── flattened events[1].attributes[0]
//! ```
//!
//! Every step gates the next one. Nothing is cached and nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn, Instrument};

use crate::algorithms::{extract_subscription_id, LengthPrefixedDecoder};
use crate::config::{QueryConfig, QueryContext};
use crate::domain::{
    invariant_execution_succeeded, invariant_single_start_subscription, Account,
    AccountAddress, AccountQueryError, Node, NodeId, ResolutionError, ResolverId, ResourceKind,
    Session, Subscription, SubscriptionId, TransactionHash, TransportError,
};
use crate::ports::{
    AccountResolver, LedgerQuery, LedgerQueryClient, LedgerRecord, MessageDecoder,
    TransactionResultFetcher, VpnQueryApi,
};

/// VPN Query Service - resolves identifiers into verified ledger state.
pub struct VpnQueryService {
    /// Configuration.
    config: QueryConfig,
    /// Transaction index.
    transactions: Arc<dyn TransactionResultFetcher>,
    /// World-state queries.
    ledger: Arc<dyn LedgerQueryClient>,
    /// Payload decoder.
    decoder: Arc<dyn MessageDecoder>,
    /// Account lookups.
    accounts: Arc<dyn AccountResolver>,
}

impl VpnQueryService {
    /// Create a service from individual collaborators.
    pub fn new(
        config: QueryConfig,
        transactions: Arc<dyn TransactionResultFetcher>,
        ledger: Arc<dyn LedgerQueryClient>,
        decoder: Arc<dyn MessageDecoder>,
        accounts: Arc<dyn AccountResolver>,
    ) -> Self {
        Self {
            config,
            transactions,
            ledger,
            decoder,
            accounts,
        }
    }

    /// Create a service over one client serving all ledger queries, with the
    /// length-prefixed decoder.
    pub fn with_client<C>(config: QueryConfig, client: Arc<C>) -> Self
    where
        C: TransactionResultFetcher + LedgerQueryClient + AccountResolver + 'static,
    {
        let decoder = Arc::new(LengthPrefixedDecoder::new(config.max_payload_bytes));
        Self::new(config, client.clone(), client.clone(), decoder, client)
    }

    /// Service configuration.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Run the resolution pipeline under an existing context.
    ///
    /// No overall deadline is applied here; see
    /// [`VpnQueryApi::resolve_subscription_by_hash`].
    pub async fn resolve_with_context(
        &self,
        ctx: &QueryContext,
        hash: &TransactionHash,
    ) -> Result<Subscription, ResolutionError> {
        debug!("Fetching transaction result");
        let result = self
            .transactions
            .fetch_result(ctx, hash)
            .await?
            .ok_or_else(|| ResolutionError::NotFound {
                kind: ResourceKind::Transaction,
                id: hash.to_string(),
            })?;

        if let Err(e) = invariant_execution_succeeded(&result) {
            warn!(height = result.height, "Transaction failed on chain: {}", e);
            return Err(e);
        }

        let envelope = self.decoder.decode(&result.raw_payload)?;
        let start = invariant_single_start_subscription(&envelope)?;
        debug!(
            node_id = %start.node_id,
            from = %start.from,
            "Start-subscription transaction validated"
        );

        let subscription_id = extract_subscription_id(&result.events)?;
        debug!(subscription_id = %subscription_id, "Subscription ID extracted from events");

        let subscription = self
            .fetch_subscription(ctx, &subscription_id)
            .await?
            .ok_or_else(|| ResolutionError::NotFound {
                kind: ResourceKind::Subscription,
                id: subscription_id.to_string(),
            })?;

        info!(
            subscription_id = %subscription.id,
            node_id = %subscription.node_id,
            height = result.height,
            "Subscription resolved"
        );
        Ok(subscription)
    }

    /// Internal: one world-state query, narrowed to the expected record type.
    async fn query_record<T>(
        &self,
        ctx: &QueryContext,
        query: LedgerQuery,
        pick: fn(LedgerRecord) -> Result<T, LedgerRecord>,
    ) -> Result<Option<T>, TransportError> {
        debug!(
            correlation_id = %ctx.correlation_id,
            kind = %query.kind(),
            id = %query.id(),
            "Querying ledger state"
        );

        match self.ledger.query_by_id(ctx, &query).await? {
            None => Ok(None),
            Some(record) => pick(record).map(Some).map_err(|other| {
                TransportError::MalformedResponse(format!(
                    "expected {} record, got {}",
                    query.kind(),
                    other.kind()
                ))
            }),
        }
    }

    /// Internal: subscription by ID under an existing context.
    async fn fetch_subscription(
        &self,
        ctx: &QueryContext,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, TransportError> {
        self.query_record(ctx, LedgerQuery::Subscription(id.clone()), |r| match r {
            LedgerRecord::Subscription(s) => Ok(s),
            other => Err(other),
        })
        .await
    }
}

#[async_trait]
impl VpnQueryApi for VpnQueryService {
    async fn resolve_subscription_by_hash(
        &self,
        hash: &TransactionHash,
    ) -> Result<Subscription, ResolutionError> {
        let ctx = self.config.context();
        let span = tracing::info_span!(
            "resolve_subscription",
            tx_hash = %hash,
            correlation_id = %ctx.correlation_id
        );
        let pipeline = self.resolve_with_context(&ctx, hash).instrument(span);

        match self.config.resolution_deadline() {
            None => pipeline.await,
            Some(deadline) => match tokio::time::timeout(deadline, pipeline).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(tx_hash = %hash, "Resolution exceeded deadline of {:?}", deadline);
                    Err(TransportError::Timeout(deadline).into())
                }
            },
        }
    }

    async fn query_subscription(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, TransportError> {
        self.fetch_subscription(&self.config.context(), id).await
    }

    async fn query_node(&self, id: &NodeId) -> Result<Option<Node>, TransportError> {
        let ctx = self.config.context();
        self.query_record(&ctx, LedgerQuery::Node(id.clone()), |r| match r {
            LedgerRecord::Node(n) => Ok(n),
            other => Err(other),
        })
        .await
    }

    async fn query_nodes_of_resolver(
        &self,
        id: &ResolverId,
    ) -> Result<Option<Vec<NodeId>>, TransportError> {
        let ctx = self.config.context();
        self.query_record(&ctx, LedgerQuery::NodesOfResolver(id.clone()), |r| match r {
            LedgerRecord::NodeIds(ids) => Ok(ids),
            other => Err(other),
        })
        .await
    }

    async fn query_sessions_count(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<u64>, TransportError> {
        let ctx = self.config.context();
        self.query_record(
            &ctx,
            LedgerQuery::SessionsCountOfSubscription(id.clone()),
            |r| match r {
                LedgerRecord::SessionCount(n) => Ok(n),
                other => Err(other),
            },
        )
        .await
    }

    async fn query_session(
        &self,
        id: &SubscriptionId,
        index: u64,
    ) -> Result<Option<Session>, TransportError> {
        let ctx = self.config.context();
        let query = LedgerQuery::SessionOfSubscription {
            subscription_id: id.clone(),
            index,
        };
        self.query_record(&ctx, query, |r| match r {
            LedgerRecord::Session(s) => Ok(s),
            other => Err(other),
        })
        .await
    }

    async fn query_account(&self, address: &str) -> Result<Option<Account>, AccountQueryError> {
        let address = AccountAddress::from_bech32(address, &self.config.account_hrp)?;
        let ctx = self.config.context();
        debug!(
            correlation_id = %ctx.correlation_id,
            address = %address,
            "Querying account"
        );
        Ok(self.accounts.by_address(&ctx, &address).await?)
    }
}
