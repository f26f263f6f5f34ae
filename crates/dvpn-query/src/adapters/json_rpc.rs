//! JSON-RPC Ledger Client Adapter
//!
//! Implements the transaction index, world-state and account ports against a
//! ledger node's JSON-RPC endpoint over HTTP POST.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::wire::{
    decode_account, decode_record, query_params, query_path, AbciQueryParams, AbciQueryResult,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, TxParams, TxResponse, METHOD_ABCI_QUERY,
    METHOD_TX, PATH_ACCOUNT,
};
use crate::config::{QueryConfig, QueryContext};
use crate::domain::{Account, AccountAddress, TransactionHash, TransactionResult, TransportError};
use crate::ports::{
    AccountResolver, LedgerQuery, LedgerQueryClient, LedgerRecord, TransactionResultFetcher,
};

/// Ledger node client speaking JSON-RPC over HTTP.
pub struct JsonRpcLedgerClient {
    client: Client,
    endpoint: String,
    request_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &QueryConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::Unreachable {
                endpoint: config.rpc_endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: config.rpc_endpoint.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the next request ID.
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method.
    ///
    /// The outer error is a transport failure, the inner one an error object
    /// returned by the node.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        ctx: &QueryContext,
        method: &str,
        params: P,
    ) -> Result<Result<R, JsonRpcError>, TransportError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        debug!(
            correlation_id = %ctx.correlation_id,
            method,
            id = request.id,
            "[dvpn-query] JSON-RPC call"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(ctx.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e, ctx.request_timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_request_error(e, ctx.request_timeout))?;

        let rpc_response: JsonRpcResponse<R> = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(TransportError::HttpStatus(status.as_u16()))
            }
            Err(e) => {
                return Err(TransportError::MalformedResponse(format!(
                    "{} response: {}",
                    method, e
                )))
            }
        };

        if let Some(error) = rpc_response.error {
            return Ok(Err(error));
        }
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        rpc_response
            .result
            .map(Ok)
            .ok_or_else(|| TransportError::MalformedResponse("missing result in response".into()))
    }

    fn map_request_error(&self, e: reqwest::Error, timeout: Duration) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(timeout)
        } else if e.is_decode() {
            TransportError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::HttpStatus(status.as_u16())
        } else {
            TransportError::Unreachable {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        }
    }

    /// Run a world-state query, returning the raw record bytes.
    async fn abci_query(
        &self,
        ctx: &QueryContext,
        params: AbciQueryParams,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let path = params.path.clone();
        let result: AbciQueryResult = self.call(ctx, METHOD_ABCI_QUERY, params).await??;

        result.response.into_value().inspect_err(|e| {
            warn!(
                correlation_id = %ctx.correlation_id,
                path = %path,
                "[dvpn-query] State query rejected: {}",
                e
            )
        })
    }
}

#[async_trait]
impl TransactionResultFetcher for JsonRpcLedgerClient {
    async fn fetch_result(
        &self,
        ctx: &QueryContext,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionResult>, TransportError> {
        match self
            .call::<_, TxResponse>(ctx, METHOD_TX, TxParams::new(hash))
            .await?
        {
            Ok(response) => response.into_domain(hash).map(Some),
            Err(e) if e.is_not_found() => {
                debug!(correlation_id = %ctx.correlation_id, tx_hash = %hash, "[dvpn-query] Transaction not indexed");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl LedgerQueryClient for JsonRpcLedgerClient {
    async fn query_by_id(
        &self,
        ctx: &QueryContext,
        query: &LedgerQuery,
    ) -> Result<Option<LedgerRecord>, TransportError> {
        let params = AbciQueryParams::new(query_path(query), &query_params(query), ctx.height);
        self.abci_query(ctx, params)
            .await?
            .map(|bytes| decode_record(query, &bytes))
            .transpose()
    }
}

#[async_trait]
impl AccountResolver for JsonRpcLedgerClient {
    async fn by_address(
        &self,
        ctx: &QueryContext,
        address: &AccountAddress,
    ) -> Result<Option<Account>, TransportError> {
        let data = serde_json::json!({ "address": address.as_str() });
        let params = AbciQueryParams::new(PATH_ACCOUNT, &data, ctx.height);
        self.abci_query(ctx, params)
            .await?
            .map(|bytes| decode_account(&bytes))
            .transpose()
    }
}
