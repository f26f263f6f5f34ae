//! JSON-RPC wire types of the ledger node and their conversion to domain types.
//!
//! Transaction bytes and event attributes travel as base64, query data as hex
//! of a JSON document, numbers that may exceed 2^53 as decimal strings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::domain::{
    Account, Event, EventAttribute, ExecutionStatus, Node, NodeId, Session, Subscription,
    TransactionHash, TransactionResult, TransportError,
};
use crate::ports::{LedgerQuery, LedgerRecord};

/// Transaction index method.
pub const METHOD_TX: &str = "tx";
/// World-state query method.
pub const METHOD_ABCI_QUERY: &str = "abci_query";
/// Account state path.
pub const PATH_ACCOUNT: &str = "custom/acc/account";

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Whether the node reports the requested item as missing.
    pub fn is_not_found(&self) -> bool {
        let mentions = |s: &str| s.to_ascii_lowercase().contains("not found");
        mentions(&self.message)
            || match &self.data {
                Some(serde_json::Value::String(s)) => mentions(s),
                Some(other) => mentions(&other.to_string()),
                None => false,
            }
    }

    /// Message with the node's detail appended.
    pub fn detail(&self) -> String {
        match &self.data {
            Some(serde_json::Value::String(s)) if !s.is_empty() => {
                format!("{}: {}", self.message, s)
            }
            _ => self.message.clone(),
        }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.detail())
    }
}

impl From<JsonRpcError> for TransportError {
    fn from(e: JsonRpcError) -> Self {
        let message = e.detail();
        TransportError::Rpc {
            code: e.code,
            message,
        }
    }
}

// =============================================================================
// Transaction index
// =============================================================================

/// Params of the `tx` method.
#[derive(Debug, Serialize)]
pub struct TxParams {
    /// Base64 of the hash bytes.
    pub hash: String,
    pub prove: bool,
}

impl TxParams {
    pub fn new(hash: &TransactionHash) -> Self {
        Self {
            hash: BASE64.encode(hash.as_bytes()),
            prove: false,
        }
    }
}

/// Result of the `tx` method.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct TxResponse {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub height: u64,
    pub tx_result: TxResultWire,
    #[serde(default)]
    pub tx: String,
}

/// Execution outcome of an indexed transaction.
#[derive(Debug, Deserialize)]
pub struct TxResultWire {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub codespace: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<EventWire>,
}

#[derive(Debug, Deserialize)]
pub struct EventWire {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<AttributeWire>,
}

#[derive(Debug, Deserialize)]
pub struct AttributeWire {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl TxResponse {
    /// Convert into a domain result for `hash`.
    ///
    /// A failed transaction keeps only its status: the payload and events are
    /// left undecoded so a malformed field cannot hide the chain's log.
    pub fn into_domain(self, hash: &TransactionHash) -> Result<TransactionResult, TransportError> {
        let TxResultWire {
            code,
            codespace,
            log,
            events,
        } = self.tx_result;

        let status = ExecutionStatus::from_code(code, codespace, log);
        if !matches!(status, ExecutionStatus::Success) {
            return Ok(TransactionResult {
                hash: hash.clone(),
                height: self.height,
                status,
                raw_payload: Vec::new(),
                events: Vec::new(),
            });
        }

        let raw_payload = BASE64
            .decode(self.tx.as_bytes())
            .map_err(|e| malformed(format!("tx bytes are not base64: {}", e)))?;

        let events = events
            .into_iter()
            .map(EventWire::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransactionResult {
            hash: hash.clone(),
            height: self.height,
            status,
            raw_payload,
            events,
        })
    }
}

impl EventWire {
    fn into_domain(self) -> Result<Event, TransportError> {
        let attributes = self
            .attributes
            .into_iter()
            .map(|a| {
                Ok(EventAttribute::new(
                    decode_attribute(a.key)?,
                    decode_attribute(a.value)?,
                ))
            })
            .collect::<Result<Vec<_>, TransportError>>()?;
        Ok(Event::new(self.kind, attributes))
    }
}

fn decode_attribute(field: Option<String>) -> Result<String, TransportError> {
    let Some(encoded) = field else {
        return Ok(String::new());
    };
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| malformed(format!("event attribute is not base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| malformed(format!("event attribute is not UTF-8: {}", e)))
}

// =============================================================================
// World-state queries
// =============================================================================

/// Params of the `abci_query` method.
#[derive(Debug, Serialize)]
pub struct AbciQueryParams {
    pub path: String,
    /// Hex of the JSON query params.
    pub data: String,
    /// Decimal height, "0" for latest.
    pub height: String,
    pub prove: bool,
}

impl AbciQueryParams {
    pub fn new(path: &str, params: &serde_json::Value, height: Option<u64>) -> Self {
        Self {
            path: path.to_string(),
            data: hex::encode(params.to_string()),
            height: height.unwrap_or(0).to_string(),
            prove: false,
        }
    }
}

/// Result of the `abci_query` method.
#[derive(Debug, Deserialize)]
pub struct AbciQueryResult {
    pub response: AbciResponse,
}

#[derive(Debug, Deserialize)]
pub struct AbciResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl AbciResponse {
    /// Decoded record bytes, `None` when the node returned no value.
    pub fn into_value(self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.code != 0 {
            return Err(TransportError::QueryRejected {
                code: self.code,
                log: self.log,
            });
        }
        match self.value.as_deref() {
            None | Some("") => Ok(None),
            Some(encoded) => BASE64
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(|e| malformed(format!("query value is not base64: {}", e))),
        }
    }
}

/// Route of a world-state query.
pub fn query_path(query: &LedgerQuery) -> &'static str {
    match query {
        LedgerQuery::Node(_) => "custom/vpn/node",
        LedgerQuery::NodesOfResolver(_) => "custom/vpn/nodesOfResolver",
        LedgerQuery::Subscription(_) => "custom/vpn/subscription",
        LedgerQuery::SessionsCountOfSubscription(_) => "custom/vpn/sessionsCountOfSubscription",
        LedgerQuery::SessionOfSubscription { .. } => "custom/vpn/sessionOfSubscription",
    }
}

/// JSON params of a world-state query.
pub fn query_params(query: &LedgerQuery) -> serde_json::Value {
    match query {
        LedgerQuery::Node(id) => serde_json::json!({ "id": id.as_str() }),
        LedgerQuery::NodesOfResolver(id) => serde_json::json!({ "id": id.as_str() }),
        LedgerQuery::Subscription(id) | LedgerQuery::SessionsCountOfSubscription(id) => {
            serde_json::json!({ "id": id.as_str() })
        }
        LedgerQuery::SessionOfSubscription {
            subscription_id,
            index,
        } => serde_json::json!({ "id": subscription_id.as_str(), "index": index }),
    }
}

/// Session count, as a JSON number or a decimal string.
#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct CountWire(#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")] u64);

/// Parse the record bytes returned for `query`.
pub fn decode_record(query: &LedgerQuery, bytes: &[u8]) -> Result<LedgerRecord, TransportError> {
    let record = match query {
        LedgerQuery::Node(_) => parse::<Node>(bytes).map(LedgerRecord::Node),
        LedgerQuery::NodesOfResolver(_) => parse::<Vec<NodeId>>(bytes).map(LedgerRecord::NodeIds),
        LedgerQuery::Subscription(_) => {
            parse::<Subscription>(bytes).map(LedgerRecord::Subscription)
        }
        LedgerQuery::SessionsCountOfSubscription(_) => {
            parse::<CountWire>(bytes).map(|c| LedgerRecord::SessionCount(c.0))
        }
        LedgerQuery::SessionOfSubscription { .. } => {
            parse::<Session>(bytes).map(LedgerRecord::Session)
        }
    };
    record.map_err(|e| malformed(format!("{} record: {}", query.kind(), e)))
}

/// Parse account bytes.
pub fn decode_account(bytes: &[u8]) -> Result<Account, TransportError> {
    parse(bytes).map_err(|e| malformed(format!("account record: {}", e)))
}

fn parse<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

fn malformed(reason: String) -> TransportError {
    TransportError::MalformedResponse(reason)
}
