//! Ledger node responses for the end-to-end tests.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bech32::{Bech32, Hrp};
use dvpn_query::{
    encode_envelope, Bandwidth, Coin, Message, NodeId, QueryConfig, StartSubscription, Status,
    Subscription, SubscriptionId, TransactionEnvelope,
};
use serde_json::{json, Value};

/// Service configuration pointing at `endpoint`.
pub fn config_for(endpoint: String) -> QueryConfig {
    QueryConfig {
        rpc_endpoint: endpoint,
        ..QueryConfig::for_testing()
    }
}

/// Active subscription with the given ID.
pub fn subscription(id: &str) -> Subscription {
    Subscription {
        id: SubscriptionId::new(id),
        client: "sent1client".to_string(),
        node_id: NodeId::new("node-7"),
        price_per_gb: Coin::new("tsent", 100),
        total_deposit: Coin::new("tsent", 10_000),
        remaining_deposit: Coin::new("tsent", 10_000),
        remaining_bandwidth: Bandwidth::new(50_000, 50_000),
        status: Status::Active,
        status_modified_at: 1200,
    }
}

/// Length-prefixed payload of a single start-subscription message.
pub fn start_subscription_payload() -> Vec<u8> {
    let message = Message::StartSubscription(StartSubscription {
        from: "sent1client".to_string(),
        node_id: NodeId::new("node-7"),
        deposit: Coin::new("tsent", 10_000),
    });
    encode_envelope(&TransactionEnvelope::single(message)).unwrap_or_default()
}

fn attribute(key: &str, value: &str) -> Value {
    json!({ "key": BASE64.encode(key), "value": BASE64.encode(value) })
}

/// Event log of a start-subscription transaction.
pub fn start_subscription_events(subscription_id: &str) -> Value {
    json!([
        { "type": "message", "attributes": [attribute("action", "start_subscription")] },
        {
            "type": "start_subscription",
            "attributes": [
                attribute("subscription_id", subscription_id),
                attribute("node_id", "node-7")
            ]
        }
    ])
}

/// Successful JSON-RPC envelope around `result`.
pub fn rpc_result(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

/// JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str, data: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message, "data": data }
    })
}

/// `tx` result with the given outcome.
pub fn tx_response(hash: &str, code: u32, log: &str, payload: &[u8], events: Value) -> Value {
    rpc_result(json!({
        "hash": hash,
        "height": "1200",
        "tx": BASE64.encode(payload),
        "tx_result": {
            "code": code,
            "codespace": if code == 0 { "" } else { "sdk" },
            "log": log,
            "events": events
        }
    }))
}

/// `abci_query` result carrying `record` as its value.
pub fn abci_value(record: &Value) -> Value {
    rpc_result(json!({
        "response": { "code": 0, "log": "", "value": BASE64.encode(record.to_string()) }
    }))
}

/// `abci_query` result with no value.
pub fn abci_empty() -> Value {
    rpc_result(json!({ "response": { "code": 0, "log": "", "value": "" } }))
}

/// `abci_query` result rejected by the node.
pub fn abci_rejected(code: u32, log: &str) -> Value {
    rpc_result(json!({ "response": { "code": code, "log": log } }))
}

/// Body fragment matching a `tx` call.
pub const TX_METHOD: &str = r#""method":"tx""#;

/// Body fragment matching an `abci_query` call.
pub const ABCI_METHOD: &str = r#""method":"abci_query""#;

/// Body fragment matching a state query path.
pub fn path_fragment(path: &str) -> String {
    format!(r#""path":"{}""#, path)
}

/// Body fragment matching hex-encoded query params.
pub fn data_fragment(params: &Value) -> String {
    format!(r#""data":"{}""#, hex::encode(params.to_string()))
}

/// Body fragment matching the base64 hash param of a `tx` call.
pub fn hash_fragment(hash_hex: &str) -> String {
    let bytes = hex::decode(hash_hex).unwrap_or_default();
    format!(r#""hash":"{}""#, BASE64.encode(bytes))
}

/// Bech32 account address on the default network prefix.
pub fn account_address(fill: u8) -> String {
    Hrp::parse("sent")
        .ok()
        .and_then(|hrp| bech32::encode::<Bech32>(hrp, &[fill; 20]).ok())
        .unwrap_or_default()
}
