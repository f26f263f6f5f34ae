//! # Subscription Resolution over JSON-RPC
//!
//! Runs the whole pipeline through `JsonRpcLedgerClient` against a mock
//! ledger node and checks which calls reach the node.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use httpmock::prelude::*;
    use serde_json::json;

    use dvpn_query::{
        JsonRpcLedgerClient, QueryConfig, ResolutionError, ResourceKind, TransactionHash,
        TransportError, VpnQueryApi, VpnQueryService,
    };

    use crate::integration::fixtures::*;

    fn service(config: QueryConfig) -> VpnQueryService {
        let client = JsonRpcLedgerClient::new(&config).unwrap();
        VpnQueryService::with_client(config, Arc::new(client))
    }

    fn hash(s: &str) -> TransactionHash {
        TransactionHash::parse(s).unwrap()
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_resolves_subscription_end_to_end() {
        let server = MockServer::start_async().await;
        let expected = subscription("sub-42");

        let tx_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .body_contains(TX_METHOD)
                    .body_contains(hash_fragment("ABC123"));
                then.status(200).json_body(tx_response(
                    "ABC123",
                    0,
                    "",
                    &start_subscription_payload(),
                    start_subscription_events("sub-42"),
                ));
            })
            .await;

        let query_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .body_contains(ABCI_METHOD)
                    .body_contains(path_fragment("custom/vpn/subscription"))
                    .body_contains(data_fragment(&json!({ "id": "sub-42" })))
                    .body_contains(r#""height":"0""#);
                then.status(200)
                    .json_body(abci_value(&serde_json::to_value(&expected).unwrap()));
            })
            .await;

        let service = service(config_for(server.base_url()));
        let resolved = service
            .resolve_subscription_by_hash(&hash("abc123"))
            .await
            .unwrap();

        assert_eq!(resolved, expected);
        tx_mock.assert_hits_async(1).await;
        query_mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_configured_height_is_sent_with_state_queries() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(tx_response(
                    "ABC123",
                    0,
                    "",
                    &start_subscription_payload(),
                    start_subscription_events("sub-42"),
                ));
            })
            .await;

        let query_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(ABCI_METHOD)
                    .body_contains(r#""height":"1150""#);
                then.status(200).json_body(abci_value(
                    &serde_json::to_value(subscription("sub-42")).unwrap(),
                ));
            })
            .await;

        let config = QueryConfig {
            query_height: Some(1150),
            ..config_for(server.base_url())
        };
        let resolved = service(config)
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap();

        assert_eq!(resolved.id.as_str(), "sub-42");
        query_mock.assert_hits_async(1).await;
    }

    // =========================================================================
    // GATING
    // =========================================================================

    #[tokio::test]
    async fn test_failed_transaction_makes_no_state_query() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(tx_response(
                    "DEAD",
                    5,
                    "insufficient funds: 10tsent < 10000tsent",
                    &start_subscription_payload(),
                    json!([]),
                ));
            })
            .await;

        let query_mock = server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("DEAD"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::ChainExecution { code: 5, .. }));
        assert_eq!(
            err.chain_message(),
            Some("insufficient funds: 10tsent < 10000tsent")
        );
        assert_eq!(query_mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_failed_transaction_with_corrupt_fields_reports_chain_log() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(rpc_result(json!({
                    "hash": "DEAD",
                    "height": "1201",
                    "tx": "%%not-base64%%",
                    "tx_result": {
                        "code": 11,
                        "codespace": "sdk",
                        "log": "out of gas in location: WriteFlat",
                        "events": [
                            { "type": "message", "attributes": [{ "key": "!!", "value": "??" }] }
                        ]
                    }
                })));
            })
            .await;

        let query_mock = server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("DEAD"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::ChainExecution { code: 11, .. }));
        assert_eq!(
            err.chain_message(),
            Some("out of gas in location: WriteFlat")
        );
        assert_eq!(query_mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_short_event_log_makes_no_state_query() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(tx_response(
                    "ABC123",
                    0,
                    "",
                    &start_subscription_payload(),
                    json!([{ "type": "message", "attributes": [] }]),
                ));
            })
            .await;

        let query_mock = server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::MalformedEvent(_)));
        assert_eq!(query_mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_decode_error() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(tx_response(
                    "ABC123",
                    0,
                    "",
                    &[0x20, 0x01, 0x02],
                    start_subscription_events("sub-42"),
                ));
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::Decode(_)));
    }

    // =========================================================================
    // NOT FOUND
    // =========================================================================

    #[tokio::test]
    async fn test_unindexed_transaction_is_not_found() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(500).json_body(rpc_error(
                    -32603,
                    "Internal error",
                    "tx (ABC123) not found",
                ));
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::NotFound {
                kind: ResourceKind::Transaction,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_subscription_is_not_found() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200).json_body(tx_response(
                    "ABC123",
                    0,
                    "",
                    &start_subscription_payload(),
                    start_subscription_events("sub-42"),
                ));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "subscription not found: sub-42");
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    #[tokio::test]
    async fn test_other_rpc_errors_are_transport_errors() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(TX_METHOD);
                then.status(200)
                    .json_body(rpc_error(-32603, "Internal error", "database closed"));
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::Transport(TransportError::Rpc { code: -32603, .. })
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_gateway_error_is_retryable() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("upstream unavailable");
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::Transport(TransportError::HttpStatus(503))
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_garbage_response_is_malformed() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = service(config_for(server.base_url()))
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::Transport(TransportError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_node_times_out() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(abci_empty());
            })
            .await;

        let config = QueryConfig {
            request_timeout_secs: 1,
            ..config_for(server.base_url())
        };
        let err = service(config)
            .resolve_subscription_by_hash(&hash("ABC123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::Transport(TransportError::Timeout(_))
        ));
    }
}
