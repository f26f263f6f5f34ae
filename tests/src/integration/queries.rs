//! Single-step lookups over JSON-RPC.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::prelude::*;
    use serde_json::json;

    use dvpn_query::{
        AccountQueryError, JsonRpcLedgerClient, NodeId, ResolverId, SubscriptionId,
        TransportError, VpnQueryApi, VpnQueryService,
    };

    use crate::integration::fixtures::*;

    fn service_for(server: &MockServer) -> VpnQueryService {
        let config = config_for(server.base_url());
        let client = JsonRpcLedgerClient::new(&config).unwrap();
        VpnQueryService::with_client(config, Arc::new(client))
    }

    fn node_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "owner": "sent1owner",
            "deposit": { "denom": "tsent", "amount": "1000" },
            "type": "OpenVPN",
            "version": "0.1.0",
            "moniker": "eu-west",
            "prices_per_gb": [{ "denom": "tsent", "amount": "100" }],
            "internet_speed": { "upload": "100000000", "download": "100000000" },
            "encryption": "AES-256-CBC",
            "status": "ACTIVE",
            "status_modified_at": 10
        })
    }

    #[tokio::test]
    async fn test_node_lookup() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(ABCI_METHOD)
                    .body_contains(path_fragment("custom/vpn/node"))
                    .body_contains(data_fragment(&json!({ "id": "node-7" })));
                then.status(200).json_body(abci_value(&node_json("node-7")));
            })
            .await;

        let node = service_for(&server)
            .query_node(&NodeId::new("node-7"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(node.node_type, "OpenVPN");
        assert_eq!(node.internet_speed.total(), 200_000_000);
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_resolver_nodes_lookup() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(path_fragment("custom/vpn/nodesOfResolver"));
                then.status(200)
                    .json_body(abci_value(&json!(["node-1", "node-2"])));
            })
            .await;

        let ids = service_for(&server)
            .query_nodes_of_resolver(&ResolverId::new("res-1"))
            .await
            .unwrap();

        assert_eq!(ids, Some(vec![NodeId::new("node-1"), NodeId::new("node-2")]));
    }

    #[tokio::test]
    async fn test_sessions_count_as_string() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(path_fragment("custom/vpn/sessionsCountOfSubscription"));
                then.status(200).json_body(abci_value(&json!("7")));
            })
            .await;

        let count = service_for(&server)
            .query_sessions_count(&SubscriptionId::new("sub-42"))
            .await
            .unwrap();

        assert_eq!(count, Some(7));
    }

    #[tokio::test]
    async fn test_session_by_index() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(path_fragment("custom/vpn/sessionOfSubscription"))
                    .body_contains(data_fragment(&json!({ "id": "sub-42", "index": 1 })));
                then.status(200).json_body(abci_value(&json!({
                    "id": "s-1",
                    "subscription_id": "sub-42",
                    "bandwidth": { "upload": "10", "download": "20" },
                    "status": "INACTIVE",
                    "status_modified_at": 1300
                })));
            })
            .await;

        let session = service_for(&server)
            .query_session(&SubscriptionId::new("sub-42"), 1)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.id, "s-1");
        assert_eq!(session.bandwidth.total(), 30);
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_absent_subscription_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let result = service_for(&server)
            .query_subscription(&SubscriptionId::new("sub-missing"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_rejected_query_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_contains(ABCI_METHOD);
                then.status(200)
                    .json_body(abci_rejected(6, "unknown request: custom/vpn/node"));
            })
            .await;

        let err = service_for(&server)
            .query_node(&NodeId::new("node-7"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::QueryRejected {
                code: 6,
                log: "unknown request: custom/vpn/node".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_account_lookup() {
        let server = MockServer::start_async().await;
        let address = account_address(7);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_contains(path_fragment("custom/acc/account"))
                    .body_contains(data_fragment(&json!({ "address": &address })));
                then.status(200).json_body(abci_value(&json!({
                    "address": &address,
                    "coins": [{ "denom": "tsent", "amount": "25000" }],
                    "public_key": null,
                    "account_number": "11",
                    "sequence": "3"
                })));
            })
            .await;

        let account = service_for(&server)
            .query_account(&address)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(account.account_number, 11);
        assert_eq!(account.coins[0].amount, 25_000);
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_malformed_address_never_reaches_node() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(abci_empty());
            })
            .await;

        let err = service_for(&server)
            .query_account("sent1notbech32")
            .await
            .unwrap_err();

        assert!(matches!(err, AccountQueryError::InvalidAddress(_)));
        assert_eq!(mock.hits_async().await, 0);
    }
}
