//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ledger ports against a node's JSON-RPC endpoint.

mod json_rpc;
mod wire;

pub use json_rpc::JsonRpcLedgerClient;
