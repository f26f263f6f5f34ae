//! # dVPN Query
//!
//! Client-side query layer for a dVPN ledger: verifies start-subscription
//! transactions and resolves them into on-chain subscription state.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A client that has broadcast a start-subscription transaction holds only the
//! transaction hash. This crate turns that hash into the `Subscription` record,
//! trusting nothing it has not checked:
//! - The transaction executed successfully on chain
//! - The payload holds exactly one start-subscription message
//! - The subscription ID comes from the transaction's own event log
//!
//! Single-step lookups of nodes, resolver node lists, subscriptions, sessions
//! and accounts are served by the same service.
//!
//! ## Failure Modes
//!
//! | Error | Meaning |
//! |-------|---------|
//! | `ChainExecution` | Ledger rejected the transaction, message is verbatim |
//! | `Decode` | Payload is not a valid transaction encoding |
//! | `UnexpectedTransactionShape` | Not exactly one start-subscription message |
//! | `MalformedEvent` | Event log lacks the subscription ID |
//! | `NotFound` | Transaction or subscription absent |
//! | `Transport` | Node unreachable, timed out or answered garbage |
//!
//! ## Module Structure
//!
//! ```text
//! dvpn-query/
//! ├── domain/          # Entities, value objects, messages, errors, invariants
//! ├── algorithms/      # Varint framing, payload decoding, event extraction
//! ├── ports/           # API trait (inbound) + ledger traits (outbound)
//! ├── application/     # VpnQueryService orchestrating the pipeline
//! ├── adapters/        # JSON-RPC ledger client
//! └── config.rs        # QueryConfig, QueryContext
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::JsonRpcLedgerClient;
pub use algorithms::{
    encode_envelope, extract_subscription_id, flatten_events, frame, LengthPrefixedDecoder,
};
pub use application::VpnQueryService;
pub use config::{
    ConfigError, QueryConfig, QueryContext, DEFAULT_ACCOUNT_HRP, DEFAULT_MAX_PAYLOAD_BYTES,
    DEFAULT_RPC_ENDPOINT,
};
pub use domain::{
    Account, AccountAddress, AccountQueryError, AddressError, Bandwidth, Coin, DecodeError, Event,
    EventAttribute, ExecutionStatus, Fee, InvalidHashError, Message, Node, NodeId,
    ResolutionError, ResolverId, ResourceKind, Session, ShapeViolation, StartSubscription, Status,
    Subscription, SubscriptionId, TransactionEnvelope, TransactionHash, TransactionResult,
    TransportError,
};
pub use ports::{
    AccountResolver, CountingDecoder, LedgerQuery, LedgerQueryClient, LedgerRecord,
    MessageDecoder, MockLedger, TransactionResultFetcher, VpnQueryApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
