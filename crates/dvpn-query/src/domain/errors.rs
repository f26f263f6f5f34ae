//! # Domain Errors
//!
//! Error taxonomy for the query layer.
//!
//! `ResolutionError` is what the subscription pipeline returns. Each variant is
//! one failure kind a caller can match on; nothing is reported through message
//! text alone.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Resource collections the ledger can be queried for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Transaction index entry.
    Transaction,
    /// Registered VPN node.
    Node,
    /// Node list of a resolver.
    ResolverNodes,
    /// Subscription record.
    Subscription,
    /// Number of sessions of a subscription.
    SessionCount,
    /// Single session of a subscription, by index.
    Session,
    /// Account state.
    Account,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transaction => "transaction",
            Self::Node => "node",
            Self::ResolverNodes => "resolver nodes",
            Self::Subscription => "subscription",
            Self::SessionCount => "session count",
            Self::Session => "session",
            Self::Account => "account",
        };
        f.write_str(name)
    }
}

/// Why a decoded transaction is not a start-subscription transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeViolation {
    /// The envelope does not hold exactly one message.
    MessageCount {
        /// Number of messages found
        found: usize,
    },
    /// The single message has another type.
    MessageType {
        /// Declared type of the message
        found: String,
    },
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageCount { found } => write!(f, "expected exactly 1 message, found {}", found),
            Self::MessageType { found } => write!(f, "unexpected message type `{}`", found),
        }
    }
}

/// Errors of the subscription resolution pipeline.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The ledger executed the transaction and reported failure.
    #[error("transaction failed on chain (code {code}, codespace `{codespace}`): {log}")]
    ChainExecution {
        /// ABCI result code
        code: u32,
        /// Module that produced the code
        codespace: String,
        /// Failure log, verbatim from the ledger
        log: String,
    },

    /// The transaction payload is not validly encoded.
    #[error("failed to decode transaction payload: {0}")]
    Decode(#[from] DecodeError),

    /// Right transaction, wrong message count or type.
    #[error("invalid subscription transaction: {0}")]
    UnexpectedTransactionShape(ShapeViolation),

    /// The event log lacks the expected structure.
    #[error("malformed event log: {0}")]
    MalformedEvent(String),

    /// The queried resource does not exist on the ledger.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of resource queried
        kind: ResourceKind,
        /// Identifier used for the query
        id: String,
    },

    /// Network or remote failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ResolutionError {
    /// The ledger's own failure text, if the chain rejected the transaction.
    pub fn chain_message(&self) -> Option<&str> {
        match self {
            Self::ChainExecution { log, .. } => Some(log),
            _ => None,
        }
    }

    /// Whether re-running the whole pipeline may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_retryable())
    }
}

/// Transport-level failures talking to the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The node could not be reached.
    #[error("cannot connect to {endpoint}: {reason}")]
    Unreachable {
        /// Endpoint that was dialed
        endpoint: String,
        /// Underlying failure
        reason: String,
    },

    /// No response within the allowed time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status without a JSON-RPC body.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message
        message: String,
    },

    /// The node answered a state query with a non-zero code.
    #[error("query rejected with code {code}: {log}")]
    QueryRejected {
        /// ABCI response code
        code: u32,
        /// Response log
        log: String,
    },

    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    /// Unreachable nodes, timeouts and 5xx statuses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout(_) => true,
            Self::HttpStatus(status) => *status >= 500,
            Self::Rpc { .. } | Self::QueryRejected { .. } | Self::MalformedResponse(_) => false,
        }
    }
}

/// Failures decoding a length-prefixed transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// No bytes at all.
    #[error("empty payload")]
    Empty,

    /// The varint length prefix ends early.
    #[error("truncated length prefix")]
    TruncatedPrefix,

    /// The varint length prefix does not fit in 64 bits.
    #[error("length prefix overflows")]
    PrefixOverflow,

    /// Declared length exceeds the configured maximum.
    #[error("declared length {declared} exceeds limit {limit}")]
    TooLarge {
        /// Length declared by the prefix
        declared: u64,
        /// Configured maximum
        limit: usize,
    },

    /// Fewer bytes than the prefix declares.
    #[error("payload truncated: declared {declared} bytes, found {available}")]
    Truncated {
        /// Length declared by the prefix
        declared: u64,
        /// Bytes actually present
        available: usize,
    },

    /// Bytes left over after the declared payload.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    /// The body is not a valid envelope or message.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// A transaction hash string that is not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidHashError {
    /// Empty input.
    #[error("transaction hash is empty")]
    Empty,
    /// Contains something other than hex digits.
    #[error("transaction hash `{0}` is not hex")]
    NotHex(String),
}

/// Account address parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty input.
    #[error("address is empty")]
    Empty,
    /// Not valid bech32.
    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),
    /// Human-readable part does not match the network.
    #[error("address prefix `{found}` does not match `{expected}`")]
    WrongPrefix {
        /// Configured prefix
        expected: String,
        /// Prefix in the address
        found: String,
    },
    /// Decoded payload has the wrong size.
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Account lookup failures.
#[derive(Debug, Error)]
pub enum AccountQueryError {
    /// The address could not be parsed.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    /// Network or remote failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
