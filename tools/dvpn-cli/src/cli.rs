//! Command-line arguments.

use clap::{Parser, Subcommand};
use dvpn_query::QueryConfig;

/// dvpn-cli: query a dVPN ledger and resolve subscriptions
#[derive(Parser, Debug)]
#[command(name = "dvpn-cli", version)]
#[command(about = "Query a dVPN ledger node and resolve start-subscription transactions")]
pub struct Args {
    /// Ledger node JSON-RPC endpoint (overrides DVPN_RPC_ENDPOINT)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds (overrides DVPN_REQUEST_TIMEOUT_SECS)
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Deadline for a whole subscription resolution, in seconds
    #[arg(long, global = true)]
    pub deadline: Option<u64>,

    /// Block height for state queries (default: latest)
    #[arg(long, global = true)]
    pub height: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to query.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve the subscription started by a transaction
    SubscriptionByTx {
        /// Transaction hash, hex
        hash: String,
    },
    /// Subscription by ID
    Subscription {
        /// Subscription ID
        id: String,
    },
    /// Node by ID
    Node {
        /// Node ID
        id: String,
    },
    /// IDs of the nodes registered with a resolver
    ResolverNodes {
        /// Resolver ID
        id: String,
    },
    /// Number of sessions of a subscription
    SessionsCount {
        /// Subscription ID
        id: String,
    },
    /// Session of a subscription by index
    Session {
        /// Subscription ID
        id: String,
        /// Zero-based session index
        index: u64,
    },
    /// Account by bech32 address
    Account {
        /// Account address
        address: String,
    },
}

impl Args {
    /// Layer the flags over `base`.
    pub fn apply_to(&self, mut base: QueryConfig) -> QueryConfig {
        if let Some(endpoint) = &self.endpoint {
            base.rpc_endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout {
            base.request_timeout_secs = timeout;
        }
        if let Some(deadline) = self.deadline {
            base.resolution_deadline_secs = Some(deadline);
        }
        if let Some(height) = self.height {
            base.query_height = Some(height);
        }
        base
    }
}
