//! # Query Configuration
//!
//! `QueryConfig` is built once and handed to the service explicitly. Every
//! call derives a fresh [`QueryContext`] from it, so no state is shared
//! between calls.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default ledger node RPC endpoint.
pub const DEFAULT_RPC_ENDPOINT: &str = "http://127.0.0.1:26657";

/// Default upper bound on an encoded transaction payload (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Default account address prefix.
pub const DEFAULT_ACCOUNT_HRP: &str = "sent";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint is not an http(s) URL.
    #[error("RPC endpoint must start with http:// or https://, got `{0}`")]
    InvalidEndpoint(String),
    /// A timeout of zero.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    /// Empty address prefix.
    #[error("account address prefix is empty")]
    EmptyAccountHrp,
    /// Payload limit of zero.
    #[error("max payload size must be greater than zero")]
    ZeroPayloadLimit,
}

/// Query layer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Ledger node JSON-RPC endpoint.
    pub rpc_endpoint: String,

    /// Timeout of a single network round trip, in seconds.
    pub request_timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    pub connect_timeout_secs: u64,

    /// Optional bound on a whole subscription resolution, in seconds.
    /// Unset means each round trip is bounded only by `request_timeout_secs`.
    pub resolution_deadline_secs: Option<u64>,

    /// Block height for state queries. Unset queries the latest height.
    pub query_height: Option<u64>,

    /// Bech32 prefix of account addresses.
    pub account_hrp: String,

    /// Largest transaction payload the decoder accepts.
    pub max_payload_bytes: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 5,
            resolution_deadline_secs: None,
            query_height: None,
            account_hrp: DEFAULT_ACCOUNT_HRP.to_string(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl QueryConfig {
    /// Create a config for testing (short timeouts).
    pub fn for_testing() -> Self {
        Self {
            request_timeout_secs: 2,
            connect_timeout_secs: 1,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DVPN_RPC_ENDPOINT`: node endpoint (default: http://127.0.0.1:26657)
    /// - `DVPN_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 60)
    /// - `DVPN_CONNECT_TIMEOUT_SECS`: connect timeout (default: 5)
    /// - `DVPN_RESOLUTION_DEADLINE_SECS`: whole-resolution deadline (default: unset)
    /// - `DVPN_QUERY_HEIGHT`: state query height (default: latest)
    /// - `DVPN_ACCOUNT_HRP`: account address prefix (default: sent)
    /// - `DVPN_MAX_PAYLOAD_BYTES`: decoder payload limit (default: 1 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rpc_endpoint: env::var("DVPN_RPC_ENDPOINT").unwrap_or(defaults.rpc_endpoint),

            request_timeout_secs: parse_env("DVPN_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),

            connect_timeout_secs: parse_env("DVPN_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),

            resolution_deadline_secs: parse_env("DVPN_RESOLUTION_DEADLINE_SECS"),

            query_height: parse_env("DVPN_QUERY_HEIGHT"),

            account_hrp: env::var("DVPN_ACCOUNT_HRP").unwrap_or(defaults.account_hrp),

            max_payload_bytes: parse_env("DVPN_MAX_PAYLOAD_BYTES")
                .unwrap_or(defaults.max_payload_bytes),
        }
    }

    /// Check the configuration before building clients from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_endpoint.starts_with("http://") || self.rpc_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidEndpoint(self.rpc_endpoint.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("request timeout"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("connect timeout"));
        }
        if self.resolution_deadline_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout("resolution deadline"));
        }
        if self.account_hrp.is_empty() {
            return Err(ConfigError::EmptyAccountHrp);
        }
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::ZeroPayloadLimit);
        }
        Ok(())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Whole-resolution deadline, if configured.
    pub fn resolution_deadline(&self) -> Option<Duration> {
        self.resolution_deadline_secs.map(Duration::from_secs)
    }

    /// Fresh context for one call.
    pub fn context(&self) -> QueryContext {
        QueryContext {
            correlation_id: Uuid::new_v4(),
            request_timeout: self.request_timeout(),
            height: self.query_height,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Context threaded into every collaborator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryContext {
    /// Correlates the log lines of one call.
    pub correlation_id: Uuid,
    /// Timeout of each network round trip made under this context.
    pub request_timeout: Duration,
    /// State height to query, `None` for latest.
    pub height: Option<u64>,
}

impl QueryContext {
    /// Context with a new correlation id.
    pub fn new(request_timeout: Duration, height: Option<u64>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            request_timeout,
            height,
        }
    }
}
