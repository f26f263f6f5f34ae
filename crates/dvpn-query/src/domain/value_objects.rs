//! # Domain Value Objects
//!
//! Identifiers, amounts and the transaction result as the ledger reports it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use super::errors::{AddressError, InvalidHashError};

/// Hex identifier of a ledger transaction.
///
/// Stored upper-case, the way the transaction index prints hashes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionHash {
    hex: String,
    bytes: Vec<u8>,
}

impl TransactionHash {
    /// Parse a hex hash. An optional `0x` prefix is accepted.
    pub fn parse(input: &str) -> Result<Self, InvalidHashError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(InvalidHashError::Empty);
        }

        let bytes = hex::decode(digits).map_err(|_| InvalidHashError::NotHex(input.to_string()))?;

        Ok(Self {
            hex: digits.to_ascii_uppercase(),
            bytes,
        })
    }

    /// Upper-case hex form.
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl FromStr for TransactionHash {
    type Err = InvalidHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Subscription identifier. Opaque to this layer.
    SubscriptionId
);
string_id!(
    /// VPN node identifier.
    NodeId
);
string_id!(
    /// Resolver identifier.
    ResolverId
);

/// Bech32 account address, validated against the network prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountAddress {
    encoded: String,
    bytes: Vec<u8>,
}

/// Size of an account address payload.
pub const ACCOUNT_ADDRESS_LEN: usize = 20;

impl AccountAddress {
    /// Parse and validate a bech32 address with the given human-readable prefix.
    pub fn from_bech32(input: &str, expected_hrp: &str) -> Result<Self, AddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AddressError::Empty);
        }

        let (hrp, bytes) =
            bech32::decode(input).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;

        let found = hrp.to_string().to_ascii_lowercase();
        if found != expected_hrp.to_ascii_lowercase() {
            return Err(AddressError::WrongPrefix {
                expected: expected_hrp.to_string(),
                found,
            });
        }

        if bytes.len() != ACCOUNT_ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        Ok(Self {
            encoded: input.to_ascii_lowercase(),
            bytes,
        })
    }

    /// Bech32 form.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Decoded address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Token amount in a single denomination.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `tsent`.
    pub denom: String,
    /// Amount in the smallest unit.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// Upload/download byte counts.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bandwidth {
    /// Bytes uploaded.
    #[serde_as(as = "DisplayFromStr")]
    pub upload: u64,
    /// Bytes downloaded.
    #[serde_as(as = "DisplayFromStr")]
    pub download: u64,
}

impl Bandwidth {
    /// Create a bandwidth figure.
    pub fn new(upload: u64, download: u64) -> Self {
        Self { upload, download }
    }

    /// Combined upload and download.
    pub fn total(&self) -> u64 {
        self.upload.saturating_add(self.download)
    }
}

/// Lifecycle status of nodes, subscriptions and sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Registered, not yet active.
    #[serde(rename = "REGISTERED")]
    Registered,
    /// Active.
    #[serde(rename = "ACTIVE")]
    Active,
    /// Inactive.
    #[serde(rename = "INACTIVE")]
    Inactive,
    /// Deregistered.
    #[serde(rename = "DE-REGISTERED")]
    Deregistered,
}

/// Key/value pair inside an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

impl EventAttribute {
    /// Create an attribute.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Event emitted during transaction execution. Attribute order is preserved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `message`.
    pub kind: String,
    /// Attributes in emission order.
    pub attributes: Vec<EventAttribute>,
}

impl Event {
    /// Create an event.
    pub fn new(kind: impl Into<String>, attributes: Vec<EventAttribute>) -> Self {
        Self {
            kind: kind.into(),
            attributes,
        }
    }
}

/// How the ledger reports execution of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Code 0.
    Success,
    /// Non-zero code with the ledger's log.
    Failed {
        /// ABCI result code
        code: u32,
        /// Module that produced the code
        codespace: String,
        /// Failure log
        log: String,
    },
}

impl ExecutionStatus {
    /// Build from an ABCI code and log.
    pub fn from_code(code: u32, codespace: impl Into<String>, log: impl Into<String>) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failed {
                code,
                codespace: codespace.into(),
                log: log.into(),
            }
        }
    }
}

/// Execution result of one transaction, as fetched from the transaction index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionResult {
    /// Hash the result was fetched for.
    pub hash: TransactionHash,
    /// Block height the transaction was included at.
    pub height: u64,
    /// Execution status.
    pub status: ExecutionStatus,
    /// Length-prefixed encoded transaction.
    pub raw_payload: Vec<u8>,
    /// Emitted events, in order.
    pub events: Vec<Event>,
}

impl TransactionResult {
    /// Did the ledger execute the transaction successfully?
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success)
    }
}
