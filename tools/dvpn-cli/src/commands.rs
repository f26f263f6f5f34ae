//! Command execution against the query API.

use std::process::ExitCode;

use anyhow::{Context, Result};
use dvpn_query::{
    AccountQueryError, NodeId, ResolutionError, ResolverId, SubscriptionId, TransactionHash,
    VpnQueryApi,
};
use dvpn_telemetry::log_tx_event;
use serde_json::Value;

use crate::cli::Command;

const COMPONENT: &str = "dvpn-cli";

/// Result of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Record found, as JSON.
    Found(Value),
    /// Nothing at that identifier.
    NotFound(String),
    /// The chain rejected the transaction. Holds the chain's own message.
    ChainFailure(String),
}

impl Outcome {
    /// Process exit status.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Found(_) => 0,
            Self::NotFound(_) => 2,
            Self::ChainFailure(_) => 1,
        }
    }

    /// Print to stdout or stderr and return the exit code.
    pub fn report(&self) -> Result<ExitCode> {
        match self {
            Self::Found(value) => println!("{}", serde_json::to_string_pretty(value)?),
            Self::NotFound(line) => eprintln!("{}", line),
            Self::ChainFailure(message) => eprintln!("{}", message),
        }
        Ok(ExitCode::from(self.exit_code()))
    }
}

fn found_or<T: serde::Serialize>(record: Option<T>, what: &str, id: &str) -> Result<Outcome> {
    Ok(match record {
        Some(record) => Outcome::Found(serde_json::to_value(record)?),
        None => Outcome::NotFound(format!("{} not found: {}", what, id)),
    })
}

/// Run `command` against `api`.
pub async fn execute(api: &dyn VpnQueryApi, command: &Command) -> Result<Outcome> {
    match command {
        Command::SubscriptionByTx { hash } => {
            let hash = TransactionHash::parse(hash).context("invalid transaction hash")?;
            log_tx_event!(debug, COMPONENT, "Resolving subscription", hash);

            match api.resolve_subscription_by_hash(&hash).await {
                Ok(subscription) => {
                    log_tx_event!(
                        info,
                        COMPONENT,
                        "Subscription resolved",
                        hash,
                        subscription_id = %subscription.id
                    );
                    Ok(Outcome::Found(serde_json::to_value(subscription)?))
                }
                Err(ResolutionError::ChainExecution { log, .. }) => Ok(Outcome::ChainFailure(log)),
                Err(e @ ResolutionError::NotFound { .. }) => Ok(Outcome::NotFound(e.to_string())),
                Err(e) => Err(e).context("subscription resolution failed"),
            }
        }
        Command::Subscription { id } => {
            let record = api.query_subscription(&SubscriptionId::new(id.as_str())).await?;
            found_or(record, "subscription", id)
        }
        Command::Node { id } => {
            let record = api.query_node(&NodeId::new(id.as_str())).await?;
            found_or(record, "node", id)
        }
        Command::ResolverNodes { id } => {
            let record = api
                .query_nodes_of_resolver(&ResolverId::new(id.as_str()))
                .await?;
            found_or(record, "resolver", id)
        }
        Command::SessionsCount { id } => {
            let record = api
                .query_sessions_count(&SubscriptionId::new(id.as_str()))
                .await?;
            found_or(record, "subscription", id)
        }
        Command::Session { id, index } => {
            let record = api
                .query_session(&SubscriptionId::new(id.as_str()), *index)
                .await?;
            found_or(record, "session", &format!("{}/{}", id, index))
        }
        Command::Account { address } => match api.query_account(address).await {
            Ok(record) => found_or(record, "account", address),
            Err(AccountQueryError::InvalidAddress(e)) => {
                Err(e).with_context(|| format!("invalid account address `{}`", address))
            }
            Err(AccountQueryError::Transport(e)) => Err(e.into()),
        },
    }
}
