//! # Domain Invariants
//!
//! Gates a transaction must pass before its events are trusted.

use super::errors::{ResolutionError, ShapeViolation};
use super::messages::{Message, StartSubscription, TransactionEnvelope};
use super::value_objects::{ExecutionStatus, TransactionResult};

/// Invariant: the ledger executed the transaction successfully.
///
/// A failure carries the ledger's log unchanged.
pub fn invariant_execution_succeeded(result: &TransactionResult) -> Result<(), ResolutionError> {
    match &result.status {
        ExecutionStatus::Success => Ok(()),
        ExecutionStatus::Failed {
            code,
            codespace,
            log,
        } => Err(ResolutionError::ChainExecution {
            code: *code,
            codespace: codespace.clone(),
            log: log.clone(),
        }),
    }
}

/// Invariant: the envelope holds exactly one message and it starts a subscription.
///
/// Multi-message transactions are rejected whole, never partially processed.
pub fn invariant_single_start_subscription(
    envelope: &TransactionEnvelope,
) -> Result<&StartSubscription, ResolutionError> {
    let [message] = envelope.messages.as_slice() else {
        return Err(ResolutionError::UnexpectedTransactionShape(
            ShapeViolation::MessageCount {
                found: envelope.messages.len(),
            },
        ));
    };

    match message {
        Message::StartSubscription(msg) => Ok(msg),
        other => Err(ResolutionError::UnexpectedTransactionShape(
            ShapeViolation::MessageType {
                found: other.msg_type().to_string(),
            },
        )),
    }
}
